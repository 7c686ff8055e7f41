#[cfg(feature = "std")]
#[doc(inline)]
use self::transport::Transport;
mod transport;

pub use self::builder::ConnectionBuilder;
mod builder;

pub use self::connection::Connection;
pub(crate) use self::connection::Sasl;
mod connection;

mod buffers;
pub use self::buffers::Buffers;

pub use self::client::{Client, Subscription};
mod client;
