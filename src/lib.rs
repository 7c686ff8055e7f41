//! A client-side D-Bus wire protocol implementation.
//!
//! This crate provides the low-level pieces needed to speak the D-Bus wire
//! protocol from a client: a zero-copy, alignment-aware marshalling codec
//! for the D-Bus type system, a signature parser and validator, a framed
//! transport that performs the SASL authentication handshake over a Unix
//! domain or TCP socket (including Unix file descriptor passing), and a
//! connection dispatch core that allocates serials, tracks pending method
//! calls and routes signals to registered match rules.
//!
//! It does not implement a D-Bus server or name-owning bus daemon.

#![deny(missing_docs)]
#![allow(clippy::module_inception)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod macros;

#[doc(inline)]
pub use self::proto::{Endianness, Flags};
#[macro_use]
mod proto;

pub mod org_freedesktop_dbus;

#[doc(inline)]
pub use self::write::Write;
mod write;

#[doc(inline)]
pub use self::read::Read;
mod read;

#[doc(inline)]
pub use self::error::{Error, Result};
mod error;

pub(crate) mod buf;

#[doc(inline)]
pub use self::body_buf::{BodyBuf, StoreArray, StoreStruct};
mod body_buf;

#[doc(inline)]
pub use self::body::{AsBody, Body, LoadArray};
mod body;

#[doc(inline)]
pub use self::handles::Handles;
mod handles;

#[doc(inline)]
pub use self::send_buf::SendBuf;
mod send_buf;

#[doc(inline)]
pub use self::recv_buf::RecvBuf;
mod recv_buf;

mod sasl;

#[doc(inline)]
pub use self::signature::{Signature, SignatureBuf, SignatureError};
pub mod signature;

#[doc(inline)]
pub use self::frame::Frame;
mod frame;

#[doc(inline)]
pub use self::storable::Storable;
mod storable;

#[doc(inline)]
pub use self::write_aligned::WriteAligned;
mod write_aligned;

#[doc(inline)]
pub use self::message::{Message, MessageBuf, MessageKind};
mod message;

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use self::connection::{Client, Connection, ConnectionBuilder, Subscription};
mod connection;

mod lossy_str;

mod utils;

#[cfg(feature = "alloc")]
mod address;

#[cfg(feature = "alloc")]
#[doc(inline)]
pub use self::match_rule::{MatchRule, MatchType};
#[cfg(feature = "alloc")]
mod match_rule;

#[doc(inline)]
pub use self::object_path::{ObjectPath, ObjectPathBuf, ObjectPathError};
mod object_path;

#[doc(inline)]
pub use self::variant::Variant;
mod variant;

pub mod ty;

#[doc(inline)]
pub use self::arguments::Arguments;
mod arguments;
