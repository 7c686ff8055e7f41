use crate::error::Result;
use crate::{Frame, Storable, Write};

/// A buffer which can be written to with correct alignment applied between
/// values.
///
/// This is implemented by [`BodyBuf`] and is the trait bound used by
/// [`Storable`], [`Arguments`], and the various writer helpers so that they
/// can be generic over the exact buffer being written to.
///
/// [`BodyBuf`]: crate::BodyBuf
/// [`Arguments`]: crate::Arguments
pub trait WriteAligned {
    /// Only write to the buffer without appending a signature.
    #[doc(hidden)]
    fn write_only<T>(&mut self, value: &T)
    where
        T: ?Sized + Write;

    /// Store a value, appending its signature.
    #[doc(hidden)]
    fn store<T>(&mut self, frame: T) -> Result<()>
    where
        T: Storable;

    /// Store a value without appending its signature.
    #[doc(hidden)]
    fn store_frame<T>(&mut self, frame: T)
    where
        T: Frame;

    /// Extend the buffer with a slice.
    #[doc(hidden)]
    fn extend_from_slice(&mut self, bytes: &[u8]);

    /// Extend the buffer with a slice ending with a NUL byte.
    #[doc(hidden)]
    fn extend_from_slice_nul(&mut self, bytes: &[u8]);
}
