use crate::{Body, BodyBuf};

/// Coerce a value into a [`Body`].
///
/// This is implemented by both [`Body`] itself and [`BodyBuf`], allowing APIs
/// to accept either a borrowed or an owned body buffer.
pub trait AsBody {
    /// Coerce this value into a [`Body`].
    fn as_body(&self) -> Body<'_>;
}

impl AsBody for Body<'_> {
    #[inline]
    fn as_body(&self) -> Body<'_> {
        self.clone()
    }
}

impl AsBody for BodyBuf {
    #[inline]
    fn as_body(&self) -> Body<'_> {
        BodyBuf::as_body(self)
    }
}
