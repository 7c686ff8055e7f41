use core::fmt;

/// A byte string that implements [`Debug`] by lossily decoding it as UTF-8.
///
/// This is used for diagnostics over data received from a peer that isn't
/// guaranteed to be valid UTF-8, such as SASL responses.
#[repr(transparent)]
pub(crate) struct LossyStr([u8]);

impl LossyStr {
    #[inline]
    pub(crate) fn new(bytes: &[u8]) -> &LossyStr {
        // SAFETY: the byte slice is repr transparent over this type.
        unsafe { &*(bytes as *const _ as *const LossyStr) }
    }
}

impl fmt::Debug for LossyStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&String::from_utf8_lossy(&self.0), f)
    }
}

impl fmt::Display for LossyStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(&self.0), f)
    }
}
