use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use super::validation::validate;
use super::{ObjectPath, ObjectPathError};

/// An owned D-Bus object path.
///
/// This is the owned variant which dereferences to [`ObjectPath`].
#[derive(Clone, PartialEq, Eq)]
pub struct ObjectPathBuf(Vec<u8>);

impl ObjectPathBuf {
    /// Construct an owned object path from its raw underlying vector.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the vector contains a valid object path.
    #[inline]
    pub(super) unsafe fn from_raw_vec(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Try to construct a new owned object path with validation.
    #[inline]
    pub fn new<S>(path: &S) -> Result<Self, ObjectPathError>
    where
        S: ?Sized + AsRef<[u8]>,
    {
        let path = path.as_ref();
        validate(path)?;
        // SAFETY: We just validated that the path is valid.
        Ok(unsafe { Self::from_raw_vec(path.to_vec()) })
    }

    #[inline]
    fn to_object_path(&self) -> &ObjectPath {
        // SAFETY: This type ensures during construction that the object path
        // it contains is valid.
        unsafe { ObjectPath::new_unchecked(&self.0) }
    }
}

impl fmt::Debug for ObjectPathBuf {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectPathBuf")
            .field(&self.to_object_path().as_str())
            .finish()
    }
}

impl Deref for ObjectPathBuf {
    type Target = ObjectPath;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.to_object_path()
    }
}

impl Borrow<ObjectPath> for ObjectPathBuf {
    #[inline]
    fn borrow(&self) -> &ObjectPath {
        self
    }
}

impl AsRef<ObjectPath> for ObjectPathBuf {
    #[inline]
    fn as_ref(&self) -> &ObjectPath {
        self
    }
}

impl PartialEq<ObjectPath> for ObjectPathBuf {
    #[inline]
    fn eq(&self, other: &ObjectPath) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&ObjectPath> for ObjectPathBuf {
    #[inline]
    fn eq(&self, other: &&ObjectPath) -> bool {
        self.0 == other.as_bytes()
    }
}

impl TryFrom<&str> for ObjectPathBuf {
    type Error = ObjectPathError;

    #[inline]
    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}
