use std::fmt;
use std::str::from_utf8_unchecked;

use super::validation::validate;
use super::{Iter, ObjectPathBuf, ObjectPathError};

use crate::buf::UnalignedBuf;
use crate::error::Result;
use crate::read::{self, Read};
use crate::write::{self, Write};
use crate::{Body, BodyBuf, Error, Signature};

/// A D-Bus object path such as `/org/freedesktop/DBus`.
///
/// # Examples
///
/// ```
/// use dbus_wire::ObjectPath;
///
/// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
///
/// assert!(ObjectPath::new(b"/org/freedesktop/DBus").is_ok());
/// assert!(ObjectPath::new(b"").is_err());
/// assert!(ObjectPath::new(b"org/freedesktop/DBus").is_err());
/// assert!(ObjectPath::new(b"/org/freedesktop/DBus/").is_err());
/// assert!(ObjectPath::new(b"/org//DBus").is_err());
/// ```
#[derive(Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct ObjectPath([u8]);

impl ObjectPath {
    /// The root object path `/`.
    pub const ROOT: &'static ObjectPath = ObjectPath::new_const(b"/");

    /// Construct a new object path with validation inside of a constant
    /// context.
    ///
    /// This will panic in case the path is invalid.
    #[inline]
    #[track_caller]
    pub const fn new_const(path: &[u8]) -> &ObjectPath {
        if validate(path).is_err() {
            panic!("Invalid D-Bus object path")
        };

        // SAFETY: The byte slice is repr transparent over this type.
        unsafe { Self::new_unchecked(path) }
    }

    /// Try to construct a new object path with validation.
    #[inline]
    pub fn new<S>(path: &S) -> Result<&ObjectPath, ObjectPathError>
    where
        S: ?Sized + AsRef<[u8]>,
    {
        let path = path.as_ref();
        validate(path)?;
        // SAFETY: The byte slice is repr transparent over this type.
        unsafe { Ok(Self::new_unchecked(path)) }
    }

    /// Construct a new object path without validation. The caller is
    /// responsible for ensuring that the path is valid.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `path` is a valid object path.
    #[inline]
    pub const unsafe fn new_unchecked(path: &[u8]) -> &Self {
        &*(path as *const _ as *const ObjectPath)
    }

    /// Test if the object path is the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0 == *b"/"
    }

    /// Get the length of the object path in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Test if the path is empty. This is never true for a valid path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the elements of the object path.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::ObjectPath;
    ///
    /// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
    ///
    /// assert_eq!(PATH.iter().collect::<Vec<_>>(), ["org", "freedesktop", "DBus"]);
    /// assert_eq!(ObjectPath::ROOT.iter().collect::<Vec<_>>(), Vec::<&str>::new());
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.0)
    }

    /// Test if `self` is, or is a parent of, `other` under path-namespace
    /// semantics: equal to `other`, or a prefix of `other` ending exactly on
    /// an element boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::ObjectPath;
    ///
    /// let base = ObjectPath::new(b"/org/freedesktop/DBus")?;
    /// assert!(base.is_namespace_of(ObjectPath::new(b"/org/freedesktop/DBus")?));
    /// assert!(base.is_namespace_of(ObjectPath::new(b"/org/freedesktop/DBus/Foo")?));
    /// assert!(!base.is_namespace_of(ObjectPath::new(b"/org/freedesktop/DBusFoo")?));
    /// assert!(!base.is_namespace_of(ObjectPath::new(b"/org/freedesktop")?));
    /// # Ok::<_, dbus_wire::ObjectPathError>(())
    /// ```
    pub fn is_namespace_of(&self, other: &ObjectPath) -> bool {
        if self.is_root() {
            return true;
        }

        if self.0 == other.0 {
            return true;
        }

        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()] == b'/'
    }

    /// Get the path as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: Validation ensures the path is ASCII, hence valid UTF-8.
        unsafe { from_utf8_unchecked(&self.0) }
    }

    /// Get the path as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl AsRef<ObjectPath> for ObjectPath {
    #[inline]
    fn as_ref(&self) -> &ObjectPath {
        self
    }
}

impl ToOwned for ObjectPath {
    type Owned = ObjectPathBuf;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // SAFETY: `self` is already a validated object path.
        unsafe { ObjectPathBuf::from_raw_vec(self.0.to_vec()) }
    }
}

impl PartialEq<str> for ObjectPath {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0 == *other.as_bytes()
    }
}

impl PartialEq<[u8]> for ObjectPath {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for ObjectPath {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other[..]
    }
}

impl From<&ObjectPath> for Box<ObjectPath> {
    #[inline]
    fn from(path: &ObjectPath) -> Self {
        // SAFETY: ObjectPath is repr(transparent) over [u8].
        unsafe { Box::from_raw(Box::into_raw(Box::<[u8]>::from(&path.0)) as *mut ObjectPath) }
    }
}

impl write::sealed::Sealed for ObjectPath {}

/// Write an object path to the buffer.
///
/// # Examples
///
/// ```
/// use dbus_wire::{BodyBuf, ObjectPath};
///
/// const PATH: &ObjectPath = ObjectPath::new_const(b"/org/freedesktop/DBus");
///
/// let mut buf = BodyBuf::new();
/// buf.store(PATH)?;
///
/// assert_eq!(buf.signature(), "o");
/// # Ok::<_, dbus_wire::Error>(())
/// ```
impl Write for ObjectPath {
    const SIGNATURE: &'static Signature = Signature::OBJECT_PATH;

    #[inline]
    fn write_to(&self, buf: &mut BodyBuf) {
        buf.store_frame(self.0.len() as u32);
        buf.extend_from_slice_nul(&self.0);
    }

    #[inline]
    fn write_to_unaligned(&self, buf: &mut UnalignedBuf) {
        buf.store(self.0.len() as u32);
        buf.extend_from_slice_nul(&self.0);
    }
}

impl_traits_for_write!(
    ObjectPath,
    ObjectPath::new_const(b"/org/freedesktop/DBus"),
    "qo",
    ObjectPath
);

impl read::sealed::Sealed for ObjectPath {}

impl Read for ObjectPath {
    #[inline]
    fn read_from<'de>(buf: &mut Body<'de>) -> Result<&'de Self> {
        let len = buf.load::<u32>()? as usize;
        let bytes = buf.load_slice_nul(len)?;
        Ok(ObjectPath::new(bytes)?)
    }
}
