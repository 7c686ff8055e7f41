//! Collections of Unix file descriptors attached to a message.
//!
//! A [`Handles`] collection backs the `h` (`UNIX_FD`) type: the wire
//! representation of a handle is a `u32` index into this collection, never
//! the raw descriptor number itself.

use std::cell::RefCell;
use std::os::fd::{AsFd, OwnedFd};

use crate::error::{Error, ErrorKind, Result};

/// Unix file descriptors accompanying a received message.
///
/// Descriptors are owned by the collection until a reader explicitly takes
/// ownership of one (see [`Body::load_handle`]); any descriptor still held
/// when the collection is dropped is closed. A dispatched frame only lives
/// as long as the handler invoked for it, so interior mutability lets a
/// shared [`Body`] borrow take ownership of individual slots without
/// requiring `&mut` access to the whole frame.
///
/// [`Body::load_handle`]: crate::Body::load_handle
#[derive(Debug, Default)]
pub struct Handles {
    fds: RefCell<Vec<Option<OwnedFd>>>,
}

impl Clone for Handles {
    /// Best-effort clone: slots whose descriptor fails to duplicate are
    /// dropped rather than causing the clone to fail.
    fn clone(&self) -> Self {
        let fds = self.fds.borrow();

        let cloned = fds
            .iter()
            .map(|slot| slot.as_ref().and_then(|fd| fd.try_clone_to_owned().ok()))
            .collect();

        Self {
            fds: RefCell::new(cloned),
        }
    }
}

impl Handles {
    /// Construct an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a collection from a list of received descriptors, in the
    /// order they were attached to the frame.
    pub(crate) fn from_vec(fds: Vec<OwnedFd>) -> Self {
        Self {
            fds: RefCell::new(fds.into_iter().map(Some).collect()),
        }
    }

    /// Number of descriptors still present in the collection (including ones
    /// whose slot has not yet been taken).
    pub fn len(&self) -> usize {
        self.fds.borrow().len()
    }

    /// Test if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.fds.borrow().is_empty()
    }

    /// Take ownership of the descriptor at `index`, removing it from the
    /// collection so that it is not closed when the collection is dropped.
    pub(crate) fn take(&self, index: u32) -> Result<OwnedFd> {
        let mut fds = self.fds.borrow_mut();
        let slot = fds
            .get_mut(index as usize)
            .ok_or(Error::new(ErrorKind::InvalidHandle(index)))?;
        slot.take().ok_or(Error::new(ErrorKind::InvalidHandle(index)))
    }

    /// Duplicate the descriptor at `index`, leaving ownership with the
    /// collection.
    pub(crate) fn dup(&self, index: u32) -> Result<OwnedFd> {
        let fds = self.fds.borrow();
        let fd = fds
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::new(ErrorKind::InvalidHandle(index)))?;
        fd.as_fd().try_clone_to_owned().map_err(Error::from)
    }

    /// Append a descriptor to the collection, returning its wire index.
    pub(crate) fn push(&mut self, fd: OwnedFd) -> u32 {
        let mut fds = self.fds.borrow_mut();
        let index = fds.len() as u32;
        fds.push(Some(fd));
        index
    }

    /// Consume the collection, discarding any slots that have already been
    /// taken.
    pub(crate) fn into_vec(self) -> Vec<OwnedFd> {
        self.fds.into_inner().into_iter().flatten().collect()
    }
}
