//! Handles for extracted files.
//!
//! A handle is a `blob:`-style URL that a host can hand to its content
//! surface. It resolves back to one file of the package that issued it and
//! stops resolving once released or once that package is superseded.

use log::debug;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// URL prefix of every issued handle.
pub const HANDLE_PREFIX: &str = "blob:scorm/";

/// A dereferenceable reference to one extracted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: Uuid,
}

impl ResourceHandle {
    fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Parse a handle from its URL form.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let id = url.strip_prefix(HANDLE_PREFIX)?;
        Uuid::parse_str(id).ok().map(|id| Self { id })
    }

    /// The handle's URL form.
    #[must_use]
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HANDLE_PREFIX, self.id)
    }
}

/// Live handles of one package, mapped to file indices.
#[derive(Debug, Default)]
pub(crate) struct HandleTable {
    live: HashMap<ResourceHandle, usize>,
}

impl HandleTable {
    pub fn issue(&mut self, file_index: usize) -> ResourceHandle {
        let handle = ResourceHandle::new();
        self.live.insert(handle, file_index);
        debug!("issued handle {} for file #{}", handle, file_index);
        handle
    }

    pub fn resolve(&self, handle: &ResourceHandle) -> Option<usize> {
        self.live.get(handle).copied()
    }

    pub fn release(&mut self, handle: &ResourceHandle) -> bool {
        self.live.remove(handle).is_some()
    }

    /// Release every live handle, returning how many there were.
    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        if count > 0 {
            debug!("released {} handles", count);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }
}
