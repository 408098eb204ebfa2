//! In-memory directory: the default `NameIndex` adapter.
//!
//! Uses DashMap for lock-free concurrent access from multiple contexts.
//! Purely a namespace — bindings never influence reference counts, and
//! removing a binding says nothing about whether the data still lives.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use limbofs_core::domain::{FileId, FileName, VfsError};
use limbofs_core::ports::NameIndex;

/// Name → identifier table, unique by name.
#[derive(Debug, Default)]
pub struct Directory {
    entries: DashMap<FileName, FileId>,
}

impl Directory {
    /// Create a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl NameIndex for Directory {
    fn bind(&self, name: FileName, id: FileId) -> Result<(), VfsError> {
        match self.entries.entry(name) {
            Entry::Occupied(occ) => Err(VfsError::AlreadyExists(occ.key().to_string())),
            Entry::Vacant(vac) => {
                vac.insert(id);
                Ok(())
            }
        }
    }

    fn lookup(&self, name: &FileName) -> Result<FileId, VfsError> {
        self.entries
            .get(name)
            .map(|entry| *entry)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    fn unbind(&self, name: &FileName) -> Result<FileId, VfsError> {
        self.entries
            .remove(name)
            .map(|(_, id)| id)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
