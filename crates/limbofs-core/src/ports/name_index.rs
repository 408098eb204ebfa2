//! Name index port (driven/secondary port)
//!
//! The directory entry table: bindings from human-readable names to file
//! identifiers, unique by name. Purely a namespace — implementations never
//! touch reference counts; binding lifetime is independent of outstanding
//! open handles.
//!
//! ## Design Notes
//!
//! - Implementations must be safe to call from multiple threads; callers
//!   that need lookup and a subsequent store operation to be atomic hold
//!   their own lock around the pair.
//! - `unbind` removes only the name. Whether the identifier's data lives
//!   on is the store's concern, not the index's.

use crate::domain::{FileId, FileName, VfsError};

/// Directory name→identifier index.
pub trait NameIndex: Send + Sync {
    /// Bind `name` to `id`. Fails with [`VfsError::AlreadyExists`] if the
    /// name is already bound.
    fn bind(&self, name: FileName, id: FileId) -> Result<(), VfsError>;

    /// Resolve `name` to its identifier. Fails with [`VfsError::NotFound`]
    /// if unbound.
    fn lookup(&self, name: &FileName) -> Result<FileId, VfsError>;

    /// Remove the binding for `name`, returning the identifier it mapped
    /// to. Fails with [`VfsError::NotFound`] if unbound.
    fn unbind(&self, name: &FileName) -> Result<FileId, VfsError>;

    /// Number of live bindings.
    fn len(&self) -> usize;

    /// True if no bindings exist.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
