//! Execution-context stand-in: an identity plus a local open-file table.
//!
//! Plays the role of an independent process opening and closing the same
//! names as its peers. Dropping a context closes every handle it still
//! holds, so reference counts return to zero even when a context goes
//! away without closing, which is the teardown guarantee the lifecycle
//! relies on.

use std::sync::Arc;

use limbofs_core::domain::{ContextId, FileId, FileName, HandleId, VfsError};
use tracing::{debug, warn};

use crate::handles::OpenFileTable;
use crate::lifecycle::FileLifecycle;

/// An independent caller of the lifecycle with its own handle table.
pub struct ProcessContext {
    id: ContextId,
    lifecycle: Arc<FileLifecycle>,
    table: OpenFileTable,
}

impl ProcessContext {
    /// Create a context against a shared lifecycle.
    #[must_use]
    pub fn new(lifecycle: Arc<FileLifecycle>) -> Self {
        let max_open = lifecycle.handle_config().max_open_per_context;
        Self {
            id: ContextId::new(),
            lifecycle,
            table: OpenFileTable::new(max_open),
        }
    }

    /// This context's identity.
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Number of handles this context currently holds.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.table.len()
    }

    /// Create `name` without opening it. Creation takes no reference;
    /// obtaining a handle requires a subsequent [`open`](Self::open).
    pub fn create(&self, name: &FileName) -> Result<FileId, VfsError> {
        self.lifecycle.create(name)
    }

    /// Open `name`, recording the handle in this context's table.
    pub fn open(&self, name: &FileName) -> Result<HandleId, VfsError> {
        self.lifecycle.open(name, &self.table)
    }

    /// Close one of this context's handles.
    pub fn close(&self, handle: HandleId) -> Result<(), VfsError> {
        self.lifecycle.close(&self.table, handle)
    }

    /// Read through one of this context's handles.
    pub fn read(&self, handle: HandleId, offset: u64, len: usize) -> Result<Vec<u8>, VfsError> {
        self.lifecycle.read(&self.table, handle, offset, len)
    }

    /// Write through one of this context's handles.
    pub fn write(&self, handle: HandleId, offset: u64, data: &[u8]) -> Result<usize, VfsError> {
        self.lifecycle.write(&self.table, handle, offset, data)
    }
}

impl Drop for ProcessContext {
    fn drop(&mut self) {
        for (handle, id) in self.table.drain() {
            debug!(ctx = %self.id, %handle, %id, "closing handle at context teardown");
            if let Err(err) = self.lifecycle.store().release(id) {
                warn!(ctx = %self.id, %id, %err, "teardown release failed");
            }
        }
    }
}
