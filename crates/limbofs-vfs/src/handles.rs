//! Per-context open-file table.
//!
//! Maps a context-local handle to the file identifier it was opened on.
//! Every entry holds an implicit +1 contribution to that identifier's
//! reference count for as long as it exists; the table itself never talks
//! to the store — the lifecycle pairs insertions with acquires and
//! removals with releases.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::DashMap;
use limbofs_core::domain::{FileId, HandleId, VfsError};

/// A single context's handle → identifier table.
pub struct OpenFileTable {
    entries: DashMap<HandleId, FileId>,
    next_handle: AtomicU64,
    // Slot reservations. Taken before an entry is inserted and given back
    // on removal, so concurrent inserts cannot race past `max_open`.
    open_count: AtomicUsize,
    max_open: usize,
}

impl OpenFileTable {
    /// Create an empty table allowing at most `max_open` simultaneous
    /// handles.
    #[must_use]
    pub fn new(max_open: usize) -> Self {
        Self {
            entries: DashMap::new(),
            next_handle: AtomicU64::new(1),
            open_count: AtomicUsize::new(0),
            max_open,
        }
    }

    /// Record a new open of `id`, allocating a fresh handle.
    ///
    /// Fails with [`VfsError::ResourceExhausted`] when the context is at
    /// its open-handle limit.
    pub fn insert(&self, id: FileId) -> Result<HandleId, VfsError> {
        let reserved = self
            .open_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_open).then_some(n + 1)
            });
        if reserved.is_err() {
            return Err(VfsError::ResourceExhausted(format!(
                "context at open-handle limit ({})",
                self.max_open
            )));
        }
        let handle = HandleId::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(handle, id);
        Ok(handle)
    }

    /// Resolve a handle to its identifier without closing it.
    ///
    /// Fails with [`VfsError::InvalidHandle`] if this context does not
    /// hold `handle`.
    pub fn get(&self, handle: HandleId) -> Result<FileId, VfsError> {
        self.entries
            .get(&handle)
            .map(|entry| *entry)
            .ok_or(VfsError::InvalidHandle(handle.get()))
    }

    /// Remove a handle, returning the identifier it referenced.
    ///
    /// Fails with [`VfsError::InvalidHandle`] if unknown; a handle can be
    /// removed at most once.
    pub fn remove(&self, handle: HandleId) -> Result<FileId, VfsError> {
        let (_, id) = self
            .entries
            .remove(&handle)
            .ok_or(VfsError::InvalidHandle(handle.get()))?;
        self.open_count.fetch_sub(1, Ordering::AcqRel);
        Ok(id)
    }

    /// Remove and return every entry. Used at context teardown so the
    /// owning context can release the references its handles held.
    pub fn drain(&self) -> Vec<(HandleId, FileId)> {
        let handles: Vec<HandleId> = self.entries.iter().map(|entry| *entry.key()).collect();
        let drained: Vec<(HandleId, FileId)> = handles
            .into_iter()
            .filter_map(|handle| self.entries.remove(&handle))
            .collect();
        self.open_count.fetch_sub(drained.len(), Ordering::AcqRel);
        drained
    }

    /// Number of currently open handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no handles are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
