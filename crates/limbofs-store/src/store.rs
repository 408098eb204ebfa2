//! Reference-counted file store with deferred reclamation.
//!
//! Uses a DashMap keyed by `FileId` so lifecycle mutations for one record
//! run under that record's shard lock: decrement, the pending-delete
//! check, and removal are a single critical section, which is what makes
//! reclamation exactly-once under concurrent closes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use limbofs_core::config::StoreConfig;
use limbofs_core::domain::{FileId, VfsError};
use tracing::{debug, warn};

use crate::record::FileRecord;

/// What a `release` did with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// References remain, or the record is not marked for deletion.
    Retained,
    /// This release dropped the last reference of a pending-delete record
    /// and destroyed it.
    Reclaimed,
}

/// Owns every [`FileRecord`], keyed by [`FileId`].
///
/// Identifiers come from a monotonic counter and are never reused, so a
/// reclaimed id stays dead: any later operation on it fails `NotFound`.
pub struct FileStore {
    records: DashMap<FileId, FileRecord>,
    next_id: AtomicU64,
    // Capacity reservations. Incremented before a record is inserted and
    // decremented when one is reclaimed, so racing allocators cannot slip
    // past `max_files` between a length check and their insert.
    live: AtomicUsize,
    max_files: usize,
    max_file_size: u64,
}

impl FileStore {
    /// Create a store with the given capacity limits.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
            live: AtomicUsize::new(0),
            max_files: config.max_files,
            max_file_size: config.max_file_size,
        }
    }

    /// Allocate a fresh record with reference count 0 and no pending
    /// deletion.
    ///
    /// Fails with [`VfsError::ResourceExhausted`] when the record table is
    /// at capacity.
    pub fn allocate(&self) -> Result<FileId, VfsError> {
        let reserved = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_files).then_some(n + 1)
            });
        if reserved.is_err() {
            return Err(VfsError::ResourceExhausted(format!(
                "file store at capacity ({} records)",
                self.max_files
            )));
        }
        let id = FileId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records.insert(id, FileRecord::new());
        debug!(%id, "allocated file record");
        Ok(id)
    }

    /// Take a reference on `id`.
    ///
    /// Fails with [`VfsError::NotFound`] if the record was already
    /// reclaimed (or never existed).
    pub fn acquire(&self, id: FileId) -> Result<(), VfsError> {
        match self.records.entry(id) {
            Entry::Occupied(mut occ) => {
                occ.get_mut().refcount += 1;
                Ok(())
            }
            Entry::Vacant(_) => Err(VfsError::NotFound(id.to_string())),
        }
    }

    /// Drop a reference on `id`; reclaims the record when this was the
    /// last reference and deletion is pending.
    ///
    /// Fails with [`VfsError::NotFound`] if the record does not exist and
    /// [`VfsError::InvariantViolation`] if the count would go negative.
    pub fn release(&self, id: FileId) -> Result<ReleaseOutcome, VfsError> {
        match self.records.entry(id) {
            Entry::Occupied(mut occ) => {
                let record = occ.get_mut();
                if record.refcount == 0 {
                    warn!(%id, "release on unreferenced record");
                    return Err(VfsError::InvariantViolation(format!(
                        "release would drop {id} refcount below zero"
                    )));
                }
                record.refcount -= 1;
                if record.is_reclaimable() {
                    occ.remove();
                    self.live.fetch_sub(1, Ordering::AcqRel);
                    debug!(%id, "reclaimed file record on last release");
                    Ok(ReleaseOutcome::Reclaimed)
                } else {
                    Ok(ReleaseOutcome::Retained)
                }
            }
            Entry::Vacant(_) => Err(VfsError::NotFound(id.to_string())),
        }
    }

    /// Mark `id` for deletion; reclaims immediately when no references
    /// are outstanding.
    ///
    /// Idempotent: marking an already-pending or already-reclaimed
    /// identifier is a successful no-op.
    pub fn mark_pending_delete(&self, id: FileId) {
        if let Entry::Occupied(mut occ) = self.records.entry(id) {
            let record = occ.get_mut();
            record.pending_delete = true;
            if record.is_reclaimable() {
                occ.remove();
                self.live.fetch_sub(1, Ordering::AcqRel);
                debug!(%id, "reclaimed unreferenced record on delete request");
            } else {
                debug!(%id, "deletion deferred, references outstanding");
            }
        }
    }

    /// True iff a record currently exists for `id`.
    #[must_use]
    pub fn is_alive(&self, id: FileId) -> bool {
        self.records.contains_key(&id)
    }

    /// Current reference count for `id`, or `None` once reclaimed.
    #[must_use]
    pub fn refcount(&self, id: FileId) -> Option<u64> {
        self.records.get(&id).map(|r| r.refcount())
    }

    /// Read up to `len` bytes from `id`'s content at `offset`.
    ///
    /// Short reads past end-of-file return the available bytes; a read at
    /// or beyond the end returns an empty vector. Fails with
    /// [`VfsError::NotFound`] once the record is reclaimed.
    pub fn read_at(&self, id: FileId, offset: u64, len: usize) -> Result<Vec<u8>, VfsError> {
        let record = self
            .records
            .get(&id)
            .ok_or_else(|| VfsError::NotFound(id.to_string()))?;
        let data = &record.data;
        let start = (offset as usize).min(data.len());
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    /// Write `data` into `id`'s content at `offset`, zero-filling any gap
    /// and growing the record as needed. Returns the number of bytes
    /// written.
    ///
    /// Fails with [`VfsError::NotFound`] once reclaimed, or
    /// [`VfsError::ResourceExhausted`] if the write would grow the record
    /// past the configured per-file size limit.
    pub fn write_at(&self, id: FileId, offset: u64, data: &[u8]) -> Result<usize, VfsError> {
        let end = offset.saturating_add(data.len() as u64);
        if end > self.max_file_size {
            return Err(VfsError::ResourceExhausted(format!(
                "write past per-file limit of {} bytes",
                self.max_file_size
            )));
        }
        match self.records.entry(id) {
            Entry::Occupied(mut occ) => {
                let record = occ.get_mut();
                let end = end as usize;
                if record.data.len() < end {
                    record.data.resize(end, 0);
                }
                record.data[offset as usize..end].copy_from_slice(data);
                Ok(data.len())
            }
            Entry::Vacant(_) => Err(VfsError::NotFound(id.to_string())),
        }
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
