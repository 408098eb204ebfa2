//! In-memory file record: content bytes plus lifecycle bookkeeping.

/// A stored file's data and lifecycle state, owned by the store and keyed
/// by `FileId`.
///
/// Invariant: a record exists iff its reference count is above zero, or
/// deletion has not yet been requested while it was referenced. Once the
/// count reaches zero with `pending_delete` set, the record is removed
/// from the table and its identifier is permanently dead.
#[derive(Debug, Default)]
pub struct FileRecord {
    pub(crate) data: Vec<u8>,
    pub(crate) refcount: u64,
    pub(crate) pending_delete: bool,
}

impl FileRecord {
    /// Create an empty record with no references and no pending deletion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content length in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Number of outstanding references (open handles).
    #[must_use]
    pub fn refcount(&self) -> u64 {
        self.refcount
    }

    /// True once a deletion request has hidden this record's name.
    #[must_use]
    pub fn is_pending_delete(&self) -> bool {
        self.pending_delete
    }

    /// True when the record is unreferenced and marked for deletion,
    /// i.e. due for reclamation.
    pub(crate) fn is_reclaimable(&self) -> bool {
        self.refcount == 0 && self.pending_delete
    }
}
