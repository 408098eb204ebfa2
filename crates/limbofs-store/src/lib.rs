//! limbofs Store - reference-counted file record storage
//!
//! Owns the physical representation of file contents keyed by [`FileId`]:
//! - Record allocation with a monotonic identifier arena
//! - Per-record reference counting driven by open handles
//! - Pending-delete marking and exactly-once reclamation
//! - Byte-level read/write for already-open holders
//!
//! Reclamation is the only irreversible action. It happens inside a single
//! critical section with the count-reaches-zero check, so no acquire or
//! release can interleave between the check and the removal.

pub mod record;
pub mod store;

pub use limbofs_core::domain::FileId;
pub use record::FileRecord;
pub use store::{FileStore, ReleaseOutcome};
