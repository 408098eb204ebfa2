//! Domain types for the open-file lifecycle
//!
//! This module contains the core domain types for limbofs:
//! - Newtypes for type-safe identifiers and validated names
//! - Error types for lifecycle operations and validation failures

pub mod errors;
pub mod newtypes;

// Re-export commonly used types
pub use errors::{DomainError, VfsError};
pub use newtypes::{ContextId, FileId, FileName, HandleId};
