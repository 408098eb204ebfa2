//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the lifecycle core depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`NameIndex`] - the directory's name→identifier indexing. The index
//!   algorithm itself (hashing, trees, on-disk layout) is an external
//!   collaborator; the lifecycle only requires bind/lookup/unbind.

pub mod name_index;

pub use name_index::NameIndex;
