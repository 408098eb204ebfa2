//! limbofs Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain newtypes** - `FileId`, `HandleId`, `ContextId`, `FileName`
//! - **Error taxonomy** - `VfsError` for lifecycle operations, `DomainError` for validation
//! - **Configuration** - typed config with YAML loading and validation
//! - **Port definitions** - `NameIndex`, the directory's name→identifier seam
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure types with no knowledge of storage or
//! concurrency. Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod ports;
