//! limbofs VFS - the open-file lifecycle and deferred-deletion subsystem
//!
//! Composes the namespace and the record store into the four operations
//! visible to callers:
//! - [`FileLifecycle::create`] - bind a name to fresh storage
//! - [`FileLifecycle::open`] - resolve a name and take a counted reference
//! - [`FileLifecycle::close`] - drop a reference; last close of an
//!   unlinked file reclaims its data
//! - [`FileLifecycle::unlink`] - hide the name immediately; data survives
//!   while open handles remain
//!
//! # Architecture
//!
//! - [`Directory`] adapts the `NameIndex` port with a concurrent map
//! - [`OpenFileTable`] is each context's local handle→identifier table
//! - [`ProcessContext`] stands in for an independent execution context
//!   and closes its outstanding handles on teardown
//! - [`FileLifecycle`] owns the namespace critical section that keeps
//!   opens from racing unlink into reclaimed data

pub mod context;
pub mod directory;
pub mod handles;
pub mod lifecycle;

pub use context::ProcessContext;
pub use directory::Directory;
pub use handles::OpenFileTable;
pub use lifecycle::FileLifecycle;
