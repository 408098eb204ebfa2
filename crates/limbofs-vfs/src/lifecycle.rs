//! The open-file lifecycle state machine.
//!
//! Per identifier the states are: unreferenced (new) → live (refcount > 0)
//! → live-pending (refcount > 0, deletion requested) → reclaimed, with a
//! shortcut straight to reclaimed when deletion is requested at refcount
//! 0. No transition leaves the reclaimed state.
//!
//! The namespace mutex is held across lookup+acquire (open) and across
//! unbind+mark (unlink) for the same reason in both places: an opener
//! must never end up holding a reference to data whose reclamation raced
//! its name resolution. `close` takes no namespace lock — release and
//! the maybe-reclaim check are already one critical section in the store.

use std::sync::{Arc, Mutex, MutexGuard};

use limbofs_core::config::{Config, HandleConfig};
use limbofs_core::domain::{FileId, FileName, HandleId, VfsError};
use limbofs_core::ports::NameIndex;
use limbofs_store::FileStore;
use tracing::debug;

use crate::directory::Directory;
use crate::handles::OpenFileTable;

/// Orchestrates [`NameIndex`], [`FileStore`], and per-context
/// [`OpenFileTable`]s into create/open/close/unlink with the
/// deferred-deletion contract.
///
/// Shared across contexts behind an `Arc`; all operations take `&self`.
pub struct FileLifecycle {
    directory: Arc<dyn NameIndex>,
    store: Arc<FileStore>,
    handle_config: HandleConfig,
    namespace: Mutex<()>,
}

impl FileLifecycle {
    /// Compose a lifecycle from an existing name index and store.
    #[must_use]
    pub fn new(directory: Arc<dyn NameIndex>, store: Arc<FileStore>, handles: HandleConfig) -> Self {
        Self {
            directory,
            store,
            handle_config: handles,
            namespace: Mutex::new(()),
        }
    }

    /// Build a fully in-memory lifecycle (directory + store) from config.
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        Self::new(
            Arc::new(Directory::new()),
            Arc::new(FileStore::new(&config.store)),
            config.handles.clone(),
        )
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &Arc<FileStore> {
        &self.store
    }

    /// The namespace index.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn NameIndex> {
        &self.directory
    }

    /// Limits applied to each context's open-file table.
    #[must_use]
    pub fn handle_config(&self) -> &HandleConfig {
        &self.handle_config
    }

    fn namespace_guard(&self) -> MutexGuard<'_, ()> {
        // A poisoned namespace mutex only means another thread panicked
        // while holding it; the maps it guards are never left half-updated.
        self.namespace.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Bind `name` to freshly allocated storage and return its identifier.
    ///
    /// Creation does not open: the new record has reference count 0 and a
    /// handle requires a subsequent [`open`](Self::open). Fails with
    /// [`VfsError::AlreadyExists`] if the name is bound, or
    /// [`VfsError::ResourceExhausted`] at store capacity.
    pub fn create(&self, name: &FileName) -> Result<FileId, VfsError> {
        let _guard = self.namespace_guard();
        let id = self.store.allocate()?;
        if let Err(err) = self.directory.bind(name.clone(), id) {
            // Roll back the allocation: unreferenced, so this reclaims now.
            self.store.mark_pending_delete(id);
            return Err(err);
        }
        debug!(%name, %id, "created file");
        Ok(id)
    }

    /// Resolve `name`, take a reference, and record a handle in `table`.
    ///
    /// Fails with [`VfsError::NotFound`] once the name has been unlinked;
    /// concurrent opens by unrelated contexts all succeed independently.
    pub fn open(&self, name: &FileName, table: &OpenFileTable) -> Result<HandleId, VfsError> {
        let id = {
            let _guard = self.namespace_guard();
            let id = self.directory.lookup(name)?;
            self.store.acquire(id)?;
            id
        };
        match table.insert(id) {
            Ok(handle) => {
                debug!(%name, %id, %handle, "opened file");
                Ok(handle)
            }
            Err(err) => {
                // The table rejected the handle; give back the reference.
                let _ = self.store.release(id);
                Err(err)
            }
        }
    }

    /// Close `handle`, dropping its reference. The last close of an
    /// unlinked file reclaims the data.
    ///
    /// Fails with [`VfsError::InvalidHandle`] if `table` does not hold
    /// `handle`.
    pub fn close(&self, table: &OpenFileTable, handle: HandleId) -> Result<(), VfsError> {
        let id = table.remove(handle)?;
        let outcome = self.store.release(id)?;
        debug!(%handle, %id, ?outcome, "closed file");
        Ok(())
    }

    /// Remove `name` from the namespace immediately and mark its data for
    /// deletion.
    ///
    /// Succeeds even while other contexts hold open handles — those
    /// handles stay usable until closed. A second unlink of the same name
    /// fails with [`VfsError::NotFound`]: the binding is already gone.
    pub fn unlink(&self, name: &FileName) -> Result<(), VfsError> {
        let _guard = self.namespace_guard();
        let id = self.directory.unbind(name)?;
        self.store.mark_pending_delete(id);
        debug!(%name, %id, "unlinked file");
        Ok(())
    }

    /// Read through an open handle. Valid until the handle is closed,
    /// whether or not the name has been unlinked.
    pub fn read(
        &self,
        table: &OpenFileTable,
        handle: HandleId,
        offset: u64,
        len: usize,
    ) -> Result<Vec<u8>, VfsError> {
        let id = table.get(handle)?;
        self.store.read_at(id, offset, len)
    }

    /// Write through an open handle. Valid until the handle is closed,
    /// whether or not the name has been unlinked.
    pub fn write(
        &self,
        table: &OpenFileTable,
        handle: HandleId,
        offset: u64,
        data: &[u8],
    ) -> Result<usize, VfsError> {
        let id = table.get(handle)?;
        self.store.write_at(id, offset, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_lifecycle() -> FileLifecycle {
        FileLifecycle::in_memory(&Config::default())
    }

    fn make_table(lifecycle: &FileLifecycle) -> OpenFileTable {
        OpenFileTable::new(lifecycle.handle_config().max_open_per_context)
    }

    fn name(s: &str) -> FileName {
        FileName::new(s).expect("valid name")
    }

    #[test]
    fn test_create_does_not_open() {
        let vfs = make_lifecycle();
        let id = vfs.create(&name("f")).expect("create");

        assert!(vfs.store().is_alive(id));
        assert_eq!(vfs.store().refcount(id), Some(0));
    }

    #[test]
    fn test_create_duplicate_fails_and_leaks_nothing() {
        let vfs = make_lifecycle();
        vfs.create(&name("f")).unwrap();

        let err = vfs.create(&name("f")).unwrap_err();
        assert!(matches!(err, VfsError::AlreadyExists(_)));
        // The rolled-back allocation was reclaimed.
        assert_eq!(vfs.store().len(), 1);
    }

    #[test]
    fn test_open_close_roundtrip() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);
        let id = vfs.create(&name("f")).unwrap();

        let handle = vfs.open(&name("f"), &table).expect("open");
        assert_eq!(vfs.store().refcount(id), Some(1));

        vfs.close(&table, handle).expect("close");
        assert_eq!(vfs.store().refcount(id), Some(0));
        // Never unlinked, so the record survives.
        assert!(vfs.store().is_alive(id));
    }

    #[test]
    fn test_open_unbound_name_fails() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);

        assert!(matches!(
            vfs.open(&name("missing"), &table),
            Err(VfsError::NotFound(_))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_close_unknown_handle_fails() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);

        assert!(matches!(
            vfs.close(&table, HandleId::new(42)),
            Err(VfsError::InvalidHandle(42))
        ));
    }

    #[test]
    fn test_open_rolls_back_reference_when_table_full() {
        let vfs = FileLifecycle::new(
            Arc::new(Directory::new()),
            Arc::new(FileStore::new(&Config::default().store)),
            HandleConfig {
                max_open_per_context: 1,
            },
        );
        let table = OpenFileTable::new(1);
        let id = vfs.create(&name("f")).unwrap();

        vfs.open(&name("f"), &table).expect("first open");
        let err = vfs.open(&name("f"), &table).unwrap_err();
        assert!(matches!(err, VfsError::ResourceExhausted(_)));
        // The failed open's reference was released.
        assert_eq!(vfs.store().refcount(id), Some(1));
    }

    #[test]
    fn test_unlink_hides_name_immediately() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);
        vfs.create(&name("f")).unwrap();

        vfs.unlink(&name("f")).expect("unlink");
        assert!(matches!(
            vfs.open(&name("f"), &table),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_unlink_twice_reports_not_found() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);
        vfs.create(&name("f")).unwrap();
        // Keep a handle so the data outlives the name.
        vfs.open(&name("f"), &table).unwrap();

        vfs.unlink(&name("f")).expect("first unlink");
        assert!(matches!(
            vfs.unlink(&name("f")),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_unlink_without_openers_reclaims_immediately() {
        let vfs = make_lifecycle();
        let id = vfs.create(&name("f")).unwrap();

        vfs.unlink(&name("f")).unwrap();
        assert!(!vfs.store().is_alive(id));
    }

    #[test]
    fn test_open_handles_survive_unlink() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);
        let id = vfs.create(&name("f")).unwrap();

        let handle = vfs.open(&name("f"), &table).unwrap();
        vfs.write(&table, handle, 0, b"survives").unwrap();

        vfs.unlink(&name("f")).unwrap();
        assert!(vfs.store().is_alive(id));
        assert_eq!(vfs.read(&table, handle, 0, 8).unwrap(), b"survives");
        vfs.write(&table, handle, 8, b" unlink").unwrap();

        vfs.close(&table, handle).unwrap();
        assert!(!vfs.store().is_alive(id));
    }

    #[test]
    fn test_name_reusable_while_old_data_pending() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);

        let old = vfs.create(&name("f")).unwrap();
        let handle = vfs.open(&name("f"), &table).unwrap();
        vfs.unlink(&name("f")).unwrap();

        // Same name, new storage; the pending record is untouched.
        let new = vfs.create(&name("f")).unwrap();
        assert_ne!(old, new);
        assert!(vfs.store().is_alive(old));

        vfs.close(&table, handle).unwrap();
        assert!(!vfs.store().is_alive(old));
        assert!(vfs.store().is_alive(new));
    }

    #[test]
    fn test_read_through_closed_handle_fails() {
        let vfs = make_lifecycle();
        let table = make_table(&vfs);
        vfs.create(&name("f")).unwrap();

        let handle = vfs.open(&name("f"), &table).unwrap();
        vfs.close(&table, handle).unwrap();

        assert!(matches!(
            vfs.read(&table, handle, 0, 1),
            Err(VfsError::InvalidHandle(_))
        ));
    }
}
