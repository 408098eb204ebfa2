//! Integration tests for the lifecycle subsystem.
//!
//! Drives create/open/close/unlink from multiple contexts and threads,
//! covering the full deferred-deletion contract: names hide immediately,
//! open handles keep data alive, reclamation happens exactly once, and
//! racing openers either win a valid reference or lose with NotFound —
//! never a dangling one.

use std::sync::{Arc, Barrier};
use std::thread;

use limbofs_core::config::Config;
use limbofs_core::domain::{FileName, VfsError};
use limbofs_core::ports::NameIndex;
use limbofs_vfs::{FileLifecycle, OpenFileTable, ProcessContext};

fn make_lifecycle() -> Arc<FileLifecycle> {
    Arc::new(FileLifecycle::in_memory(&Config::default()))
}

fn name(s: &str) -> FileName {
    FileName::new(s).expect("valid name")
}

/// The whole drill, end to end: one creator, nine sequential opens,
/// three concurrent opener contexts, then unlink and its aftermath.
#[test]
fn test_unlink_with_concurrent_openers_scenario() {
    let vfs = make_lifecycle();
    let file = name("testUnlink.txt");

    // Create in a separate context, as the forked creator did.
    let creator = ProcessContext::new(Arc::clone(&vfs));
    let id = creator.create(&file).expect("create");
    drop(creator);
    assert!(vfs.store().is_alive(id));

    // Nine sequential opens from the main context.
    let main = ProcessContext::new(Arc::clone(&vfs));
    let mut fds = Vec::new();
    for _ in 0..9 {
        fds.push(main.open(&file).expect("sequential open"));
    }
    assert_eq!(vfs.store().refcount(id), Some(9));

    // Three independent contexts open concurrently.
    let barrier = Arc::new(Barrier::new(3));
    let mut children = vec![];
    for _ in 0..3 {
        let vfs = Arc::clone(&vfs);
        let file = file.clone();
        let barrier = Arc::clone(&barrier);
        children.push(thread::spawn(move || {
            let ctx = ProcessContext::new(vfs);
            barrier.wait();
            let handle = ctx.open(&file).expect("concurrent open before unlink");
            ctx.close(handle).expect("close");
        }));
    }
    for child in children {
        child.join().expect("child context should complete");
    }
    assert_eq!(vfs.store().refcount(id), Some(9));

    // Unlink succeeds while nine handles remain open.
    vfs.unlink(&file).expect("unlink with open handles");

    // New opens fail: the name is gone.
    assert!(matches!(main.open(&file), Err(VfsError::NotFound(_))));

    // Second unlink: the name is already gone.
    assert!(matches!(vfs.unlink(&file), Err(VfsError::NotFound(_))));

    // Data survives until the ninth close, then the id is dead.
    for fd in fds {
        assert!(vfs.store().is_alive(id));
        main.close(fd).expect("close");
    }
    assert!(!vfs.store().is_alive(id));
}

#[test]
fn test_hide_after_unlink_for_every_bound_name() {
    let vfs = make_lifecycle();
    let ctx = ProcessContext::new(Arc::clone(&vfs));

    for i in 0..20 {
        let file = name(&format!("file_{i}.txt"));
        vfs.create(&file).unwrap();
        let handle = ctx.open(&file).unwrap();

        vfs.unlink(&file).expect("unlink bound name");
        assert!(
            matches!(ctx.open(&file), Err(VfsError::NotFound(_))),
            "open after unlink must fail for {file}"
        );
        ctx.close(handle).unwrap();
    }
}

#[test]
fn test_data_written_before_unlink_readable_after() {
    let vfs = make_lifecycle();
    let writer = ProcessContext::new(Arc::clone(&vfs));
    let reader = ProcessContext::new(Arc::clone(&vfs));
    let file = name("shared.txt");

    vfs.create(&file).unwrap();
    let wfd = writer.open(&file).unwrap();
    let rfd = reader.open(&file).unwrap();
    writer.write(wfd, 0, b"written before unlink").unwrap();

    vfs.unlink(&file).unwrap();

    // Both holders still see the content and can keep writing.
    assert_eq!(reader.read(rfd, 0, 7).unwrap(), b"written");
    writer.write(wfd, 0, b"WRITTEN").unwrap();
    assert_eq!(reader.read(rfd, 0, 7).unwrap(), b"WRITTEN");

    writer.close(wfd).unwrap();
    assert_eq!(reader.read(rfd, 8, 6).unwrap(), b"before");
    reader.close(rfd).unwrap();
}

#[test]
fn test_concurrent_openers_race_against_unlink() {
    // Openers race an unlinker on the same name. Every opener either wins
    // (valid handle, readable data) or loses (NotFound); nobody may
    // observe a partially reclaimed record.
    for round in 0..50 {
        let vfs = make_lifecycle();
        let file = name("raced.txt");
        vfs.create(&file).unwrap();

        let setup = ProcessContext::new(Arc::clone(&vfs));
        let seed = setup.open(&file).unwrap();
        setup.write(seed, 0, b"payload").unwrap();
        setup.close(seed).unwrap();

        let num_openers = 4;
        let barrier = Arc::new(Barrier::new(num_openers + 1));

        let mut openers = vec![];
        for _ in 0..num_openers {
            let vfs = Arc::clone(&vfs);
            let file = file.clone();
            let barrier = Arc::clone(&barrier);
            openers.push(thread::spawn(move || {
                let ctx = ProcessContext::new(vfs);
                barrier.wait();
                match ctx.open(&file) {
                    Ok(handle) => {
                        let data = ctx.read(handle, 0, 7).expect("winner reads its data");
                        assert_eq!(&data, b"payload", "round {round}: torn read");
                        ctx.close(handle).expect("close");
                        true
                    }
                    Err(VfsError::NotFound(_)) => false,
                    Err(other) => panic!("round {round}: unexpected error {other}"),
                }
            }));
        }

        let unlinker = {
            let vfs = Arc::clone(&vfs);
            let file = file.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                vfs.unlink(&file).expect("unlink bound name");
            })
        };

        for opener in openers {
            opener.join().expect("opener should complete");
        }
        unlinker.join().expect("unlinker should complete");

        // All openers closed and the unlink landed: nothing survives.
        assert!(vfs.store().is_empty(), "round {round}: record leaked");
    }
}

#[test]
fn test_openers_before_unlink_all_succeed() {
    let vfs = make_lifecycle();
    let file = name("early.txt");
    let id = vfs.create(&file).unwrap();

    let num_openers = 8;
    let barrier = Arc::new(Barrier::new(num_openers));
    let mut handles = vec![];
    for _ in 0..num_openers {
        let vfs = Arc::clone(&vfs);
        let file = file.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let table = OpenFileTable::new(4);
            barrier.wait();
            let handle = vfs.open(&file, &table).expect("open before unlink");
            (table, handle)
        }));
    }

    let tables: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("opener should complete"))
        .collect();
    assert_eq!(vfs.store().refcount(id), Some(num_openers as u64));

    vfs.unlink(&file).unwrap();
    for (table, handle) in &tables {
        assert!(vfs.store().is_alive(id));
        vfs.close(table, *handle).unwrap();
    }
    assert!(!vfs.store().is_alive(id));
}

#[test]
fn test_openers_after_unlink_all_fail() {
    let vfs = make_lifecycle();
    let file = name("late.txt");
    vfs.create(&file).unwrap();
    vfs.unlink(&file).unwrap();

    let num_openers = 8;
    let barrier = Arc::new(Barrier::new(num_openers));
    let mut handles = vec![];
    for _ in 0..num_openers {
        let vfs = Arc::clone(&vfs);
        let file = file.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let ctx = ProcessContext::new(vfs);
            barrier.wait();
            ctx.open(&file)
        }));
    }
    for handle in handles {
        let result = handle.join().expect("opener should complete");
        assert!(matches!(result, Err(VfsError::NotFound(_))));
    }
}

#[test]
fn test_many_contexts_churn_without_leaks() {
    let vfs = make_lifecycle();
    let file = name("churn.txt");
    vfs.create(&file).unwrap();

    let num_threads = 8;
    let rounds = 100;
    let barrier = Arc::new(Barrier::new(num_threads));
    let mut workers = vec![];
    for _ in 0..num_threads {
        let vfs = Arc::clone(&vfs);
        let file = file.clone();
        let barrier = Arc::clone(&barrier);
        workers.push(thread::spawn(move || {
            let ctx = ProcessContext::new(vfs);
            barrier.wait();
            for _ in 0..rounds {
                let handle = ctx.open(&file).expect("open bound name");
                ctx.close(handle).expect("close");
            }
        }));
    }
    for worker in workers {
        worker.join().expect("worker should complete");
    }

    let id = vfs.directory().lookup(&file).unwrap();
    assert_eq!(vfs.store().refcount(id), Some(0));

    vfs.unlink(&file).unwrap();
    assert!(vfs.store().is_empty());
}
