mod common;

use common::TestUnion;
use std::fs;
use std::sync::Arc;
use std::thread;
use unionfs_cow::overlay::{BranchMode, FileKind};

#[test]
fn test_delete_from_read_only_branch_creates_whiteout() {
    let union = TestUnion::rw_over_ro();
    union.write(1, "note.txt", "read-only data");

    assert_eq!(union.visible_in("/note.txt"), Some(1));

    union.union_unlink("/note.txt").unwrap();

    // the read-only branch is untouched
    assert_eq!(
        fs::read_to_string(union.roots[1].join("note.txt")).unwrap(),
        "read-only data"
    );
    assert!(union.marker(0, "note.txt").is_file());
    assert!(union.manager.is_hidden("/note.txt", 0));
    assert_eq!(union.visible_in("/note.txt"), None);
}

#[test]
fn test_delete_from_writable_branch_without_lower_copy() {
    let union = TestUnion::rw_over_ro();
    union.write(0, "scratch.txt", "temporary");

    union.union_unlink("/scratch.txt").unwrap();

    assert!(!union.roots[0].join("scratch.txt").exists());
    assert!(!union.marker(0, "scratch.txt").exists());
    assert_eq!(union.visible_in("/scratch.txt"), None);
}

#[test]
fn test_delete_copied_up_file_hides_lower_original() {
    let union = TestUnion::rw_over_ro();
    union.write(1, "docs/readme.md", "original");
    union.write(0, "docs/readme.md", "edited");

    assert_eq!(union.visible_in("/docs/readme.md"), Some(0));
    union.union_unlink("/docs/readme.md").unwrap();

    assert!(union.marker(0, "docs/readme.md").is_file());
    assert!(union.roots[0].join(".unionfs/docs").is_dir());
    assert_eq!(union.visible_in("/docs/readme.md"), None);
}

#[test]
fn test_recreate_after_delete_removes_whiteout() {
    let union = TestUnion::rw_over_ro();
    union.write(1, "note.txt", "old");
    union.union_unlink("/note.txt").unwrap();
    assert_eq!(union.visible_in("/note.txt"), None);

    union.write(0, "note.txt", "new");
    let report = union.manager.remove_whiteouts("/note.txt", Some(0)).unwrap();

    assert_eq!(report.removed, vec![0]);
    assert!(!union.manager.is_hidden("/note.txt", 0));
    assert_eq!(union.visible_in("/note.txt"), Some(0));
}

#[test]
fn test_hidden_directory_hides_lower_subtree() {
    let union = TestUnion::new(&[BranchMode::Rw, BranchMode::Ro, BranchMode::Ro]);
    union.write(1, "build/out/app.o", "obj");
    union.write(2, "build/log.txt", "log");

    union
        .manager
        .maybe_create_whiteout("/build", 0, FileKind::Dir)
        .unwrap();

    assert!(union.marker(0, "build").is_dir());
    assert_eq!(union.visible_in("/build"), None);
    assert_eq!(union.visible_in("/build/out/app.o"), None);
    assert_eq!(union.visible_in("/build/log.txt"), None);
}

#[test]
fn test_marker_in_middle_branch_hides_only_below() {
    let union = TestUnion::new(&[BranchMode::Rw, BranchMode::Rw, BranchMode::Ro]);
    union.write(0, "a.txt", "top");
    union.write(2, "a.txt", "bottom");
    union.manager.hide_file("/a.txt", 1).unwrap();

    assert_eq!(union.visible_in("/a.txt"), Some(0));
    fs::remove_file(union.roots[0].join("a.txt")).unwrap();
    assert_eq!(union.visible_in("/a.txt"), None);
}

#[test]
fn test_concurrent_create_whiteout_same_marker() {
    let union = TestUnion::rw_over_ro();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&union.manager);
            thread::spawn(move || manager.hide_file("/deep/nested/dir/file.txt", 0))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert!(union.marker(0, "deep/nested/dir/file.txt").is_file());
    let entries = union.manager.list_whiteouts(0).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_concurrent_create_whiteouts_share_meta_dirs() {
    let union = TestUnion::rw_over_ro();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let manager = Arc::clone(&union.manager);
            thread::spawn(move || manager.hide_file(&format!("/shared/dir/file{}", i), 0))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    for i in 0..16 {
        assert!(union.manager.is_hidden(&format!("/shared/dir/file{}", i), 0));
    }
    assert_eq!(union.manager.list_whiteouts(0).unwrap().len(), 16);
}
