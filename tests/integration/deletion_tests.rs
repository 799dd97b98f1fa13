use dupsafe::actions::{delete_marked, DeletePolicy};
use dupsafe::duplicates::{GroupStore, Scanner};
use std::fs;
use tempfile::tempdir;

#[cfg(unix)]
#[test]
fn test_permission_denied_is_isolated() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked_dir = dir.path().join("locked");
    let open_dir = dir.path().join("open");
    let keep_dir = dir.path().join("keep").join("deep");
    fs::create_dir_all(&locked_dir).unwrap();
    fs::create_dir_all(&open_dir).unwrap();
    fs::create_dir_all(&keep_dir).unwrap();

    // The deeper copy is kept by default.
    // Group 1: marked copy inside a read-only dir.
    fs::write(keep_dir.join("keep1.txt"), b"group-one").unwrap();
    fs::write(locked_dir.join("dup1.txt"), b"group-one").unwrap();
    // Group 2: marked copy in a writable dir.
    fs::write(keep_dir.join("keep2.txt"), b"group-two-data").unwrap();
    fs::write(open_dir.join("dup2.txt"), b"group-two-data").unwrap();

    let result = Scanner::default().scan(dir.path()).unwrap();
    let mut store = GroupStore::from_scan(&result);
    assert_eq!(store.len(), 2);

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores directory permissions; nothing to observe then.
    let canary = locked_dir.join(".canary");
    if fs::write(&canary, b"").is_ok() {
        let _ = fs::remove_file(&canary);
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let outcome = delete_marked(&mut store, &DeletePolicy::Permanent);
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    let locked_file = locked_dir.join("dup1.txt");
    let open_file = open_dir.join("dup2.txt");

    assert!(locked_file.exists());
    assert!(outcome.failures.contains_key(&locked_file));
    assert!(!open_file.exists());
    assert!(outcome.deleted_paths.contains(&open_file));

    // The failed group survives with its member still marked.
    assert_eq!(store.len(), 1);
    let id = store.find_member(&locked_file).unwrap();
    assert!(store.group(id).unwrap().member(&locked_file).unwrap().marked);
    assert_eq!(outcome.summary.marked_count, 1);
}

#[test]
fn test_move_policy_collects_duplicates() {
    let dir = tempdir().unwrap();
    let scan_root = dir.path().join("data");
    let target = dir.path().join("DuplicatedFiles");
    fs::create_dir_all(scan_root.join("a")).unwrap();
    fs::create_dir_all(scan_root.join("b")).unwrap();
    fs::create_dir_all(scan_root.join("c")).unwrap();
    // Three copies with the same name in different directories.
    for sub in ["a", "b", "c"] {
        fs::write(scan_root.join(sub).join("photo.jpg"), b"jpeg-bytes").unwrap();
    }

    let result = Scanner::default().scan(&scan_root).unwrap();
    let mut store = GroupStore::from_scan(&result);
    let outcome = delete_marked(&mut store, &DeletePolicy::MoveTo(target.clone()));

    assert_eq!(outcome.deleted_paths.len(), 2);
    assert!(outcome.failures.is_empty());
    assert!(target.join("photo.jpg").exists());
    assert!(target.join("photo (1).jpg").exists());
    assert!(scan_root.join("a").join("photo.jpg").exists());
    assert!(store.is_empty());
}

#[test]
fn test_zero_byte_files_can_all_be_removed() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty1"), b"").unwrap();
    fs::write(dir.path().join("empty2"), b"").unwrap();
    fs::write(dir.path().join("empty3"), b"").unwrap();

    let result = Scanner::default().scan(dir.path()).unwrap();
    let mut store = GroupStore::from_scan(&result);
    assert_eq!(store.total_marked_count(), 3);

    let outcome = delete_marked(&mut store, &DeletePolicy::Permanent);

    assert_eq!(outcome.deleted_paths.len(), 3);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_file_changed_after_scan_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"content").unwrap();
    fs::write(dir.path().join("b"), b"content").unwrap();
    fs::write(dir.path().join("c"), b"content").unwrap();

    let result = Scanner::default().scan(dir.path()).unwrap();
    let mut store = GroupStore::from_scan(&result);

    fs::remove_file(dir.path().join("c")).unwrap();
    assert_eq!(store.space_reclaimable(), 7);

    let outcome = delete_marked(&mut store, &DeletePolicy::Permanent);

    assert_eq!(outcome.deleted_paths.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert!(dir.path().join("a").exists());
}
