use dupsafe::actions::{delete_marked, DeletePolicy};
use dupsafe::duplicates::{GroupStore, MarkOutcome, Scanner};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let result = Scanner::default().scan(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.total_files_scanned, 0);
    assert!(!result.cancelled);
}

#[test]
fn test_scan_mark_delete_scenario() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same-data!");
    write(dir.path(), "b.txt", b"same-data!");
    write(dir.path(), "c.txt", b"other-data");
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");

    let result = Scanner::default().scan(dir.path()).unwrap();
    assert_eq!(result.total_files_scanned, 3);
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    assert!(result.groups[0].member(&a).is_some());
    assert!(result.groups[0].member(&b).is_some());

    let mut store = GroupStore::from_scan(&result);
    let id = store.find_member(&b).unwrap();

    // Start from a clean selection.
    assert_eq!(store.set_mark(id, &b, false), MarkOutcome::Applied);
    assert_eq!(store.set_mark(id, &b, true), MarkOutcome::Applied);
    assert_eq!(store.set_mark(id, &a, true), MarkOutcome::Rejected);
    assert_eq!(store.marked_count(id), 1);
    assert_eq!(store.space_reclaimable(), 10);

    let outcome = delete_marked(&mut store, &DeletePolicy::Permanent);

    assert!(a.exists());
    assert!(!b.exists());
    assert!(dir.path().join("c.txt").exists());
    assert!(outcome.deleted_paths.contains(&b));
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.bytes_freed, 10);
    assert!(store.is_empty());
    assert_eq!(outcome.summary.group_count, 0);
}

#[test]
fn test_default_marks_keep_deepest_copy() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.bin", b"payload");
    write(dir.path(), "x/y/deep.bin", b"payload");
    write(dir.path(), "x/mid.bin", b"payload");

    let result = Scanner::default().scan(dir.path()).unwrap();
    let store = GroupStore::from_scan(&result);
    let group = &store.groups()[0];

    assert_eq!(group.members[0].path(), dir.path().join("x/y/deep.bin"));
    assert!(!group.members[0].marked);
    assert!(group.members[1..].iter().all(|m| m.marked));
    assert_eq!(store.duplicate_count(), 2);
}

#[test]
fn test_only_sampled_bytes_matter() {
    let dir = tempdir().unwrap();
    let mut first = vec![b'a'; 4096];
    let mut second = first.clone();
    first[2000] = b'X';
    second[2000] = b'Y';
    write(dir.path(), "one", &first);
    write(dir.path(), "two", &second);

    let result = Scanner::default().scan(dir.path()).unwrap();

    // Differences outside the head and tail windows are not seen.
    assert_eq!(result.groups.len(), 1);
}

#[test]
fn test_tail_difference_separates_files() {
    let dir = tempdir().unwrap();
    let first = vec![b'a'; 4096];
    let mut second = first.clone();
    second[4095] = b'b';
    write(dir.path(), "one", &first);
    write(dir.path(), "two", &second);

    let result = Scanner::default().scan(dir.path()).unwrap();
    assert!(result.groups.is_empty());
}

#[test]
fn test_multiple_groups_in_nested_tree() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/1.txt", b"alpha");
    write(dir.path(), "b/1.txt", b"alpha");
    write(dir.path(), "a/2.txt", b"beta-beta");
    write(dir.path(), "b/2.txt", b"beta-beta");
    write(dir.path(), "c/2.txt", b"beta-beta");
    write(dir.path(), "unique.txt", b"only one of me");

    let result = Scanner::default().scan(dir.path()).unwrap();
    assert_eq!(result.total_files_scanned, 6);
    assert_eq!(result.groups.len(), 2);

    let mut sizes: Vec<usize> = result.groups.iter().map(|g| g.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);
    assert_eq!(result.duplicate_count(), 3);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "real.txt", b"linked content");
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
        .unwrap();

    let result = Scanner::default().scan(dir.path()).unwrap();
    assert_eq!(result.total_files_scanned, 1);
    assert!(result.groups.is_empty());
}
