use dupsafe::duplicates::Scanner;
use dupsafe::engine::{EngineError, ScanEngine};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path, groups: usize, copies: usize) {
    for g in 0..groups {
        let content = format!("group-{g:04}-content");
        for c in 0..copies {
            fs::write(root.join(format!("g{g:04}_c{c}.dat")), content.as_bytes()).unwrap();
        }
    }
}

#[test]
fn test_engine_matches_direct_scan() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 5, 3);

    let direct = Scanner::default().scan(dir.path()).unwrap();
    let engine = ScanEngine::new();
    let threaded = engine.start_scan(dir.path()).unwrap().join().unwrap();

    assert_eq!(direct.total_files_scanned, threaded.total_files_scanned);
    assert_eq!(direct.groups.len(), threaded.groups.len());
    for (a, b) in direct.groups.iter().zip(&threaded.groups) {
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.len(), b.len());
    }
}

#[test]
fn test_progress_stream_is_monotonic_and_complete() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 10, 2);

    let engine = ScanEngine::new();
    let handle = engine.start_scan(dir.path()).unwrap();
    let values: Vec<u8> = handle.progress().iter().collect();
    let result = handle.join().unwrap();

    assert!(!result.cancelled);
    assert!(values.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(values.last(), Some(&100));
    assert!(values.iter().all(|&p| p <= 100));
}

#[test]
fn test_cancelled_scan_is_subset_of_full_scan() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 40, 2);

    let full = Scanner::default().scan(dir.path()).unwrap();

    let engine = ScanEngine::new();
    let handle = engine.start_scan(dir.path()).unwrap();
    // Cancel once fingerprinting has started.
    for p in handle.progress().iter() {
        if p > 30 {
            handle.cancel();
            break;
        }
    }
    let partial = handle.join().unwrap();

    assert!(partial.groups.len() <= full.groups.len());
    for group in &partial.groups {
        assert!(full
            .groups
            .iter()
            .any(|g| g.fingerprint == group.fingerprint && g.members == group.members));
    }
}

#[test]
fn test_invalid_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"x").unwrap();

    let engine = ScanEngine::new();
    assert!(matches!(
        engine.start_scan(&file),
        Err(EngineError::InvalidPath(_))
    ));
    assert!(!engine.is_scanning());
}
