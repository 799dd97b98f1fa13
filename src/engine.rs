//! Background scan execution.
//!
//! [`ScanEngine`] runs at most one scan at a time on a dedicated worker
//! thread. Progress arrives on an mpsc channel carried by the returned
//! [`ScanHandle`]; the final [`ScanResult`] is collected with
//! [`ScanHandle::join`].
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::engine::ScanEngine;
//! use std::path::Path;
//!
//! let engine = ScanEngine::new();
//! let handle = engine.start_scan(Path::new(".")).unwrap();
//!
//! for percent in handle.progress() {
//!     println!("{percent}%");
//! }
//!
//! let result = handle.join().unwrap();
//! println!("{} groups", result.groups.len());
//! ```

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::duplicates::{ScanResult, Scanner, ScannerConfig};
use crate::progress::ChannelSink;
use crate::scanner::ScanError;
use crate::signal::CancelToken;

/// Name of the scan worker thread.
pub const WORKER_THREAD_NAME: &str = "dupsafe-scan";

/// Errors from starting or finishing a background scan.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A scan is already running on this engine.
    #[error("a scan is already in progress")]
    ScanInProgress,

    /// The root path was rejected.
    #[error(transparent)]
    InvalidPath(#[from] ScanError),

    /// The worker thread panicked.
    #[error("scan worker panicked")]
    WorkerPanicked,

    /// The worker thread could not be spawned.
    #[error("failed to spawn scan worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Clears the busy flag when the worker finishes, even by panicking.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owner of the single scan worker.
#[derive(Debug, Clone, Default)]
pub struct ScanEngine {
    busy: Arc<AtomicBool>,
    cancel: CancelToken,
}

impl ScanEngine {
    /// Create an idle engine with its own cancel token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive cancellation from an existing token (e.g. the Ctrl+C token).
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Check if a scan is running.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Request cancellation of the running scan.
    ///
    /// The worker stops at its next per-file checkpoint.
    pub fn cancel(&self) {
        if self.is_scanning() {
            log::info!("Cancelling scan");
        }
        self.cancel.cancel();
    }

    /// Validate `root` and start scanning it on the worker thread.
    ///
    /// # Errors
    ///
    /// - `InvalidPath` if `root` is missing or not a directory
    /// - `ScanInProgress` if another scan has not finished
    /// - `Spawn` if the thread cannot be created
    pub fn start_scan(&self, root: &Path) -> Result<ScanHandle, EngineError> {
        ScanError::check_root(root)?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Refusing to start a scan of {}: busy", root.display());
            return Err(EngineError::ScanInProgress);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));
        self.cancel.reset();

        let (tx, rx) = mpsc::channel();
        let scanner = Scanner::new(
            ScannerConfig::default()
                .with_progress_sink(Arc::new(ChannelSink::new(tx)))
                .with_cancel_token(self.cancel.clone()),
        );
        let root = root.to_path_buf();

        // On spawn failure the closure, and the guard with it, is dropped.
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let _guard = guard;
                scanner.scan(&root)
            })
            .map_err(EngineError::Spawn)?;

        Ok(ScanHandle {
            progress: rx,
            worker,
            cancel: self.cancel.clone(),
        })
    }
}

/// A running scan.
#[derive(Debug)]
pub struct ScanHandle {
    progress: Receiver<u8>,
    worker: JoinHandle<Result<ScanResult, ScanError>>,
    cancel: CancelToken,
}

impl ScanHandle {
    /// Progress percentages, non-decreasing. The channel closes when the
    /// worker finishes.
    #[must_use]
    pub fn progress(&self) -> &Receiver<u8> {
        &self.progress
    }

    /// Request cancellation of this scan.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if the worker has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Forward every progress value to `on_progress`, then join.
    ///
    /// # Errors
    ///
    /// Same as [`ScanHandle::join`].
    pub fn wait_with_progress(
        self,
        mut on_progress: impl FnMut(u8),
    ) -> Result<ScanResult, EngineError> {
        for percent in self.progress.iter() {
            on_progress(percent);
        }
        self.join()
    }

    /// Wait for the worker and return its result.
    ///
    /// # Errors
    ///
    /// - `WorkerPanicked` if the worker panicked
    /// - `InvalidPath` if the root vanished before the worker started
    pub fn join(self) -> Result<ScanResult, EngineError> {
        let result = self
            .worker
            .join()
            .map_err(|_| EngineError::WorkerPanicked)??;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree_with_duplicates(count: usize) -> TempDir {
        let dir = TempDir::new().unwrap();
        for i in 0..count {
            fs::write(dir.path().join(format!("f{i:03}")), [7u8; 64]).unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_runs_to_completion() {
        let dir = tree_with_duplicates(4);
        let engine = ScanEngine::new();

        let handle = engine.start_scan(dir.path()).unwrap();
        let mut seen = Vec::new();
        let result = handle.wait_with_progress(|p| seen.push(p)).unwrap();

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.total_files_scanned, 4);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
        assert!(!engine.is_scanning());
    }

    #[test]
    fn test_invalid_root_rejected_before_spawn() {
        let engine = ScanEngine::new();
        let err = engine
            .start_scan(Path::new("/definitely/not/here"))
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidPath(ScanError::PathNotFound(_))));
        assert!(!engine.is_scanning());
    }

    #[test]
    fn test_second_scan_rejected_while_busy() {
        let dir = tree_with_duplicates(2);
        let engine = ScanEngine::new();
        engine.busy.store(true, Ordering::SeqCst);

        assert!(matches!(
            engine.start_scan(dir.path()),
            Err(EngineError::ScanInProgress)
        ));

        engine.busy.store(false, Ordering::SeqCst);
        let handle = engine.start_scan(dir.path()).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_engine_is_reusable() {
        let dir = tree_with_duplicates(3);
        let engine = ScanEngine::new();

        let first = engine.start_scan(dir.path()).unwrap().join().unwrap();
        let second = engine.start_scan(dir.path()).unwrap().join().unwrap();

        assert_eq!(first.groups.len(), second.groups.len());
    }

    #[test]
    fn test_cancel_after_progress_returns_partial() {
        let dir = tree_with_duplicates(50);
        let engine = ScanEngine::new();
        let handle = engine.start_scan(dir.path()).unwrap();

        // Wait for the first value then cancel.
        let first = handle.progress().recv().ok();
        engine.cancel();
        let result = handle.join().unwrap();

        assert!(first.is_some());
        // A single bucket: either it finished before cancel, or nothing did.
        assert!(result.groups.len() <= 1);
        if result.cancelled {
            assert!(result.groups.is_empty());
        }
    }

    #[test]
    fn test_start_resets_previous_cancel() {
        let dir = tree_with_duplicates(2);
        let engine = ScanEngine::new();
        engine.cancel();

        let result = engine.start_scan(dir.path()).unwrap().join().unwrap();
        assert!(!result.cancelled);
        assert_eq!(result.groups.len(), 1);
    }
}
