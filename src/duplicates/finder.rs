//! Duplicate finder with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Phase 1 - Size grouping** (0-30%): stat every file and bucket by
//!    exact size (see [`crate::duplicates::groups`])
//! 2. **Phase 2 - Fingerprint** (30-100%): fingerprint members of buckets with
//!    two or more files and split each bucket by fingerprint
//!
//! The cancel token is polled once per file in both phases. A cancelled scan
//! is not an error: the groups finished so far are returned with
//! [`ScanResult::cancelled`] set.
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::duplicates::{Scanner, ScannerConfig};
//! use dupsafe::signal::CancelToken;
//! use std::path::Path;
//!
//! let token = CancelToken::new();
//! let scanner = Scanner::new(ScannerConfig::default().with_cancel_token(token));
//!
//! let result = scanner.scan(Path::new(".")).unwrap();
//! println!(
//!     "{} groups among {} files",
//!     result.groups.len(),
//!     result.total_files_scanned
//! );
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::groups::{DuplicateGroup, GroupId, SizeBucket, SizeBuckets};
use crate::progress::{phase1_percent, phase2_percent, ProgressSink};
use crate::scanner::{fingerprint, FileAccessError, FileRecord, Fingerprint, ScanError, Walker};
use crate::signal::CancelToken;

/// Outcome of a scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Duplicate groups, in bucket order then first-seen fingerprint order.
    /// Every member is unmarked.
    pub groups: Vec<DuplicateGroup>,
    /// Number of regular files discovered under the root
    pub total_files_scanned: u64,
    /// True if the scan stopped early on request
    pub cancelled: bool,
    /// Files that could not be stat'd or read
    pub skipped_files: u64,
}

impl ScanResult {
    /// Sum over groups of (members - 1).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Check if no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Configuration for the scanner.
#[derive(Clone, Default)]
pub struct ScannerConfig {
    /// Optional progress sink.
    pub progress: Option<Arc<dyn ProgressSink>>,
    /// Optional cancel token for cooperative termination.
    pub cancel: Option<CancelToken>,
}

impl std::fmt::Debug for ScannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerConfig")
            .field("progress", &self.progress.as_ref().map(|_| "<sink>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl ScannerConfig {
    /// Set the progress sink.
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Set the cancel token.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn report(&self, percent: u8) {
        if let Some(ref sink) = self.progress {
            sink.report(percent);
        }
    }
}

/// Two-phase duplicate scanner.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    /// Create a scanner with the given configuration.
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Scan `root` for duplicate files.
    ///
    /// Progress is reported through the configured sink and never decreases.
    /// A completed scan always ends by reporting 100.
    ///
    /// # Errors
    ///
    /// Returns `ScanError` if `root` does not exist or is not a directory.
    /// No work is done in that case.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        ScanError::check_root(root)?;
        log::info!("Starting duplicate scan of {}", root.display());

        let mut result = ScanResult::default();

        let paths = self.enumerate(root, &mut result);
        let n = paths.len();
        result.total_files_scanned = n as u64;
        log::info!("Found {} files", n);

        if self.config.is_cancelled() {
            return Ok(self.interrupted(result, "enumeration"));
        }

        // Phase 1: size buckets
        log::info!("Phase 1: Grouping {} files by size", n);
        let mut buckets = SizeBuckets::new();
        for (i, path) in paths.into_iter().enumerate() {
            if self.config.is_cancelled() {
                return Ok(self.interrupted(result, "phase 1"));
            }
            match fs::metadata(&path) {
                Ok(meta) => buckets.insert(FileRecord::new(path, meta.len())),
                Err(e) => {
                    log::warn!("{}", FileAccessError::new(path, e));
                    result.skipped_files += 1;
                }
            }
            self.config.report(phase1_percent(i + 1, n));
        }

        let candidates = buckets.into_candidates();
        let total: usize = candidates.iter().map(SizeBucket::len).sum();
        log::info!(
            "Phase 1 complete: {} candidate files in {} size groups",
            total,
            candidates.len()
        );

        if total == 0 {
            self.config.report(100);
            log::info!("No potential duplicates found after size grouping");
            return Ok(result);
        }

        // Phase 2: fingerprints
        log::info!("Phase 2: Fingerprinting {} files", total);
        let mut processed = 0usize;
        for bucket in candidates {
            match self.split_bucket(bucket, &mut processed, total, &mut result) {
                Some(split) => {
                    for (fp, files) in split {
                        let id = GroupId(result.groups.len() as u64);
                        log::debug!(
                            "Group {}: {} files share fingerprint {}",
                            id,
                            files.len(),
                            fp
                        );
                        result.groups.push(DuplicateGroup::new(id, fp, files));
                    }
                }
                None => return Ok(self.interrupted(result, "phase 2")),
            }
        }

        self.config.report(100);
        log::info!(
            "Phase 2 complete: {} duplicate groups, {} duplicates",
            result.groups.len(),
            result.duplicate_count()
        );
        Ok(result)
    }

    fn enumerate(&self, root: &Path, result: &mut ScanResult) -> Vec<PathBuf> {
        let mut walker = Walker::new(root);
        if let Some(ref token) = self.config.cancel {
            walker = walker.with_cancel_token(token.clone());
        }

        let mut paths = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => {
                    log::warn!("{}", e);
                    result.skipped_files += 1;
                }
            }
        }
        paths
    }

    /// Fingerprint every file of one bucket.
    ///
    /// Returns the fingerprint groups with 2+ members in first-seen order,
    /// or `None` if cancellation was requested before the bucket finished.
    fn split_bucket(
        &self,
        bucket: SizeBucket,
        processed: &mut usize,
        total: usize,
        result: &mut ScanResult,
    ) -> Option<Vec<(Fingerprint, Vec<FileRecord>)>> {
        let mut order: Vec<(Fingerprint, Vec<FileRecord>)> = Vec::new();
        let mut index: HashMap<Fingerprint, usize> = HashMap::new();

        for file in bucket.files {
            if self.config.is_cancelled() {
                return None;
            }
            match fingerprint(&file.path) {
                Ok(fp) => {
                    log::trace!("{}  {}", fp, file.path.display());
                    let slot = *index.entry(fp).or_insert_with(|| {
                        order.push((fp, Vec::new()));
                        order.len() - 1
                    });
                    order[slot].1.push(file);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    result.skipped_files += 1;
                }
            }
            *processed += 1;
            self.config.report(phase2_percent(*processed, total));
        }

        Some(
            order
                .into_iter()
                .filter(|(_, files)| files.len() > 1)
                .collect(),
        )
    }

    fn interrupted(&self, mut result: ScanResult, phase: &str) -> ScanResult {
        log::info!(
            "Scan cancelled during {}: returning {} complete groups",
            phase,
            result.groups.len()
        );
        result.cancelled = true;
        result
    }
}
