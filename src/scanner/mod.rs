//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Recursive directory walking using walkdir
//! - Bounded-sample content fingerprints (first and last 512 bytes)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`fingerprint`]: Head/tail sampling digest
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::scanner::{fingerprint, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."));
//! for path in walker.walk().filter_map(Result::ok) {
//!     match fingerprint(&path) {
//!         Ok(fp) => println!("{}  {}", fp, path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod fingerprint;
pub mod walker;

use std::path::PathBuf;

use serde::Serialize;

pub use fingerprint::{fingerprint, Fingerprint, SAMPLE_SIZE};
pub use walker::Walker;

/// A file discovered during a scan.
///
/// Immutable once created; identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }

    /// Depth of the file's parent directory, counted in path components.
    ///
    /// Deeper copies sort first when a duplicate group is presented.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.parent().map_or(0, |p| p.components().count())
    }
}

/// Errors that reject a whole scan before any work starts.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl ScanError {
    /// Validate that `root` names an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `PathNotFound` or `NotADirectory`.
    pub fn check_root(root: &std::path::Path) -> Result<(), Self> {
        if !root.exists() {
            return Err(Self::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Self::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }
}

/// A single file could not be stat'd, opened, or read.
///
/// Never fatal: the scanner logs it and moves on to the next file.
#[derive(thiserror::Error, Debug)]
#[error("Cannot access {path}: {source}")]
pub struct FileAccessError {
    /// Path where the error occurred
    pub path: PathBuf,
    /// The underlying I/O error
    #[source]
    pub source: std::io::Error,
}

impl FileAccessError {
    /// Wrap an I/O error with the path it occurred on.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
