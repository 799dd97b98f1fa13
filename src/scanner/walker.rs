//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for enumerating every regular
//! file below a root directory. Traversal runs on the caller's thread; the
//! scanner owns a single worker, so there is no parallel walk here.
//!
//! # Features
//!
//! - Entries sorted by file name within each directory (deterministic order)
//! - Symbolic links are neither followed nor reported
//! - Unreadable entries are yielded as errors instead of stopping iteration
//! - Cooperative cancellation via [`CancelToken`]
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::FileAccessError;
use crate::signal::CancelToken;

/// Recursive enumerator of regular files.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Optional cancel token polled per entry
    cancel: Option<CancelToken>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            root: path.to_path_buf(),
            cancel: None,
        }
    }

    /// Set the cancel token.
    ///
    /// When the token is cancelled the walker stops yielding entries.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Walk the directory tree, yielding paths of regular files.
    ///
    /// Errors are yielded as [`FileAccessError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, FileAccessError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .take_while(move |_| {
                if self.is_cancelled() {
                    log::debug!("Walker: cancellation requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        Some(Ok(entry.into_path()))
                    } else {
                        if entry.path_is_symlink() {
                            log::trace!("Skipping symlink: {}", entry.path().display());
                        }
                        None
                    }
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                    log::warn!("Cannot read {}: {}", path.display(), source);
                    Some(Err(FileAccessError::new(path, source)))
                }
            })
    }
}
