//! Removal of marked duplicates.
//!
//! # Overview
//!
//! This module removes every marked member of a [`GroupStore`]:
//! - Permanent deletion (`std::fs::remove_file`)
//! - Move to system trash (recoverable)
//! - Move to a folder, renaming on collision
//!
//! Each file is attempted independently. A failure is recorded against its
//! path and the batch continues.
//!
//! # Safety
//!
//! A group whose non-empty members are all marked is refused as a whole, so
//! at least one copy of every group survives even if marks were corrupted.
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::actions::delete::{delete_marked, DeletePolicy};
//! use dupsafe::duplicates::{GroupStore, Scanner};
//! use std::path::Path;
//!
//! let result = Scanner::default().scan(Path::new(".")).unwrap();
//! let mut store = GroupStore::from_scan(&result);
//!
//! let outcome = delete_marked(&mut store, &DeletePolicy::Trash);
//! println!("{}", outcome.message());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::{GroupId, GroupStore, SelectionSummary};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Moving the file to the target folder failed.
    #[error("move to {target} failed for {path}: {message}")]
    MoveFailed {
        path: PathBuf,
        target: PathBuf,
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::MoveFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// How marked files are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Remove the file for good.
    #[default]
    Permanent,
    /// Move the file to the system recycle bin.
    Trash,
    /// Move the file into this folder, created on demand.
    MoveTo(PathBuf),
}

impl std::fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent delete"),
            Self::Trash => write!(f, "move to trash"),
            Self::MoveTo(dir) => write!(f, "move to {}", dir.display()),
        }
    }
}

/// Result of a successful single-file removal.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was removed.
    pub path: PathBuf,
    /// Size of the removed file in bytes.
    pub size: u64,
    /// New location when the file was moved to a folder.
    pub moved_to: Option<PathBuf>,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            moved_to: None,
        }
    }
}

/// Result of [`delete_marked`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionOutcome {
    /// Files removed from their original location.
    pub deleted_paths: BTreeSet<PathBuf>,
    /// Files that could not be removed, with the reason.
    pub failures: BTreeMap<PathBuf, String>,
    /// Bytes freed at the original locations.
    pub bytes_freed: u64,
    /// Store statistics after the deletion.
    pub summary: SelectionSummary,
}

impl DeletionOutcome {
    /// Number of removed files.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted_paths.len()
    }

    /// Number of failed removals.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every attempted removal succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn message(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {} bytes",
                self.deleted_count(),
                self.bytes_freed
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {} bytes",
                self.deleted_count(),
                self.failure_count(),
                self.bytes_freed
            )
        }
    }
}

fn file_size(path: &Path) -> Result<u64, DeleteError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| DeleteError::from_io(path, e))
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file can't be inspected
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size))
}

/// Pick a free name for `file_name` inside `folder`.
///
/// `name.ext` becomes `name (1).ext`, `name (2).ext`, ... until unused.
#[must_use]
pub fn unique_destination(folder: &Path, file_name: &std::ffi::OsStr) -> PathBuf {
    let candidate = folder.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());

    (1u32..)
        .map(|n| match ext {
            Some(ref ext) => folder.join(format!("{stem} ({n}).{ext}")),
            None => folder.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Move a single file into `folder`, keeping its name when possible.
///
/// The folder is created if missing. Across file systems the file is copied
/// then removed.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `MoveFailed` if the folder can't be created or the move fails
pub fn move_to_folder(path: &Path, folder: &Path) -> Result<DeleteResult, DeleteError> {
    let size = file_size(path)?;
    let move_failed = |message: String| DeleteError::MoveFailed {
        path: path.to_path_buf(),
        target: folder.to_path_buf(),
        message,
    };

    fs::create_dir_all(folder).map_err(|e| move_failed(e.to_string()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| move_failed("path has no file name".to_string()))?;
    let dest = unique_destination(folder, file_name);

    match fs::rename(path, &dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "Rename across devices for {}, copying instead",
                path.display()
            );
            fs::copy(path, &dest).map_err(|e| move_failed(e.to_string()))?;
            if let Err(e) = fs::remove_file(path) {
                let _ = fs::remove_file(&dest);
                return Err(move_failed(e.to_string()));
            }
        }
        Err(e) => return Err(move_failed(e.to_string())),
    }

    log::info!("Moved {} -> {} ({} bytes)", path.display(), dest.display(), size);
    let mut result = DeleteResult::new(path.to_path_buf(), size);
    result.moved_to = Some(dest);
    Ok(result)
}

/// Remove one file according to `policy`.
///
/// # Errors
///
/// Returns the policy's `DeleteError` on failure.
pub fn remove_with_policy(path: &Path, policy: &DeletePolicy) -> Result<DeleteResult, DeleteError> {
    match policy {
        DeletePolicy::Permanent => permanent_delete(path),
        DeletePolicy::Trash => delete_to_trash(path),
        DeletePolicy::MoveTo(folder) => move_to_folder(path, folder),
    }
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if all copies would be deleted.
///
/// # Example
///
/// ```
/// use dupsafe::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![
///     PathBuf::from("/original.txt"),
///     PathBuf::from("/copy1.txt"),
///     PathBuf::from("/copy2.txt"),
/// ];
///
/// let selected = vec![PathBuf::from("/copy1.txt"), PathBuf::from("/copy2.txt")];
/// assert!(validate_preserves_copy(&selected, &group).is_ok());
///
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    use std::collections::HashSet;

    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        log::debug!(
            "Deletion validated: {} files selected, {} preserved",
            selected_paths.len(),
            preserved_count
        );
        Ok(())
    }
}

struct GroupPlan {
    id: GroupId,
    zero_byte: bool,
    marked: Vec<PathBuf>,
    all: Vec<PathBuf>,
}

/// Remove every marked member of `store` using `policy`.
///
/// Removed members are detached from their group; failed ones stay attached
/// and marked. Groups left with fewer than two members are dropped and the
/// returned summary reflects the store afterwards.
pub fn delete_marked(store: &mut GroupStore, policy: &DeletePolicy) -> DeletionOutcome {
    let plans: Vec<GroupPlan> = store
        .groups()
        .iter()
        .filter(|g| g.marked_count() > 0)
        .map(|g| GroupPlan {
            id: g.id,
            zero_byte: g.is_zero_byte(),
            marked: g
                .members
                .iter()
                .filter(|m| m.marked)
                .map(|m| m.path().to_path_buf())
                .collect(),
            all: g.members.iter().map(|m| m.path().to_path_buf()).collect(),
        })
        .collect();

    log::info!(
        "Removing {} marked file(s) in {} group(s) ({})",
        plans.iter().map(|p| p.marked.len()).sum::<usize>(),
        plans.len(),
        policy
    );

    let mut outcome = DeletionOutcome::default();
    for plan in plans {
        if !plan.zero_byte {
            if let Err(e) = validate_preserves_copy(&plan.marked, &plan.all) {
                log::warn!("Skipping group {}: {}", plan.id, e);
                for path in plan.marked {
                    outcome.failures.insert(path, e.to_string());
                }
                continue;
            }
        }

        for path in plan.marked {
            match remove_with_policy(&path, policy) {
                Ok(removed) => {
                    outcome.bytes_freed += removed.size;
                    store.detach(plan.id, &path);
                    outcome.deleted_paths.insert(path);
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", path.display(), e);
                    outcome.failures.insert(path, e.to_string());
                }
            }
        }
    }

    store.remove_empty_or_singleton_groups();
    outcome.summary = store.summary();
    log::info!("{}", outcome.message());
    outcome
}
