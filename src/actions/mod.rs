//! File actions module.
//!
//! # Deletion
//!
//! The delete module removes marked duplicates with:
//! - Permanent deletion
//! - Move to system trash (recoverable)
//! - Move to a holding folder
//! - Per-file failure isolation
//!
//! ```no_run
//! use dupsafe::actions::delete::permanent_delete;
//! use std::path::Path;
//!
//! let result = permanent_delete(Path::new("/path/to/duplicate.txt"));
//! ```

pub mod delete;

pub use delete::{
    delete_marked, delete_to_trash, move_to_folder, permanent_delete, remove_with_policy,
    validate_preserves_copy, DeleteError, DeletePolicy, DeleteResult, DeletionOutcome,
};
