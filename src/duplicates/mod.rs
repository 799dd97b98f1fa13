//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Fingerprint refinement (Phase 2)
//! - Duplicate group management and deletion marks
//! - The selection guard that keeps one copy of every group

pub mod finder;
pub mod groups;
pub mod guard;
pub mod store;

pub use finder::{ScanResult, Scanner, ScannerConfig};
pub use groups::{group_by_size, DuplicateGroup, GroupId, Member, SizeBucket, SizeBuckets};
pub use guard::can_mark;
pub use store::{GroupStore, MarkOutcome, SelectionSummary};
