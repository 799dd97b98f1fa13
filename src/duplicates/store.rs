//! In-memory store of duplicate groups and their deletion marks.
//!
//! The store is owned by a single interactive context. Callers that share it
//! between threads must serialize `set_mark`/`toggle_mark` and deletion
//! themselves.
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::duplicates::{GroupStore, Scanner};
//! use std::path::Path;
//!
//! let result = Scanner::default().scan(Path::new(".")).unwrap();
//! let store = GroupStore::from_scan(&result);
//!
//! println!(
//!     "{} marked, {} bytes reclaimable",
//!     store.total_marked_count(),
//!     store.space_reclaimable()
//! );
//! ```

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::finder::ScanResult;
use super::groups::{DuplicateGroup, GroupId};
use super::guard::can_mark;

/// Result of a mark command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The member's mark changed.
    Applied,
    /// The member already had the requested mark.
    Unchanged,
    /// Marking would leave the group without a kept copy.
    Rejected,
    /// No such group, or the path is not a member of it.
    UnknownMember,
}

/// Aggregate statistics for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSummary {
    /// Number of duplicate groups
    pub group_count: usize,
    /// Sum over groups of (members - 1)
    pub duplicate_count: usize,
    /// Members currently marked for deletion
    pub marked_count: usize,
    /// Bytes freed if every marked, still existing file is removed
    pub space_reclaimable: u64,
}

/// Duplicate groups plus per-member marks.
#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    groups: Vec<DuplicateGroup>,
}

impl GroupStore {
    /// Build a store from a scan, applying the default marks to every group.
    #[must_use]
    pub fn from_scan(result: &ScanResult) -> Self {
        Self::from_groups(result.groups.clone())
    }

    /// Build a store from groups, applying the default marks.
    #[must_use]
    pub fn from_groups(groups: Vec<DuplicateGroup>) -> Self {
        let groups = groups
            .into_iter()
            .map(|mut g| {
                g.apply_default_marks();
                g
            })
            .collect();
        Self { groups }
    }

    /// All groups, in scan order.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Look up a group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> Option<&mut DuplicateGroup> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Find the group containing `path`.
    #[must_use]
    pub fn find_member(&self, path: &Path) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|g| g.member(path).is_some())
            .map(|g| g.id)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the store holds no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Set a member's mark, consulting the selection guard when marking.
    pub fn set_mark(&mut self, id: GroupId, path: &Path, marked: bool) -> MarkOutcome {
        let Some(group) = self.group_mut(id) else {
            return MarkOutcome::UnknownMember;
        };
        let Some(current) = group.member(path).map(|m| m.marked) else {
            return MarkOutcome::UnknownMember;
        };

        if current == marked {
            return MarkOutcome::Unchanged;
        }
        if marked && !can_mark(group, path) {
            return MarkOutcome::Rejected;
        }

        if let Some(member) = group.member_mut(path) {
            member.marked = marked;
        }
        log::debug!(
            "{} {} in group {}",
            if marked { "Marked" } else { "Unmarked" },
            path.display(),
            id
        );
        MarkOutcome::Applied
    }

    /// Flip a member's mark. Returns whether the flip was applied.
    pub fn toggle_mark(&mut self, id: GroupId, path: &Path) -> bool {
        let Some(current) = self
            .group(id)
            .and_then(|g| g.member(path))
            .map(|m| m.marked)
        else {
            return false;
        };
        self.set_mark(id, path, !current) == MarkOutcome::Applied
    }

    /// Marked members in one group (0 for an unknown group).
    #[must_use]
    pub fn marked_count(&self, id: GroupId) -> usize {
        self.group(id).map_or(0, DuplicateGroup::marked_count)
    }

    /// Marked members across all groups.
    #[must_use]
    pub fn total_marked_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::marked_count).sum()
    }

    /// Sum over groups of (members - 1).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Current on-disk size of every marked file that still exists.
    #[must_use]
    pub fn space_reclaimable(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter())
            .filter(|m| m.marked)
            .filter_map(|m| fs::metadata(m.path()).ok())
            .filter(fs::Metadata::is_file)
            .map(|meta| meta.len())
            .sum()
    }

    /// Recompute all display statistics.
    #[must_use]
    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            group_count: self.groups.len(),
            duplicate_count: self.duplicate_count(),
            marked_count: self.total_marked_count(),
            space_reclaimable: self.space_reclaimable(),
        }
    }

    /// Detach a member after its file was removed from disk.
    pub(crate) fn detach(&mut self, id: GroupId, path: &Path) -> bool {
        self.group_mut(id)
            .and_then(|g| g.detach(path))
            .is_some()
    }

    /// Drop groups left with one member or none. Returns how many were dropped.
    pub fn remove_empty_or_singleton_groups(&mut self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|g| g.len() > 1);
        let removed = before - self.groups.len();
        if removed > 0 {
            log::debug!("Dropped {} resolved group(s)", removed);
        }
        removed
    }
}
