//! Selection guard: the single gate protecting the keep-one invariant.
//!
//! Every transition of a member from kept to marked must be approved by
//! [`can_mark`]. Unmarking is always allowed.

use std::path::Path;

use super::groups::DuplicateGroup;

/// Decide whether `target` may be marked for deletion.
///
/// Zero-byte files may always be marked. Any other file may be marked only
/// if at least one *other* member of the group stays unmarked.
///
/// Returns `false` for a path that is not a member of the group.
///
/// # Example
///
/// ```
/// use dupsafe::duplicates::{can_mark, DuplicateGroup, GroupId};
/// use dupsafe::scanner::{FileRecord, Fingerprint};
/// use std::path::{Path, PathBuf};
///
/// let group = DuplicateGroup::new(
///     GroupId(0),
///     Fingerprint::of_bytes(b"data"),
///     vec![
///         FileRecord::new(PathBuf::from("/a.txt"), 4),
///         FileRecord::new(PathBuf::from("/b.txt"), 4),
///     ],
/// );
///
/// assert!(can_mark(&group, Path::new("/b.txt")));
/// ```
#[must_use]
pub fn can_mark(group: &DuplicateGroup, target: &Path) -> bool {
    let Some(member) = group.member(target) else {
        return false;
    };

    if member.size() == 0 {
        return true;
    }

    let other_survivors = group
        .members
        .iter()
        .filter(|m| m.path() != target && !m.marked)
        .count();

    if other_survivors == 0 {
        log::debug!(
            "Refusing to mark {}: it is the last kept copy in group {}",
            target.display(),
            group.id
        );
    }
    other_survivors > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::groups::GroupId;
    use crate::scanner::{FileRecord, Fingerprint};
    use std::path::PathBuf;

    fn group(paths: &[&str], size: u64) -> DuplicateGroup {
        DuplicateGroup::new(
            GroupId(0),
            Fingerprint::of_bytes(b"g"),
            paths
                .iter()
                .map(|p| FileRecord::new(PathBuf::from(p), size))
                .collect(),
        )
    }

    #[test]
    fn test_allows_when_another_member_kept() {
        let g = group(&["/a", "/b"], 10);
        assert!(can_mark(&g, Path::new("/a")));
        assert!(can_mark(&g, Path::new("/b")));
    }

    #[test]
    fn test_rejects_last_survivor() {
        let mut g = group(&["/a", "/b", "/c"], 10);
        g.members[1].marked = true;
        g.members[2].marked = true;

        assert!(!can_mark(&g, Path::new("/a")));
    }

    #[test]
    fn test_target_already_marked_counts_others_only() {
        let mut g = group(&["/a", "/b"], 10);
        g.members[0].marked = true;

        // Re-marking /a is fine while /b is kept.
        assert!(can_mark(&g, Path::new("/a")));
        // Marking /b would leave nothing.
        assert!(!can_mark(&g, Path::new("/b")));
    }

    #[test]
    fn test_zero_byte_always_allowed() {
        let mut g = group(&["/a", "/b"], 0);
        g.members[0].marked = true;

        assert!(can_mark(&g, Path::new("/b")));
    }

    #[test]
    fn test_unknown_member_rejected() {
        let g = group(&["/a", "/b"], 10);
        assert!(!can_mark(&g, Path::new("/zzz")));
    }
}
