//! Size bucketing and duplicate group structures.
//!
//! # Overview
//!
//! Size bucketing is the first phase of duplicate detection: files with
//! different sizes cannot be duplicates, so only buckets holding two or more
//! files are fingerprinted.
//!
//! # Example
//!
//! ```
//! use dupsafe::duplicates::group_by_size;
//! use dupsafe::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/a.txt"), 100),
//!     FileRecord::new(PathBuf::from("/b.txt"), 100),
//!     FileRecord::new(PathBuf::from("/c.txt"), 200),
//! ];
//!
//! let buckets = group_by_size(files);
//! assert_eq!(buckets.len(), 1);
//! assert_eq!(buckets[0].size, 100);
//! assert_eq!(buckets[0].files.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::scanner::{FileRecord, Fingerprint};

/// Files sharing one exact byte size, in discovery order.
#[derive(Debug, Clone)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRecord>,
}

impl SizeBucket {
    /// Create an empty bucket.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Add a file to this bucket.
    pub fn add(&mut self, file: FileRecord) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match bucket size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this bucket could hold duplicates (2+ files).
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Incremental size bucketing that remembers first-seen size order.
#[derive(Debug, Default)]
pub struct SizeBuckets {
    buckets: Vec<SizeBucket>,
    index: HashMap<u64, usize>,
}

impl SizeBuckets {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file into the bucket for its size.
    pub fn insert(&mut self, file: FileRecord) {
        let slot = *self.index.entry(file.size).or_insert_with(|| {
            self.buckets.push(SizeBucket::new(file.size));
            self.buckets.len() - 1
        });
        self.buckets[slot].add(file);
    }

    /// Total number of files inserted.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.iter().map(SizeBucket::len).sum()
    }

    /// Consume the collection, keeping only buckets with 2+ files.
    #[must_use]
    pub fn into_candidates(self) -> Vec<SizeBucket> {
        let total = self.buckets.len();
        let candidates: Vec<SizeBucket> = self
            .buckets
            .into_iter()
            .filter(SizeBucket::has_candidates)
            .collect();
        log::debug!(
            "Size bucketing: {} distinct sizes, {} with candidates",
            total,
            candidates.len()
        );
        candidates
    }
}

/// Group files by exact size, returning only buckets with 2+ files.
///
/// Buckets come back in the order their size was first seen.
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileRecord>) -> Vec<SizeBucket> {
    let mut buckets = SizeBuckets::new();
    for file in files {
        buckets.insert(file);
    }
    buckets.into_candidates()
}

/// Identifier of a duplicate group, unique within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One file in a duplicate group and whether it is marked for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// The file
    #[serde(flatten)]
    pub record: FileRecord,
    /// `true` when the file is selected for deletion
    pub marked: bool,
}

impl Member {
    /// An unmarked member.
    #[must_use]
    pub fn kept(record: FileRecord) -> Self {
        Self {
            record,
            marked: false,
        }
    }

    /// Path of the member's file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.record.path
    }

    /// Recorded size of the member's file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.record.size
    }
}

/// Files sharing both exact size and fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Identifier within the scan
    pub id: GroupId,
    /// Shared fingerprint
    pub fingerprint: Fingerprint,
    /// Shared size in bytes
    pub size: u64,
    /// Group members
    pub members: Vec<Member>,
}

impl DuplicateGroup {
    /// Create a group with every member unmarked.
    #[must_use]
    pub fn new(id: GroupId, fingerprint: Fingerprint, files: Vec<FileRecord>) -> Self {
        debug_assert!(files.len() >= 2, "duplicate group needs 2+ files");
        let size = files.first().map_or(0, |f| f.size);
        Self {
            id,
            fingerprint,
            size,
            members: files.into_iter().map(Member::kept).collect(),
        }
    }

    /// Order members deepest directory first and set the default marks.
    ///
    /// The first member is kept and the rest are marked. A group of zero-byte
    /// files is marked entirely.
    pub fn apply_default_marks(&mut self) {
        self.members
            .sort_by_key(|m| std::cmp::Reverse(m.record.depth()));

        let zero_byte = self.is_zero_byte();
        for (i, member) in self.members.iter_mut().enumerate() {
            member.marked = zero_byte || i > 0;
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if every member is an empty file.
    #[must_use]
    pub fn is_zero_byte(&self) -> bool {
        self.members.iter().all(|m| m.size() == 0)
    }

    /// Number of duplicate copies (members minus one original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Number of marked members.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.members.iter().filter(|m| m.marked).count()
    }

    /// Number of unmarked members.
    #[must_use]
    pub fn kept_count(&self) -> usize {
        self.members.len() - self.marked_count()
    }

    /// Find a member by path.
    #[must_use]
    pub fn member(&self, path: &Path) -> Option<&Member> {
        self.members.iter().find(|m| m.path() == path)
    }

    pub(crate) fn member_mut(&mut self, path: &Path) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.path() == path)
    }

    /// Remove a member, returning it if it was present.
    pub(crate) fn detach(&mut self, path: &Path) -> Option<Member> {
        let pos = self.members.iter().position(|m| m.path() == path)?;
        Some(self.members.remove(pos))
    }

    /// Check the keep-at-least-one invariant.
    #[must_use]
    pub fn keeps_survivor(&self) -> bool {
        self.is_zero_byte() || self.members.iter().any(|m| !m.marked)
    }
}
