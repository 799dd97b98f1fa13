//! JSON output formatter for scan and deletion results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "id": 0,
//!       "fingerprint": "5d41402abc4b2a76b9719d911017c592",
//!       "size": 5,
//!       "files": [
//!         { "path": "/dir/a.txt", "marked": false },
//!         { "path": "/dir/b.txt", "marked": true }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "skipped_files": 0,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "marked_files": 1,
//!     "reclaimable_space": 5,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "refused_marks": [],
//!   "deletion": null
//! }
//! ```

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::actions::DeletionOutcome;
use crate::duplicates::{DuplicateGroup, GroupStore, ScanResult};
use crate::error::ExitCode;

use super::MarkRefusal;

/// A single group member in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMember {
    /// Path to the file
    pub path: String,
    /// Whether the file is marked for deletion
    pub marked: bool,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Group identifier within the scan
    pub id: u64,
    /// Fingerprint as lowercase hex (32 characters)
    pub fingerprint: String,
    /// File size in bytes
    pub size: u64,
    /// Members, kept copy first
    pub files: Vec<JsonMember>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            id: group.id.0,
            fingerprint: group.fingerprint.to_hex(),
            size: group.size,
            files: group
                .members
                .iter()
                .map(|m| JsonMember {
                    path: m.path().to_string_lossy().into_owned(),
                    marked: m.marked,
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files found under the root
    pub total_files: u64,
    /// Files that could not be read
    pub skipped_files: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one copy per group)
    pub duplicate_files: usize,
    /// Files marked for deletion
    pub marked_files: usize,
    /// Bytes freed by removing the marked files
    pub reclaimable_space: u64,
    /// Whether the scan was cancelled
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

/// Deletion result in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeletion {
    /// Removed files
    pub deleted: Vec<String>,
    /// Files that could not be removed, with the reason
    pub failures: BTreeMap<String, String>,
    /// Bytes freed
    pub bytes_freed: u64,
}

impl From<&DeletionOutcome> for JsonDeletion {
    fn from(outcome: &DeletionOutcome) -> Self {
        Self {
            deleted: outcome
                .deleted_paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            failures: outcome
                .failures
                .iter()
                .map(|(p, msg)| (p.to_string_lossy().into_owned(), msg.clone()))
                .collect(),
            bytes_freed: outcome.bytes_freed,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Remaining duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Summary statistics
    pub summary: JsonSummary,
    /// Mark commands that were refused
    pub refused_marks: Vec<MarkRefusal>,
    /// Deletion result, when a deletion ran
    pub deletion: Option<JsonDeletion>,
}

impl JsonOutput {
    /// Build the output from the store's current state.
    #[must_use]
    pub fn new(store: &GroupStore, scan: &ScanResult, exit_code: ExitCode) -> Self {
        let summary = store.summary();
        Self {
            duplicates: store
                .groups()
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary {
                total_files: scan.total_files_scanned,
                skipped_files: scan.skipped_files,
                duplicate_groups: summary.group_count,
                duplicate_files: summary.duplicate_count,
                marked_files: summary.marked_count,
                reclaimable_space: summary.space_reclaimable,
                interrupted: scan.cancelled || exit_code == ExitCode::Interrupted,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            refused_marks: Vec::new(),
            deletion: None,
        }
    }

    /// Attach refused mark commands.
    #[must_use]
    pub fn with_refusals(mut self, refusals: &[MarkRefusal]) -> Self {
        self.refused_marks = refusals.to_vec();
        self
    }

    /// Attach a deletion outcome.
    #[must_use]
    pub fn with_deletion(mut self, outcome: Option<&DeletionOutcome>) -> Self {
        self.deletion = outcome.map(JsonDeletion::from);
        self
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::GroupId;
    use crate::scanner::{FileRecord, Fingerprint};
    use std::path::PathBuf;

    fn sample() -> (GroupStore, ScanResult) {
        let group = DuplicateGroup::new(
            GroupId(0),
            Fingerprint::of_bytes(b"hello"),
            vec![
                FileRecord::new(PathBuf::from("/d/a.txt"), 5),
                FileRecord::new(PathBuf::from("/d/b.txt"), 5),
            ],
        );
        let scan = ScanResult {
            groups: vec![group],
            total_files_scanned: 3,
            cancelled: false,
            skipped_files: 0,
        };
        (GroupStore::from_scan(&scan), scan)
    }

    #[test]
    fn test_json_output_shape() {
        let (store, scan) = sample();
        let output = JsonOutput::new(&store, &scan, ExitCode::Success);
        let value: serde_json::Value =
            serde_json::from_str(&output.to_json_pretty().unwrap()).unwrap();

        assert_eq!(value["duplicates"][0]["fingerprint"], "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(value["duplicates"][0]["files"][0]["marked"], false);
        assert_eq!(value["duplicates"][0]["files"][1]["marked"], true);
        assert_eq!(value["summary"]["total_files"], 3);
        assert_eq!(value["summary"]["duplicate_files"], 1);
        assert_eq!(value["summary"]["exit_code_name"], "DS000");
        assert!(value["deletion"].is_null());
    }

    #[test]
    fn test_json_output_with_deletion_and_refusals() {
        let (store, scan) = sample();
        let mut outcome = DeletionOutcome::default();
        outcome.deleted_paths.insert(PathBuf::from("/d/b.txt"));
        outcome.bytes_freed = 5;
        let refusals = vec![MarkRefusal {
            path: PathBuf::from("/d/a.txt"),
            reason: "last kept copy".to_string(),
        }];

        let output = JsonOutput::new(&store, &scan, ExitCode::Success)
            .with_refusals(&refusals)
            .with_deletion(Some(&outcome));

        let mut buf = Vec::new();
        output.write_to(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["deletion"]["deleted"][0], "/d/b.txt");
        assert_eq!(value["deletion"]["bytes_freed"], 5);
        assert_eq!(value["refused_marks"][0]["path"], "/d/a.txt");
    }
}
