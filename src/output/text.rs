//! Human-readable listing of groups, marks and deletion results.
//!
//! Colours come from `yansi` and are disabled globally by the application
//! when `--no-color` is given or stdout is not a terminal.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::DeletionOutcome;
use crate::duplicates::{DuplicateGroup, GroupStore, ScanResult};

use super::MarkRefusal;

fn size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Write one group: header line then one line per member, kept copies first
/// in the order the store holds them.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_group<W: Write>(w: &mut W, group: &DuplicateGroup) -> io::Result<()> {
    writeln!(
        w,
        "{} {} x {}  {}",
        format!("Group {}", group.id).bold(),
        group.len(),
        size(group.size),
        group.fingerprint.dim()
    )?;
    for member in &group.members {
        if member.marked {
            writeln!(w, "  {} {}", "[delete]".red(), member.path().display())?;
        } else {
            writeln!(w, "  {} {}", "[keep]  ".green(), member.path().display())?;
        }
    }
    Ok(())
}

/// Write the full report.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report<W: Write>(
    w: &mut W,
    store: &GroupStore,
    scan: &ScanResult,
    refusals: &[MarkRefusal],
    deletion: Option<&DeletionOutcome>,
) -> io::Result<()> {
    for group in store.groups() {
        write_group(w, group)?;
        writeln!(w)?;
    }

    for refusal in refusals {
        writeln!(
            w,
            "{} {}: {}",
            "refused:".yellow().bold(),
            refusal.path.display(),
            refusal.reason
        )?;
    }

    if let Some(outcome) = deletion {
        for path in &outcome.deleted_paths {
            writeln!(w, "{} {}", "removed:".green(), path.display())?;
        }
        for (path, reason) in &outcome.failures {
            writeln!(w, "{} {}: {}", "failed:".red().bold(), path.display(), reason)?;
        }
        writeln!(
            w,
            "Removed {} file(s), {} failed, freed {}",
            outcome.deleted_count(),
            outcome.failure_count(),
            size(outcome.bytes_freed)
        )?;
    }

    let summary = store.summary();
    if scan.cancelled {
        writeln!(w, "{}", "Scan cancelled; results are partial.".yellow())?;
    }
    writeln!(
        w,
        "{} files scanned ({} skipped): {} group(s), {} duplicate(s), {} marked, {} reclaimable",
        scan.total_files_scanned,
        scan.skipped_files,
        summary.group_count,
        summary.duplicate_count,
        summary.marked_count,
        size(summary.space_reclaimable).bold()
    )
}
