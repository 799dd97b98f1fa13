//! Output formatters for scan results.
//!
//! - [`text`]: coloured listing for people
//! - [`json`]: machine-readable output for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupsafe::duplicates::{GroupStore, Scanner};
//! use dupsafe::error::ExitCode;
//! use dupsafe::output::JsonOutput;
//! use std::path::Path;
//!
//! let scan = Scanner::default().scan(Path::new(".")).unwrap();
//! let store = GroupStore::from_scan(&scan);
//!
//! let output = JsonOutput::new(&store, &scan, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

use std::path::PathBuf;

use serde::Serialize;

pub use json::JsonOutput;

/// A mark command from the command line that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkRefusal {
    /// The path named in the command
    pub path: PathBuf,
    /// Why it was not applied
    pub reason: String,
}
