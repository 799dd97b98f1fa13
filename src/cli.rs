//! Command-line interface definitions for dupsafe.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API. Global options (verbosity, color, error format) apply to
//! every subcommand.
//!
//! # Example
//!
//! ```bash
//! # List duplicate groups with the default marks
//! dupsafe scan ~/Downloads
//!
//! # JSON output for scripting
//! dupsafe scan ~/Downloads --output json
//!
//! # Keep a specific copy, then move the marked ones out of the way
//! dupsafe scan ~/Photos --keep ~/Photos/best/a.jpg --delete --policy move
//!
//! # Change where moved files go
//! dupsafe config set-move-target ~/Quarantine
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files and remove extra copies without ever losing the last one.
#[derive(Debug, Parser)]
#[command(name = "dupsafe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Show or change persisted settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Unmark a file so it is kept (can be specified multiple times)
    #[arg(long, value_name = "PATH")]
    pub keep: Vec<PathBuf>,

    /// Mark a file for deletion (can be specified multiple times)
    ///
    /// Refused when it would leave its group without a kept copy.
    #[arg(long, value_name = "PATH")]
    pub discard: Vec<PathBuf>,

    /// Remove all marked files after the scan
    #[arg(long)]
    pub delete: bool,

    /// How marked files are removed
    #[arg(long, value_enum, default_value = "trash", requires = "delete")]
    pub policy: PolicyArg,

    /// Folder for the move policy (overrides the saved setting)
    #[arg(long, value_name = "DIR")]
    pub move_to: Option<PathBuf>,

    /// Skip the confirmation prompt before deleting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current settings and where they are stored
    Show,
    /// Set the folder used by the move policy
    SetMoveTarget {
        /// Target folder
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
    /// Go back to the default move folder
    ResetMoveTarget,
    /// Turn persisted debug logging on or off
    SetDebugLogging {
        /// New value
        #[arg(value_name = "BOOL", action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Removal policy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Delete for good
    Permanent,
    /// Move to the system trash
    Trash,
    /// Move into the configured folder
    Move,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_defaults() {
        let cli = Cli::try_parse_from(["dupsafe", "scan", "/tmp"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.json_errors);

        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.path, PathBuf::from("/tmp"));
        assert_eq!(args.output, OutputFormat::Text);
        assert_eq!(args.policy, PolicyArg::Trash);
        assert!(!args.delete);
        assert!(args.keep.is_empty());
    }

    #[test]
    fn test_parse_scan_full() {
        let cli = Cli::try_parse_from([
            "dupsafe", "-vv", "scan", "/data", "--output", "json", "--keep", "/data/a",
            "--discard", "/data/b", "--discard", "/data/c", "--delete", "--policy", "move",
            "--move-to", "/q", "-y",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.keep, vec![PathBuf::from("/data/a")]);
        assert_eq!(args.discard.len(), 2);
        assert!(args.delete);
        assert_eq!(args.policy, PolicyArg::Move);
        assert_eq!(args.move_to, Some(PathBuf::from("/q")));
        assert!(args.yes);
    }

    #[test]
    fn test_policy_requires_delete() {
        assert!(Cli::try_parse_from(["dupsafe", "scan", "/x", "--policy", "permanent"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dupsafe", "-q", "-v", "scan", "/x"]).is_err());
    }

    #[test]
    fn test_parse_config_commands() {
        let cli = Cli::try_parse_from(["dupsafe", "config", "set-debug-logging", "true"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::SetDebugLogging { enabled: true })
        ));

        let cli = Cli::try_parse_from(["dupsafe", "config", "set-move-target", "/m"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommand::SetMoveTarget { .. })
        ));

        let cli = Cli::try_parse_from(["dupsafe", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Show)));
    }
}
