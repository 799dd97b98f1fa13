//! Command handlers behind the `dupsafe` binary.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::actions::{delete_marked, DeletePolicy, DeletionOutcome};
use crate::cli::{Cli, Commands, ConfigCommand, OutputFormat, PolicyArg, ScanArgs};
use crate::config::Settings;
use crate::duplicates::{GroupId, GroupStore, MarkOutcome};
use crate::engine::ScanEngine;
use crate::error::ExitCode;
use crate::logging::init_logging;
use crate::output::{text, JsonOutput, MarkRefusal};
use crate::progress::{ProgressSink, TerminalProgress};
use crate::signal::{install_handler, CancelToken};

/// Run the parsed command line.
///
/// # Errors
///
/// Returns an error for invalid roots, unusable settings, or I/O failures on
/// the terminal. Skipped files and failed deletions are not errors; they
/// surface as [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::load();
    init_logging(cli.verbose, cli.quiet, settings.enable_debug_logging);

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    match cli.command {
        Commands::Scan(args) => handle_scan(&args, &settings, cli.quiet),
        Commands::Config(cmd) => handle_config(cmd, settings),
    }
}

fn handle_scan(args: &ScanArgs, settings: &Settings, quiet: bool) -> Result<ExitCode> {
    let token = install_handler()?;
    let engine = ScanEngine::new().with_cancel_token(token.clone());

    let progress = TerminalProgress::new(quiet);
    let handle = engine
        .start_scan(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;
    let scan = handle.wait_with_progress(|p| progress.report(p))?;
    progress.finish(if scan.cancelled { "Cancelled" } else { "Done" });

    let mut store = GroupStore::from_scan(&scan);
    let refusals = apply_mark_commands(&mut store, &args.keep, &args.discard);

    let deletion = if args.delete {
        run_deletion(&mut store, args, settings, &token)?
    } else {
        None
    };

    let exit_code = if token.is_cancelled() {
        ExitCode::Interrupted
    } else {
        ExitCode::for_outcome(&scan, deletion.as_ref())
    };
    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Text => {
            text::write_report(&mut stdout, &store, &scan, &refusals, deletion.as_ref())?;
        }
        OutputFormat::Json => JsonOutput::new(&store, &scan, exit_code)
            .with_refusals(&refusals)
            .with_deletion(deletion.as_ref())
            .write_to(&mut stdout)?,
    }

    Ok(exit_code)
}

/// Apply `--keep` then `--discard` commands to the store.
///
/// Keeping always succeeds for a known member. Discarding goes through the
/// selection guard. Every command that could not be applied is returned.
/// Command and member paths are compared in absolute form, so `a.txt`
/// matches the member `./a.txt`.
pub fn apply_mark_commands(
    store: &mut GroupStore,
    keep: &[PathBuf],
    discard: &[PathBuf],
) -> Vec<MarkRefusal> {
    let commands = keep
        .iter()
        .map(|p| (p, false))
        .chain(discard.iter().map(|p| (p, true)));

    let mut refusals = Vec::new();
    for (path, marked) in commands {
        let outcome = match locate_member(store, path) {
            Some((id, member)) => store.set_mark(id, &member, marked),
            None => MarkOutcome::UnknownMember,
        };
        let reason = match outcome {
            MarkOutcome::Applied | MarkOutcome::Unchanged => continue,
            MarkOutcome::Rejected => "it is the last kept copy in its group",
            MarkOutcome::UnknownMember => "not a member of any duplicate group",
        };
        log::warn!("Cannot change mark of {}: {}", path.display(), reason);
        refusals.push(MarkRefusal {
            path: path.clone(),
            reason: reason.to_string(),
        });
    }
    refusals
}

fn locate_member(store: &GroupStore, path: &Path) -> Option<(GroupId, PathBuf)> {
    if let Some(id) = store.find_member(path) {
        return Some((id, path.to_path_buf()));
    }
    let wanted = std::path::absolute(path).ok()?;
    store.groups().iter().find_map(|group| {
        group
            .members
            .iter()
            .find(|m| std::path::absolute(m.path()).is_ok_and(|p| p == wanted))
            .map(|m| (group.id, m.path().to_path_buf()))
    })
}

fn resolve_policy(args: &ScanArgs, settings: &Settings) -> Result<DeletePolicy> {
    Ok(match args.policy {
        PolicyArg::Permanent => DeletePolicy::Permanent,
        PolicyArg::Trash => DeletePolicy::Trash,
        PolicyArg::Move => DeletePolicy::MoveTo(match args.move_to {
            Some(ref dir) => dir.clone(),
            None => settings
                .move_target_folder()
                .context("No folder for the move policy")?,
        }),
    })
}

fn run_deletion(
    store: &mut GroupStore,
    args: &ScanArgs,
    settings: &Settings,
    token: &CancelToken,
) -> Result<Option<DeletionOutcome>> {
    if token.is_cancelled() {
        log::warn!("Interrupted; not deleting anything");
        return Ok(None);
    }
    let marked = store.total_marked_count();
    if marked == 0 {
        log::info!("Nothing is marked for deletion");
        return Ok(None);
    }

    let policy = resolve_policy(args, settings)?;
    if !args.yes {
        let question = format!(
            "Remove {} marked file(s) ({}), {} total?",
            marked,
            policy,
            bytesize::ByteSize::b(store.space_reclaimable())
        );
        if !prompt_confirm(&question)? {
            log::info!("Deletion aborted by user");
            return Ok(None);
        }
    }
    // Ctrl+C at the prompt does not end the blocking read.
    if token.is_cancelled() {
        log::warn!("Interrupted at confirmation; not deleting anything");
        return Ok(None);
    }

    Ok(Some(delete_marked(store, &policy)))
}

/// Ask a yes/no question on stderr. Anything but `y`/`yes` means no.
fn prompt_confirm(question: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{question} (y/N): ")?;
    stderr.flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn handle_config(cmd: ConfigCommand, mut settings: Settings) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => {
            let path = Settings::config_path()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            println!("settings file: {}", path.display());
            match settings.move_target_folder() {
                Ok(folder) => println!("move target:   {}", folder.display()),
                Err(e) => println!("move target:   unavailable ({e})"),
            }
            return Ok(ExitCode::Success);
        }
        ConfigCommand::SetMoveTarget { path } => {
            settings.move_target_folder = Some(absolute(&path)?);
        }
        ConfigCommand::ResetMoveTarget => settings.move_target_folder = None,
        ConfigCommand::SetDebugLogging { enabled } => settings.enable_debug_logging = enabled,
    }

    let path = settings.save()?;
    log::info!("Settings saved to {}", path.display());
    Ok(ExitCode::Success)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))
}
