//! Progress reporting.
//!
//! The scanner reports a single integer percentage (0-100) through a
//! [`ProgressSink`]. Phase 1 covers 0-30, fingerprinting covers 30-100.
//!
//! Sinks provided here:
//! - [`ChannelSink`]: forwards values over an mpsc channel (used by the engine)
//! - [`NoProgress`]: discards everything
//! - [`TerminalProgress`]: an indicatif bar for the command line

use std::sync::mpsc::Sender;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Receiver of scan progress percentages.
///
/// Within one scan the reported values never decrease.
pub trait ProgressSink: Send + Sync {
    /// Called with the current overall percentage (0-100).
    fn report(&self, percent: u8);
}

/// Sink that ignores all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// Sink that forwards percentages to a channel.
///
/// Repeated values are collapsed so the receiver sees each percentage once.
/// A disconnected receiver is not an error; values are simply dropped.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Mutex<Sender<u8>>,
    last: Mutex<Option<u8>>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel.
    #[must_use]
    pub fn new(tx: Sender<u8>) -> Self {
        Self {
            tx: Mutex::new(tx),
            last: Mutex::new(None),
        }
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, percent: u8) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if *last == Some(percent) {
            return;
        }
        *last = Some(percent);

        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        if tx.send(percent).is_err() {
            log::trace!("Progress receiver dropped, discarding {}%", percent);
        }
    }
}

/// Percentage after `done` of `total` files in phase 1: `floor(done / total * 30)`.
#[must_use]
pub fn phase1_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as u64 * 30) / total as u64).min(30) as u8
}

/// Percentage after `done` of `total` files in phase 2:
/// `min(100, 30 + floor(done / total * 70))`.
#[must_use]
pub fn phase2_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (30 + (done as u64 * 70) / total as u64).min(100) as u8
}

/// Terminal progress bar using indicatif.
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    /// Create a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        if quiet {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-"),
        );
        bar.set_message("Scanning");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// Update the message shown next to the bar.
    pub fn set_message(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Finish and leave the bar on screen with a final message.
    pub fn finish(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.finish_with_message(message.to_string());
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn report(&self, percent: u8) {
        if let Some(ref bar) = self.bar {
            bar.set_position(u64::from(percent));
            if percent >= 30 {
                bar.set_message("Fingerprinting");
            }
        }
    }
}
