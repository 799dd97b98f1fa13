//! dupsafe - duplicate file finder that never deletes the last copy
//!
//! A two-phase engine (size bucketing, then a bounded head/tail MD5
//! fingerprint) finds duplicate groups on a background worker with progress
//! and cancellation. A guarded selection store and a failure-isolating
//! deletion executor remove the extra copies.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
