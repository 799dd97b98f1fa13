//! Cooperative cancellation and Ctrl+C handling.
//!
//! A [`CancelToken`] wraps an `AtomicBool` shared between the caller and the
//! scan worker. The worker polls it once per file in each scan phase; nothing
//! is ever interrupted mid-read.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupsafe::signal::install_handler;
//!
//! // Ctrl+C now cancels the returned token
//! let token = install_handler().expect("Failed to install signal handler");
//!
//! if token.is_cancelled() {
//!     println!("Cancelled, returning partial results...");
//! }
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption (128 + SIGINT).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared, settable cancellation signal.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so the token can drive another scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Get a clone of the underlying flag.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// Only one handler can exist per process. Later calls reset and return the
/// token installed first, so tests that drive the application repeatedly do
/// not fail on registration.
///
/// # Errors
///
/// Returns `SignalError::InstallFailed` if the OS refuses the handler and no
/// handler was installed earlier.
pub fn install_handler() -> Result<CancelToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancelToken::new();
    let flag = token.flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current file...");
        let _ = std::io::stderr().flush();

        log::info!("Cancellation signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked token");
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(GLOBAL_TOKEN.get().cloned().unwrap_or(token))
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
