//! Error types for the amux TUI.
//!
//! Three layers of failure, each handled differently:
//! - [`TuiError`]: startup and terminal failures; fatal.
//! - [`CollectionError`]: a poll cycle could not enumerate panes; shown as
//!   an error banner until the next successful cycle.
//! - [`ActionError`]: a switch or kill request failed; shown as a transient
//!   footer message.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.
//! No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, or `todo!()`.

use std::io;
use std::path::PathBuf;

use amux_tmux::TmuxError;
use thiserror::Error;

// ============================================================================
// TUI Error Type
// ============================================================================

/// Fatal TUI application errors.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Failed to initialize the terminal.
    ///
    /// This occurs when the TUI cannot set up raw mode or the alternate
    /// screen, typically when not attached to a TTY.
    #[error("Failed to initialize terminal: {0}")]
    TerminalInit(String),

    /// Failed to restore the terminal on exit.
    ///
    /// Running `reset` can help recover.
    #[error("Failed to restore terminal: {0}")]
    TerminalCleanup(String),

    /// The configuration file exists but could not be read or parsed.
    #[error("Invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// I/O error passthrough.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Cycle and Action Errors
// ============================================================================

/// A poll cycle failed to produce a listing.
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Pane enumeration or capture failed
    #[error(transparent)]
    Tmux(#[from] TmuxError),

    /// A blocking collection task died
    #[error("collection task failed: {0}")]
    Task(String),
}

/// A user-requested pane action failed.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("switch to {target} failed: {source}")]
    Switch {
        target: String,
        #[source]
        source: TmuxError,
    },

    #[error("kill {target} failed: {source}")]
    Kill {
        target: String,
        #[source]
        source: TmuxError,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Convenience Result type alias for TUI operations.
pub type Result<T> = std::result::Result<T, TuiError>;

// ============================================================================
// Tests
// ============================================================================
