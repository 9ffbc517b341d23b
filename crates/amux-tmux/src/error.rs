//! Tmux error types.

use thiserror::Error;

/// Errors that can occur during tmux operations.
#[derive(Debug, Error)]
pub enum TmuxError {
    /// Not running inside tmux
    #[error("not running inside tmux")]
    NotInTmux,

    /// Failed to execute tmux command, or it exited unsuccessfully
    #[error("tmux command failed: {0}")]
    CommandFailed(String),

    /// Target is missing a required part
    #[error("invalid tmux target: {0:?}")]
    InvalidTarget(String),
}

/// Result type for tmux operations.
pub type Result<T> = std::result::Result<T, TmuxError>;
