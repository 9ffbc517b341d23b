//! amux Tmux - tmux CLI wrapper
//!
//! Provides:
//! - the [`TmuxClient`] trait and its CLI-backed implementation
//! - parsing of `list-panes` rows
//! - pane lifecycle actions (focus, close)
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Tmux command failures are returned as errors

use std::ffi::OsStr;

pub mod actions;
pub mod client;
pub mod error;
pub mod pane_row;

pub use actions::{kill_target, switch_to, KillScope};
pub use client::{Capture, TmuxCli, TmuxClient, TmuxConfig};
pub use error::{Result, TmuxError};
pub use pane_row::{parse_pane_rows, PaneRow};

/// Checks if we're running inside a tmux session.
///
/// Returns `true` if the `TMUX` environment variable is set and non-empty.
#[must_use]
pub fn is_in_tmux() -> bool {
    tmux_socket_set(std::env::var_os("TMUX").as_deref())
}

/// Startup precondition: fails with [`TmuxError::NotInTmux`] outside tmux.
pub fn ensure_in_tmux() -> Result<()> {
    if is_in_tmux() {
        Ok(())
    } else {
        Err(TmuxError::NotInTmux)
    }
}

fn tmux_socket_set(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}
