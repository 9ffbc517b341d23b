//! The [`TmuxClient`] seam and its tmux CLI implementation.
//!
//! Everything above this crate talks to tmux through the trait so that
//! collection and lifecycle logic can be exercised against a fake server.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Result, TmuxError};
use crate::pane_row::{parse_pane_rows, PaneRow, LIST_PANES_FORMAT};

/// Which part of a pane's buffer to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The currently visible screen
    Visible,
    /// The last `n` lines including scroll-back
    Scrollback(usize),
}

/// Operations the dashboard needs from a tmux server.
#[async_trait]
pub trait TmuxClient: Send + Sync {
    /// Lists every pane on the server.
    async fn list_panes(&self) -> Result<Vec<PaneRow>>;

    /// Captures a pane's contents as plain text.
    async fn capture_pane(&self, target: &str, capture: Capture) -> Result<String>;

    /// Makes the attached client show `session:window`.
    async fn switch_client(&self, window_target: &str) -> Result<()>;

    /// Focuses a pane within its window.
    async fn select_pane(&self, target: &str) -> Result<()>;

    /// Number of panes in `session:window`.
    async fn window_pane_count(&self, window_target: &str) -> Result<usize>;

    async fn kill_pane(&self, target: &str) -> Result<()>;

    async fn kill_window(&self, window_target: &str) -> Result<()>;
}

// ============================================================================
// CLI Implementation
// ============================================================================

/// Tmux settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TmuxConfig {
    /// Path or name of the tmux binary
    pub binary: String,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            binary: "tmux".to_string(),
        }
    }
}

/// [`TmuxClient`] backed by the `tmux` command line.
#[derive(Debug, Clone, Default)]
pub struct TmuxCli {
    config: TmuxConfig,
}

impl TmuxCli {
    pub fn new(config: TmuxConfig) -> Self {
        Self { config }
    }

    /// Runs one tmux command and returns its stdout.
    async fn run(&self, args: &[&str]) -> Result<String> {
        trace!(binary = %self.config.binary, ?args, "Running tmux");

        let output = Command::new(&self.config.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TmuxError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let subcommand = args.first().copied().unwrap_or_default();
            return Err(TmuxError::CommandFailed(format!(
                "{subcommand} failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TmuxClient for TmuxCli {
    async fn list_panes(&self) -> Result<Vec<PaneRow>> {
        let output = self.run(&["list-panes", "-a", "-F", LIST_PANES_FORMAT]).await?;
        let rows = parse_pane_rows(&output);
        debug!(panes = rows.len(), "Listed tmux panes");
        Ok(rows)
    }

    async fn capture_pane(&self, target: &str, capture: Capture) -> Result<String> {
        match capture {
            Capture::Visible => self.run(&["capture-pane", "-t", target, "-p"]).await,
            Capture::Scrollback(lines) => {
                let start = format!("-{lines}");
                self.run(&["capture-pane", "-t", target, "-p", "-S", &start])
                    .await
            }
        }
    }

    async fn switch_client(&self, window_target: &str) -> Result<()> {
        self.run(&["switch-client", "-t", window_target]).await?;
        Ok(())
    }

    async fn select_pane(&self, target: &str) -> Result<()> {
        self.run(&["select-pane", "-t", target]).await?;
        Ok(())
    }

    async fn window_pane_count(&self, window_target: &str) -> Result<usize> {
        let output = self.run(&["list-panes", "-t", window_target]).await?;
        Ok(output.lines().filter(|line| !line.trim().is_empty()).count())
    }

    async fn kill_pane(&self, target: &str) -> Result<()> {
        self.run(&["kill-pane", "-t", target]).await?;
        Ok(())
    }

    async fn kill_window(&self, window_target: &str) -> Result<()> {
        self.run(&["kill-window", "-t", window_target]).await?;
        Ok(())
    }
}
