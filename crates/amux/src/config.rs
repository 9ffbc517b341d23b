//! User configuration.
//!
//! Loaded once at startup from `~/.config/amux/config.toml` (or `--config`).
//! Every field has a default, so a missing file or an empty one is fine; a
//! file that exists but cannot be read or parsed is a startup error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use amux_core::ProcessSource;
use amux_tmux::TmuxConfig;
use serde::Deserialize;
use tracing::debug;

use crate::app::AppOptions;
use crate::collector::CollectorOptions;
use crate::error::{Result, TuiError};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Delay between full classification cycles
    pub panes_interval_ms: u64,

    /// Delay between preview captures
    pub preview_interval_ms: u64,

    /// Trailing pane lines inspected for classification
    pub capture_lines: usize,

    /// Scroll-back lines shown in the preview
    pub preview_lines: usize,

    /// Activity log; defaults to `~/.claude/history.jsonl`
    pub history_path: Option<PathBuf>,

    /// How process snapshots are taken
    pub process_source: ProcessSource,

    /// Exit after switching to a pane
    pub quit_on_switch: bool,

    pub tmux: TmuxConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panes_interval_ms: 2000,
            preview_interval_ms: 200,
            capture_lines: amux_core::status::DEFAULT_CAPTURE_LINES,
            preview_lines: 50,
            history_path: None,
            process_source: ProcessSource::default(),
            quit_on_switch: true,
            tmux: TmuxConfig::default(),
        }
    }
}

impl Config {
    /// Default configuration path, if a config directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("amux").join("config.toml"))
    }

    /// Loads from `path`, or from [`Config::default_path`] when `None`.
    ///
    /// # Errors
    ///
    /// * `TuiError::Config` - If the file exists but cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(TuiError::Config {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        Self::parse(&content).map_err(|reason| TuiError::Config { path, reason })
    }

    /// Parses TOML content.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Activity log location, falling back to the default under `home`.
    pub fn history_path(&self, home: Option<&Path>) -> Option<PathBuf> {
        self.history_path
            .clone()
            .or_else(|| amux_core::ActivityHistory::default_path(home))
    }

    pub fn panes_interval(&self) -> Duration {
        Duration::from_millis(self.panes_interval_ms)
    }

    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms)
    }

    /// Update-loop options derived from this config.
    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            panes_interval: self.panes_interval(),
            preview_interval: self.preview_interval(),
            quit_on_switch: self.quit_on_switch,
        }
    }

    /// Collector options derived from this config.
    pub fn collector_options(&self, home: Option<PathBuf>) -> CollectorOptions {
        CollectorOptions {
            process_source: self.process_source,
            capture_lines: self.capture_lines,
            preview_lines: self.preview_lines,
            home,
        }
    }
}
