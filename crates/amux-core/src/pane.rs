//! Agent panes and tmux target addressing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detector::AgentKind;
use crate::process::Pid;
use crate::status::PaneStatus;

// ============================================================================
// Target
// ============================================================================

/// A tmux target split into its parts.
///
/// Parsed from `session:window.pane`. Missing parts are empty strings:
/// `main` is session-only, `main:2` addresses a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Target {
    pub session: String,
    pub window: String,
    pub pane: String,
}

impl Target {
    /// Splits on the last `:`, then on the last `.` of the remainder.
    ///
    /// Session names may themselves contain `:` or `.`, hence the
    /// right-to-left split.
    pub fn parse(target: &str) -> Self {
        let Some((session, rest)) = target.rsplit_once(':') else {
            return Self {
                session: target.to_string(),
                ..Self::default()
            };
        };

        let (window, pane) = rest.rsplit_once('.').unwrap_or((rest, ""));
        Self {
            session: session.to_string(),
            window: window.to_string(),
            pane: pane.to_string(),
        }
    }

    /// The `session:window` address used for window-level operations.
    pub fn window_target(&self) -> String {
        format!("{}:{}", self.session, self.window)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.window.is_empty(), self.pane.is_empty()) {
            (true, _) => write!(f, "{}", self.session),
            (false, true) => write!(f, "{}:{}", self.session, self.window),
            (false, false) => write!(f, "{}:{}.{}", self.session, self.window, self.pane),
        }
    }
}

// ============================================================================
// Pane
// ============================================================================

/// A tmux pane running a recognized coding agent.
///
/// Built fresh every poll cycle and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pane {
    /// Full tmux target, e.g. `main:2.1`
    pub target: String,
    pub session: String,
    pub window: String,
    pub pane: String,
    /// Working directory of the pane
    pub path: String,
    /// Pid of the process owning the pane (usually the shell)
    pub pid: Pid,
    pub agent: AgentKind,
    pub status: PaneStatus,
    /// Most recent activity recorded for `path`, if any
    pub last_active: Option<DateTime<Utc>>,
}

impl Pane {
    /// Creates an idle pane with no recorded activity.
    pub fn new(target: impl Into<String>, path: impl Into<String>, pid: Pid, agent: AgentKind) -> Self {
        let target = target.into();
        let Target {
            session,
            window,
            pane,
        } = Target::parse(&target);

        Self {
            target,
            session,
            window,
            pane,
            path: path.into(),
            pid,
            agent,
            status: PaneStatus::Idle,
            last_active: None,
        }
    }

    /// Sets the classified status.
    #[must_use]
    pub fn with_status(mut self, status: PaneStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the last-activity timestamp.
    #[must_use]
    pub fn with_last_active(mut self, last_active: Option<DateTime<Utc>>) -> Self {
        self.last_active = last_active;
        self
    }

    /// Returns true if the agent is blocked on the user.
    pub fn needs_attention(&self) -> bool {
        self.status == PaneStatus::NeedsAttention
    }

    /// Short label shown in lists, e.g. `2.1`.
    pub fn short_label(&self) -> String {
        if self.pane.is_empty() {
            self.window.clone()
        } else {
            format!("{}.{}", self.window, self.pane)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_target() {
        let target = Target::parse("main:2.1");
        assert_eq!(target.session, "main");
        assert_eq!(target.window, "2");
        assert_eq!(target.pane, "1");
    }

    #[test]
    fn test_parse_session_only() {
        let target = Target::parse("main");
        assert_eq!(target.session, "main");
        assert_eq!(target.window, "");
        assert_eq!(target.pane, "");
    }

    #[test]
    fn test_parse_window_only() {
        let target = Target::parse("main:2");
        assert_eq!(target.session, "main");
        assert_eq!(target.window, "2");
        assert_eq!(target.pane, "");
    }

    #[test]
    fn test_parse_session_with_separators() {
        let target = Target::parse("work:api.v2:3.0");
        assert_eq!(target.session, "work:api.v2");
        assert_eq!(target.window, "3");
        assert_eq!(target.pane, "0");
    }

    #[test]
    fn test_target_display_roundtrips() {
        for raw in ["main", "main:2", "main:2.1"] {
            assert_eq!(Target::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_window_target() {
        assert_eq!(Target::parse("main:2.1").window_target(), "main:2");
    }

    #[test]
    fn test_pane_new_splits_target() {
        let pane = Pane::new("dev:0.3", "/home/u/proj", 4242, AgentKind::Codex);
        assert_eq!(pane.session, "dev");
        assert_eq!(pane.window, "0");
        assert_eq!(pane.pane, "3");
        assert_eq!(pane.status, PaneStatus::Idle);
        assert!(pane.last_active.is_none());
        assert_eq!(pane.short_label(), "0.3");
    }

    #[test]
    fn test_pane_builders() {
        let ts = DateTime::from_timestamp_millis(1_700_000_000_000);
        let pane = Pane::new("dev:0.0", "/p", 1, AgentKind::Claude)
            .with_status(PaneStatus::NeedsAttention)
            .with_last_active(ts);
        assert!(pane.needs_attention());
        assert_eq!(pane.last_active, ts);
    }
}
