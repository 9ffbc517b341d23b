//! Agent detectors and the registry that resolves panes to agents.
//!
//! Each supported agent is an [`AgentKind`] with its own busy predicate.
//! Predicates are deliberately heterogeneous: some agents render an
//! interrupt hint while working, Claude Code instead keeps a `caffeinate`
//! helper alive in its process tree.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::process::{Pid, ProcessTree};

/// Signature shared by all busy predicates.
///
/// Arguments are the recently captured pane lines, the pane's owning pid
/// and the process snapshot of the current cycle.
pub type BusyPredicate = fn(&[String], Pid, &ProcessTree) -> bool;

// ============================================================================
// Agent Kind
// ============================================================================

/// Supported coding agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Claude Code
    Claude,
    /// Google Gemini CLI (runs under `node`)
    Gemini,
    /// OpenAI Codex CLI
    Codex,
    /// OpenCode
    OpenCode,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [Self::Claude, Self::Gemini, Self::Codex, Self::OpenCode];

    /// Binary name as seen in `pane_current_command` or the process table.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Codex => "codex",
            Self::OpenCode => "opencode",
        }
    }

    /// Returns a descriptive label for the agent.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Claude => "Claude Code",
            Self::Gemini => "Gemini CLI",
            Self::Codex => "Codex CLI",
            Self::OpenCode => "OpenCode",
        }
    }

    /// The built-in busy predicate for this agent.
    pub fn busy_predicate(&self) -> BusyPredicate {
        match self {
            Self::Claude => claude_is_busy,
            Self::Gemini => gemini_is_busy,
            Self::Codex => codex_is_busy,
            Self::OpenCode => opencode_is_busy,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Helper process Claude Code keeps alive only while it is working.
pub const CLAUDE_BUSY_SENTINEL: &str = "caffeinate";

fn claude_is_busy(_lines: &[String], pid: Pid, tree: &ProcessTree) -> bool {
    tree.has_grandchild(pid, CLAUDE_BUSY_SENTINEL)
}

// e.g. "⠹ Investigating the Project (esc to cancel, 8s)"
fn gemini_is_busy(lines: &[String], _pid: Pid, _tree: &ProcessTree) -> bool {
    any_line_contains(lines, "esc to cancel")
}

// e.g. "• Working (11s • esc to interrupt)"
fn codex_is_busy(lines: &[String], _pid: Pid, _tree: &ProcessTree) -> bool {
    any_line_contains(lines, "esc to interrupt")
}

fn opencode_is_busy(lines: &[String], _pid: Pid, _tree: &ProcessTree) -> bool {
    any_line_contains(lines, "esc interrupt")
}

fn any_line_contains(lines: &[String], needle: &str) -> bool {
    lines.iter().rev().any(|line| line.contains(needle))
}

// ============================================================================
// Detector
// ============================================================================

/// Recognition and busy-state evaluation for one agent.
#[derive(Clone)]
pub struct Detector {
    kind: AgentKind,
    command: String,
    is_busy: BusyPredicate,
}

impl Detector {
    pub fn new(kind: AgentKind, command: impl Into<String>, is_busy: BusyPredicate) -> Self {
        Self {
            kind,
            command: command.into(),
            is_busy,
        }
    }

    /// The built-in detector for `kind`.
    pub fn builtin(kind: AgentKind) -> Self {
        Self::new(kind, kind.command(), kind.busy_predicate())
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Reports whether the agent is actively working.
    pub fn is_busy(&self, lines: &[String], pid: Pid, tree: &ProcessTree) -> bool {
        (self.is_busy)(lines, pid, tree)
    }
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("kind", &self.kind)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Detectors keyed by command name.
///
/// Populated once at startup and shared read-only (usually behind an `Arc`)
/// with the collection task.
#[derive(Debug, Clone, Default)]
pub struct DetectorRegistry {
    detectors: HashMap<String, Detector>,
}

impl DetectorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in agent.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in AgentKind::ALL {
            registry.register(Detector::builtin(kind));
        }
        registry
    }

    /// Adds a detector; a later registration for the same command wins.
    pub fn register(&mut self, detector: Detector) {
        self.detectors.insert(detector.command.clone(), detector);
    }

    /// Looks up the detector registered for `command`.
    pub fn get(&self, command: &str) -> Option<&Detector> {
        self.detectors.get(command)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Resolves the agent running in a pane.
    ///
    /// Tries the pane's foreground command first, then the direct children of
    /// the pane's shell: their command basename, then every argument token
    /// (handles agents that run inside an interpreter, like `node .../gemini`).
    pub fn resolve(&self, command: &str, pid: Pid, tree: &ProcessTree) -> Option<&Detector> {
        if let Some(detector) = self.get(command) {
            return Some(detector);
        }

        for &child in tree.children(pid) {
            if let Some(detector) = tree.comm(child).and_then(|comm| self.get(basename(comm))) {
                return Some(detector);
            }

            let args = tree.args(child).unwrap_or_default();
            if let Some(detector) = args.split_whitespace().find_map(|arg| self.get(basename(arg))) {
                return Some(detector);
            }
        }

        None
    }
}

fn basename(s: &str) -> &str {
    s.rsplit('/').next().unwrap_or(s)
}
