//! Pane status classification.
//!
//! Status is recomputed from scratch every poll cycle from the pane's
//! captured output and the process snapshot; nothing carries over between
//! cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::detector::Detector;
use crate::process::{Pid, ProcessTree};

/// Default number of trailing pane lines inspected per classification.
pub const DEFAULT_CAPTURE_LINES: usize = 10;

/// Glyph agents print in front of their own input prompt.
pub const PROMPT_GLYPH: char = '❯';

/// Phrases that mean an agent is blocked on the user.
///
/// Checked in order against the joined capture. Covers tool permission
/// prompts, selection prompts and conversational hand-backs.
pub const ATTENTION_PATTERNS: &[&str] = &[
    // Tool permission prompts
    "Do you want to proceed?",
    "Do you want to allow",
    "Allow once",
    "press Enter to approve",
    // Question / selection prompts
    "Enter to select",
    "Type something",
    "Esc to cancel",
    // Waiting for user response
    "I'll wait for your",
    "waiting for your response",
    "Let me know when",
    "Please let me know",
    "What would you like",
    "How would you like",
    "Should I proceed",
    "Would you like me to",
    "please provide",
    "please specify",
    "I need more information",
    "Could you clarify",
    "awaiting your",
    "ready when you are",
    "let me know if you'd like",
    "Feel free to ask",
    "Is there anything else",
    "What else can I help",
    "Want me to go ahead",
    "Shall I",
    "Do you want me to",
    "Ready to proceed",
];

// ============================================================================
// Pane Status
// ============================================================================

/// Activity state of an agent pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneStatus {
    /// Agent is waiting for a new prompt.
    #[default]
    Idle,
    /// Agent is working; nothing to do but wait.
    Busy,
    /// Agent is blocked on a question or permission prompt.
    NeedsAttention,
}

impl PaneStatus {
    /// Returns the display label for this status.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Busy => "busy",
            Self::NeedsAttention => "needs attention",
        }
    }
}

impl fmt::Display for PaneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Keeps the last `count` lines of a raw capture, ignoring trailing newlines.
pub fn recent_lines(capture: &str, count: usize) -> Vec<String> {
    let trimmed = capture.trim_end_matches('\n');
    if trimmed.is_empty() {
        return Vec::new();
    }
    let lines: Vec<&str> = trimmed.split('\n').collect();
    let start = lines.len().saturating_sub(count);
    lines
        .get(start..)
        .unwrap_or_default()
        .iter()
        .map(|line| line.to_string())
        .collect()
}

/// Returns true if the captured lines show the agent waiting on the user.
///
/// Besides [`ATTENTION_PATTERNS`], a last non-blank line ending in `?` counts
/// unless it is the agent echoing its own input prompt. That heuristic also
/// fires on rhetorical questions in agent output; it is kept as-is.
pub fn needs_attention(lines: &[String]) -> bool {
    let content = lines.join("\n");
    if ATTENTION_PATTERNS.iter().any(|pattern| content.contains(pattern)) {
        return true;
    }

    lines
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.ends_with('?') && !line.starts_with(PROMPT_GLYPH))
}

/// Classifies a pane. Total: every input yields exactly one status.
///
/// Attention wins over busy because agents often still show a spinner in the
/// instant before they block on a question.
pub fn classify(
    lines: &[String],
    detector: Option<&Detector>,
    pid: Pid,
    tree: &ProcessTree,
) -> PaneStatus {
    if needs_attention(lines) {
        return PaneStatus::NeedsAttention;
    }
    if detector.is_some_and(|d| d.is_busy(lines, pid, tree)) {
        return PaneStatus::Busy;
    }
    PaneStatus::Idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::AgentKind;
    use crate::process::ProcessNode;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn claude_working_tree() -> ProcessTree {
        ProcessTree::from_nodes(vec![
            ProcessNode {
                pid: 200,
                ppid: Some(100),
                comm: "claude".to_string(),
                args: "claude".to_string(),
            },
            ProcessNode {
                pid: 300,
                ppid: Some(200),
                comm: "caffeinate".to_string(),
                args: "caffeinate -i".to_string(),
            },
        ])
    }

    #[test]
    fn test_recent_lines_keeps_tail() {
        let capture = (1..=15).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = recent_lines(&capture, 10);
        assert_eq!(tail.len(), 10);
        assert_eq!(tail.first().map(String::as_str), Some("line 6"));
        assert_eq!(tail.last().map(String::as_str), Some("line 15"));
    }

    #[test]
    fn test_recent_lines_trims_trailing_newlines() {
        let tail = recent_lines("a\nb\n\n\n", 10);
        assert_eq!(tail, lines(&["a", "b"]));
    }

    #[test]
    fn test_recent_lines_empty_capture() {
        assert!(recent_lines("", 10).is_empty());
        assert!(recent_lines("\n\n", 10).is_empty());
    }

    #[test]
    fn test_needs_attention_permission_prompt() {
        let captured = lines(&["Bash(rm -rf build)", "Do you want to proceed? (y/n)"]);
        assert!(needs_attention(&captured));
    }

    #[test]
    fn test_needs_attention_trailing_question() {
        let captured = lines(&["I refactored the parser.", "Should the old API stay around?", "   "]);
        assert!(needs_attention(&captured));
    }

    #[test]
    fn test_prompt_echo_is_not_attention() {
        let captured = lines(&["Done.", "❯ why does this fail?"]);
        assert!(!needs_attention(&captured));
    }

    #[test]
    fn test_question_not_on_last_line() {
        let captured = lines(&["What is going on?", "Fixed it, tests pass."]);
        assert!(!needs_attention(&captured));
    }

    #[test]
    fn test_no_lines_is_not_attention() {
        assert!(!needs_attention(&[]));
    }

    #[test]
    fn test_attention_beats_busy() {
        let detector = Detector::builtin(AgentKind::Claude);
        let captured = lines(&["⠋ Thinking", "Do you want to proceed? (y/n)"]);
        let status = classify(&captured, Some(&detector), 100, &claude_working_tree());
        assert_eq!(status, PaneStatus::NeedsAttention);
    }

    #[test]
    fn test_claude_busy_from_process_tree() {
        let detector = Detector::builtin(AgentKind::Claude);
        let captured = lines(&["✻ Refactoring…"]);
        let status = classify(&captured, Some(&detector), 100, &claude_working_tree());
        assert_eq!(status, PaneStatus::Busy);
    }

    #[test]
    fn test_idle_without_signals() {
        let detector = Detector::builtin(AgentKind::Codex);
        let captured = lines(&["All done.", "› "]);
        let status = classify(&captured, Some(&detector), 100, &ProcessTree::default());
        assert_eq!(status, PaneStatus::Idle);
    }

    #[test]
    fn test_idle_without_detector() {
        let captured = lines(&["esc to interrupt"]);
        assert_eq!(classify(&captured, None, 1, &ProcessTree::default()), PaneStatus::Idle);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(PaneStatus::Idle.label(), "idle");
        assert_eq!(PaneStatus::Busy.to_string(), "busy");
        assert_eq!(PaneStatus::NeedsAttention.label(), "needs attention");
        assert_eq!(PaneStatus::default(), PaneStatus::Idle);
    }
}
