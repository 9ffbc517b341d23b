//! Parsing of `tmux list-panes` output.

use amux_core::{ParseError, ParseResult, Pid};
use tracing::trace;

/// Format string passed to `list-panes -F`, one tab-separated row per pane.
pub const LIST_PANES_FORMAT: &str =
    "#{session_name}:#{window_index}.#{pane_index}\t#{pane_current_command}\t#{pane_current_path}\t#{pane_pid}";

const FIELDS: usize = 4;

/// One pane as reported by tmux, before agent resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRow {
    /// `session:window.pane`
    pub target: String,
    /// Foreground command (`pane_current_command`)
    pub command: String,
    /// Working directory
    pub path: String,
    /// Pid of the process owning the pane; 0 when tmux reported garbage
    pub pid: Pid,
}

impl PaneRow {
    /// Parses one `target \t command \t cwd \t pid` row.
    pub fn parse(line: &str) -> ParseResult<Self> {
        let parts: Vec<&str> = line.splitn(FIELDS, '\t').collect();
        let [target, command, path, pid] = parts.as_slice() else {
            return Err(ParseError::FieldCount {
                expected: FIELDS,
                found: parts.len(),
            });
        };

        Ok(Self {
            target: target.to_string(),
            command: command.to_string(),
            path: path.to_string(),
            pid: pid.trim().parse().unwrap_or(0),
        })
    }
}

/// Parses full `list-panes` output, skipping blank and short rows.
pub fn parse_pane_rows(output: &str) -> Vec<PaneRow> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match PaneRow::parse(line) {
            Ok(row) => Some(row),
            Err(e) => {
                trace!(line, error = %e, "Skipping pane row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        let row = PaneRow::parse("main:2.1\tclaude\t/home/u/proj\t4242").unwrap();
        assert_eq!(row.target, "main:2.1");
        assert_eq!(row.command, "claude");
        assert_eq!(row.path, "/home/u/proj");
        assert_eq!(row.pid, 4242);
    }

    #[test]
    fn test_parse_row_bad_pid_becomes_zero() {
        let row = PaneRow::parse("main:0.0\tzsh\t/tmp\tnope").unwrap();
        assert_eq!(row.pid, 0);
    }

    #[test]
    fn test_parse_row_too_few_fields() {
        let err = PaneRow::parse("main:0.0\tzsh\t/tmp").unwrap_err();
        assert_eq!(err, ParseError::FieldCount { expected: 4, found: 3 });
    }

    #[test]
    fn test_parse_rows_tolerant() {
        let output = "a:0.0\tclaude\t/w/a\t10\n\nbroken row\nb:1.2\tnode\t/w/b\t20\n";
        let rows = parse_pane_rows(output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].target, "a:0.0");
        assert_eq!(rows[1].pid, 20);
    }

    #[test]
    fn test_parse_rows_empty_output() {
        assert!(parse_pane_rows("").is_empty());
        assert!(parse_pane_rows("\n").is_empty());
    }
}
