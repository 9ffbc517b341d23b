//! Flattened, cursor-addressable view over workspaces.
//!
//! The workspace tree is flattened into rows: one non-selectable header per
//! workspace followed by its pane rows. Every cursor operation here returns
//! an index of a pane row, or `0` when there are no pane rows at all. None
//! of them wrap around.

use crate::status::PaneStatus;
use crate::workspace::Workspace;

/// Kind of a flattened row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    /// Workspace header, never selectable
    Header,
    /// A pane
    Pane,
}

/// One flattened row.
///
/// `workspace` and `pane` index into the workspaces the row was built from
/// and are meaningless against any other cycle's workspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub kind: NavKind,
    pub workspace: usize,
    /// Pane index within the workspace; `0` for headers
    pub pane: usize,
}

impl NavItem {
    pub fn is_selectable(&self) -> bool {
        self.kind == NavKind::Pane
    }
}

/// Flattens workspaces into header and pane rows.
pub fn flatten(workspaces: &[Workspace]) -> Vec<NavItem> {
    let rows: usize = workspaces.iter().map(|ws| ws.panes.len() + 1).sum();
    let mut items = Vec::with_capacity(rows);

    for (wi, workspace) in workspaces.iter().enumerate() {
        items.push(NavItem {
            kind: NavKind::Header,
            workspace: wi,
            pane: 0,
        });
        items.extend((0..workspace.panes.len()).map(|pi| NavItem {
            kind: NavKind::Pane,
            workspace: wi,
            pane: pi,
        }));
    }

    items
}

fn is_pane(items: &[NavItem], index: usize) -> bool {
    items.get(index).is_some_and(NavItem::is_selectable)
}

/// Next pane row after `from`, or `from` when there is none.
pub fn next_selectable(items: &[NavItem], from: usize) -> usize {
    (from.saturating_add(1)..items.len())
        .find(|&i| is_pane(items, i))
        .unwrap_or(from)
}

/// Previous pane row before `from`, or `from` when there is none.
pub fn prev_selectable(items: &[NavItem], from: usize) -> usize {
    (0..from.min(items.len()))
        .rev()
        .find(|&i| is_pane(items, i))
        .unwrap_or(from)
}

/// Pane row closest to `from`, preferring earlier rows.
///
/// `from` is clamped into range first; a pane row maps to itself, otherwise
/// the previous pane row wins over the next one.
pub fn nearest_selectable(items: &[NavItem], from: usize) -> usize {
    if items.is_empty() {
        return 0;
    }

    let from = from.min(items.len() - 1);
    if is_pane(items, from) {
        return from;
    }

    let prev = prev_selectable(items, from);
    if prev != from {
        return prev;
    }
    let next = next_selectable(items, from);
    if next != from {
        return next;
    }
    0
}

/// First pane row.
pub fn first_selectable(items: &[NavItem]) -> usize {
    items.iter().position(NavItem::is_selectable).unwrap_or(0)
}

/// Last pane row.
pub fn last_selectable(items: &[NavItem]) -> usize {
    items.iter().rposition(NavItem::is_selectable).unwrap_or(0)
}

/// First pane row whose pane needs attention, else the first pane row.
pub fn first_needing_attention(items: &[NavItem], workspaces: &[Workspace]) -> usize {
    items
        .iter()
        .position(|item| {
            item.is_selectable()
                && workspaces
                    .get(item.workspace)
                    .and_then(|ws| ws.panes.get(item.pane))
                    .is_some_and(|pane| pane.status == PaneStatus::NeedsAttention)
        })
        .unwrap_or_else(|| first_selectable(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::AgentKind;
    use crate::pane::Pane;

    fn workspace(path: &str, statuses: &[PaneStatus]) -> Workspace {
        Workspace {
            path: path.to_string(),
            short_path: path.to_string(),
            branch: None,
            panes: statuses
                .iter()
                .enumerate()
                .map(|(i, &status)| {
                    Pane::new(format!("s:{i}.0"), path, 1, AgentKind::Claude).with_status(status)
                })
                .collect(),
        }
    }

    // Rows: 0 H, 1 P, 2 P, 3 H, 4 P
    fn sample() -> Vec<Workspace> {
        vec![
            workspace("/a", &[PaneStatus::Idle, PaneStatus::Busy]),
            workspace("/b", &[PaneStatus::NeedsAttention]),
        ]
    }

    #[test]
    fn test_flatten_layout() {
        let items = flatten(&sample());
        let kinds: Vec<_> = items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            [NavKind::Header, NavKind::Pane, NavKind::Pane, NavKind::Header, NavKind::Pane]
        );
        assert_eq!(items[2], NavItem { kind: NavKind::Pane, workspace: 0, pane: 1 });
        assert_eq!(items[4], NavItem { kind: NavKind::Pane, workspace: 1, pane: 0 });
    }

    #[test]
    fn test_next_skips_headers() {
        let items = flatten(&sample());
        assert_eq!(next_selectable(&items, 1), 2);
        assert_eq!(next_selectable(&items, 2), 4);
        assert_eq!(next_selectable(&items, 0), 1);
    }

    #[test]
    fn test_next_prev_idempotent_at_boundaries() {
        let items = flatten(&sample());
        assert_eq!(next_selectable(&items, 4), 4);
        assert_eq!(prev_selectable(&items, 1), 1);
    }

    #[test]
    fn test_prev_skips_headers() {
        let items = flatten(&sample());
        assert_eq!(prev_selectable(&items, 4), 2);
        assert_eq!(prev_selectable(&items, 2), 1);
    }

    #[test]
    fn test_prev_from_out_of_range() {
        let items = flatten(&sample());
        assert_eq!(prev_selectable(&items, 10), 4);
    }

    #[test]
    fn test_nearest_identity_on_pane_rows() {
        let items = flatten(&sample());
        for i in [1, 2, 4] {
            assert_eq!(nearest_selectable(&items, i), i);
        }
    }

    #[test]
    fn test_nearest_prefers_previous() {
        let items = flatten(&sample());
        assert_eq!(nearest_selectable(&items, 3), 2);
    }

    #[test]
    fn test_nearest_falls_forward_from_first_header() {
        let items = flatten(&sample());
        assert_eq!(nearest_selectable(&items, 0), 1);
    }

    #[test]
    fn test_nearest_clamps() {
        let items = flatten(&sample());
        assert_eq!(nearest_selectable(&items, 99), 4);

        let shrunk = flatten(&[workspace("/a", &[PaneStatus::Idle])]);
        assert_eq!(nearest_selectable(&shrunk, 4), 1);
    }

    #[test]
    fn test_empty_items() {
        let items: Vec<NavItem> = Vec::new();
        assert_eq!(nearest_selectable(&items, 3), 0);
        assert_eq!(first_selectable(&items), 0);
        assert_eq!(last_selectable(&items), 0);
        assert_eq!(first_needing_attention(&items, &[]), 0);
        assert_eq!(next_selectable(&items, 0), 0);
        assert_eq!(prev_selectable(&items, 0), 0);
    }

    #[test]
    fn test_headers_only() {
        let workspaces = vec![workspace("/a", &[]), workspace("/b", &[])];
        let items = flatten(&workspaces);
        assert_eq!(items.len(), 2);
        assert_eq!(nearest_selectable(&items, 1), 0);
        assert_eq!(first_selectable(&items), 0);
    }

    #[test]
    fn test_first_and_last() {
        let items = flatten(&sample());
        assert_eq!(first_selectable(&items), 1);
        assert_eq!(last_selectable(&items), 4);
    }

    #[test]
    fn test_first_needing_attention() {
        let workspaces = sample();
        let items = flatten(&workspaces);
        assert_eq!(first_needing_attention(&items, &workspaces), 4);
    }

    #[test]
    fn test_first_needing_attention_falls_back_to_first_pane() {
        let workspaces = vec![workspace("/a", &[PaneStatus::Busy, PaneStatus::Idle])];
        let items = flatten(&workspaces);
        assert_eq!(first_needing_attention(&items, &workspaces), 1);
    }
}
