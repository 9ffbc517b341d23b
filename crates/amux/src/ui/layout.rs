//! Layout helpers for the amux TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Minimum width of the tree list, in columns.
pub const MIN_LIST_WIDTH: u16 = 20;

/// Main application layout areas.
///
/// The TUI is divided into three vertical sections:
/// - Header (3 lines): title, status counts, error banner
/// - Content (fills remaining): tree list and preview side by side
/// - Footer (3 lines): key hints and transient messages
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    /// Left panel: workspaces and panes
    pub list_area: Rect,
    /// Right panel: preview of the selected pane
    pub preview_area: Rect,
    pub footer: Rect,
}

impl AppLayout {
    /// Creates a new AppLayout by splitting the given area.
    ///
    /// The list takes a quarter of the width but never less than
    /// [`MIN_LIST_WIDTH`] columns (or the whole width, if narrower).
    pub fn new(area: Rect) -> Self {
        let [header, content, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(3),    // Content
                Constraint::Length(3), // Footer
            ])
            .areas(area);

        let list_width = list_width(content.width);
        let [list_area, preview_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(list_width), Constraint::Min(0)])
            .areas(content);

        Self {
            header,
            list_area,
            preview_area,
            footer,
        }
    }
}

/// Width of the tree list for a content area `total` columns wide.
pub fn list_width(total: u16) -> u16 {
    (total / 4).max(MIN_LIST_WIDTH).min(total)
}
