//! Workspace tree widget for the amux TUI.
//!
//! One header row per workspace (short path and branch) followed by its
//! pane rows (status icon, agent, pane address, time since last activity).

use amux_core::navigation::NavKind;
use amux_core::{Pane, Workspace};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{status_background, status_color, status_icon, SELECTED_BACKGROUND};

/// Renders the workspace tree in the left panel.
///
/// The selected row is kept in view; when no agent panes exist an empty
/// state is shown instead.
pub fn render_tree_list(frame: &mut Frame, area: Rect, app: &App) {
    if app.items.is_empty() {
        render_empty_state(frame, area);
        return;
    }

    let now = Utc::now();
    let width = usize::from(area.width.saturating_sub(2));

    let rows: Vec<ListItem> = app
        .items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let workspace = app.workspaces.get(item.workspace)?;
            Some(match item.kind {
                NavKind::Header => header_item(workspace, width),
                NavKind::Pane => {
                    let pane = workspace.panes.get(item.pane)?;
                    pane_item(pane, idx == app.cursor, app.blink_visible, now, width)
                }
            })
        })
        .collect();

    let title = format!(" Agents ({}) ", app.pane_count());
    let list = List::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::White)),
    );

    let mut state = ListState::default().with_selected(Some(app.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn header_item(workspace: &Workspace, width: usize) -> ListItem<'static> {
    let mut spans = vec![Span::styled(
        truncate_string(&workspace.short_path, width),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(branch) = &workspace.branch {
        let remaining = width.saturating_sub(workspace.short_path.chars().count() + 1);
        if remaining > 3 {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                truncate_string(branch, remaining),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    ListItem::new(Line::from(spans))
}

/// Creates a list item for a single pane.
///
/// Format: `> [icon] [agent] [window.pane] [elapsed]`
fn pane_item(
    pane: &Pane,
    is_selected: bool,
    blink_visible: bool,
    now: DateTime<Utc>,
    width: usize,
) -> ListItem<'static> {
    let elapsed = pane
        .last_active
        .map(|at| format_elapsed(now.signed_duration_since(at)))
        .unwrap_or_default();

    let label = format!("{} {}", pane.agent.command(), pane.short_label());
    // "> " + icon + " " + label + " " + elapsed
    let label_width = width.saturating_sub(4 + elapsed.chars().count() + 1);

    let spans = vec![
        Span::styled(
            if is_selected { ">" } else { " " },
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", status_icon(pane.status, blink_visible)),
            Style::default()
                .fg(status_color(pane.status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<label_width$}", truncate_string(&label, label_width)),
            Style::default().fg(Color::White),
        ),
        Span::raw(" "),
        Span::styled(elapsed, Style::default().fg(Color::DarkGray)),
    ];

    let bg = status_background(pane.status).or(is_selected.then_some(SELECTED_BACKGROUND));
    let style = match bg {
        Some(color) => Style::default().bg(color),
        None => Style::default(),
    };

    ListItem::new(Line::from(spans)).style(style)
}

/// Formats time since last activity: `42s`, `5m`, `2h`, `2h5m`, `3d`.
///
/// Negative durations (clock skew) render as `0s`.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => {
            let (hours, minutes) = (s / 3600, (s % 3600) / 60);
            if minutes == 0 {
                format!("{hours}h")
            } else {
                format!("{hours}h{minutes}m")
            }
        }
        s => format!("{}d", s / 86_400),
    }
}

/// Truncates a string to the specified maximum display width.
///
/// If truncated, appends "..." to indicate truncation.
/// Handles UTF-8 multi-byte characters safely by counting chars, not bytes.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Renders the empty state; wraps rather than clipping in narrow areas.
pub fn render_empty_state(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No active sessions found",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Agents ")
                .border_style(Style::default().fg(Color::White)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
