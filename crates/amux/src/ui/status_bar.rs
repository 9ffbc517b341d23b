//! Header and footer status bar widgets for the amux TUI.
//!
//! - Header: application title, per-status pane counts, error banner
//! - Footer: keybinding hints, or a transient action message

use amux_core::PaneStatus;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme::status_color;

/// Renders the header bar with title, counts and any error banner.
pub fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(
            "amux",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - agent panes"),
    ];

    match &app.error {
        Some(error) => {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        None => spans.extend(count_spans(app)),
    }

    let border_style = if app.error.is_some() {
        Style::default().fg(Color::Red)
    } else if app.count(PaneStatus::NeedsAttention) > 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(header, area);
}

/// Summary counts, e.g. ` | 3 panes | 1 need input | 1 busy | 1 idle`.
fn count_spans(app: &App) -> Vec<Span<'static>> {
    let total = app.pane_count();
    let mut spans = vec![Span::styled(
        format!(" | {} pane{}", total, if total == 1 { "" } else { "s" }),
        Style::default().fg(Color::DarkGray),
    )];

    if !app.status_loaded {
        return spans;
    }

    for (status, label) in [
        (PaneStatus::NeedsAttention, "need input"),
        (PaneStatus::Busy, "busy"),
        (PaneStatus::Idle, "idle"),
    ] {
        let count = app.count(status);
        if count > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(
                format!("{count} {label}"),
                Style::default().fg(status_color(status)),
            ));
        }
    }
    spans
}

/// Renders the footer with key hints, replaced by a message when one is set.
pub fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let footer_line = match &app.message {
        Some(message) => {
            let color = if message.is_error { Color::Red } else { Color::Green };
            Line::from(Span::styled(
                format!(" {}", message.text),
                Style::default().fg(color),
            ))
        }
        None => hints_line(app.pending_kill),
    };

    let footer = Paragraph::new(footer_line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn hints_line(pending_kill: bool) -> Line<'static> {
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let sep_style = Style::default().fg(Color::DarkGray);

    if pending_kill {
        return Line::from(vec![
            Span::styled(" d", key_style),
            Span::raw(" again to kill the selected pane, any other key to cancel"),
        ]);
    }

    let mut hints = Vec::new();
    for (i, (key, label)) in [
        ("j/k", "move"),
        ("g/G", "first/last"),
        ("Enter", "switch"),
        ("dd", "kill"),
        ("r", "refresh"),
        ("q", "quit"),
    ]
    .into_iter()
    .enumerate()
    {
        if i > 0 {
            hints.push(Span::styled("  |  ", sep_style));
        } else {
            hints.push(Span::raw(" "));
        }
        hints.push(Span::styled(key, key_style));
        hints.push(Span::raw(format!(" {label}")));
    }
    Line::from(hints)
}
