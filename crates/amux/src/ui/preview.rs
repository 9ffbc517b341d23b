//! Preview panel: the selected pane's recent output, pinned to the bottom.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Renders the preview of the selected pane.
pub fn render_preview(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.selected_pane() {
        Some(pane) => format!(" {} ({}) ", pane.target, pane.status),
        None => " Preview ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::White));

    let showing = app.preview.target.is_some() && app.preview.target == app.selected_target();
    if !showing {
        let placeholder = if app.selected_pane().is_some() {
            "Loading..."
        } else {
            ""
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = app
        .preview
        .content
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();

    let visible = area.height.saturating_sub(2);
    let offset = bottom_offset(lines.len(), visible);

    let paragraph = Paragraph::new(lines).block(block).scroll((offset, 0));
    frame.render_widget(paragraph, area);
}

/// Vertical scroll that shows the last `visible` of `total` lines.
pub fn bottom_offset(total: usize, visible: u16) -> u16 {
    let hidden = total.saturating_sub(usize::from(visible));
    u16::try_from(hidden).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_offset() {
        assert_eq!(bottom_offset(50, 20), 30);
        assert_eq!(bottom_offset(10, 20), 0);
        assert_eq!(bottom_offset(0, 0), 0);
    }
}
