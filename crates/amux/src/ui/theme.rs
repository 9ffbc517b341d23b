//! Shared theme utilities for the amux TUI.
//!
//! Provides consistent styling across all UI components.

use amux_core::PaneStatus;
use ratatui::style::Color;

/// Returns the color for a pane status.
///
/// - Yellow: NeedsAttention (blocked, requires the user)
/// - Blue: Busy (working, nothing to do)
/// - LightMagenta: Idle (waiting for a new prompt)
pub fn status_color(status: PaneStatus) -> Color {
    match status {
        PaneStatus::NeedsAttention => Color::Yellow,
        PaneStatus::Busy => Color::Blue,
        PaneStatus::Idle => Color::LightMagenta,
    }
}

/// Returns the icon for a pane status, respecting blink visibility.
///
/// Only NeedsAttention blinks; it renders as a blank when blink is off.
pub fn status_icon(status: PaneStatus, blink_visible: bool) -> &'static str {
    match status {
        PaneStatus::NeedsAttention if !blink_visible => " ",
        PaneStatus::NeedsAttention => "!",
        PaneStatus::Busy => ">",
        PaneStatus::Idle => "-",
    }
}

/// Row background for a pane status.
///
/// Only NeedsAttention gets a tint.
pub fn status_background(status: PaneStatus) -> Option<Color> {
    match status {
        PaneStatus::NeedsAttention => Some(Color::Rgb(50, 40, 0)), // Subtle amber tint
        PaneStatus::Busy | PaneStatus::Idle => None,
    }
}

/// Background of the selected row.
pub const SELECTED_BACKGROUND: Color = Color::Rgb(30, 30, 40);
