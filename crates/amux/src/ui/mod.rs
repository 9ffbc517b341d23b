//! UI rendering module for the amux TUI.
//!
//! # Layout Structure
//!
//! ```text
//! +--------------------------------------------------+
//! |  Header: title, status counts / error banner     |  <- 3 lines
//! +---------------+----------------------------------+
//! | Tree list     |  Preview                         |  <- fills remaining
//! | (25%, min 20) |                                  |
//! |  amux main    |  ...                             |
//! |  > ! claude   |  Do you want to proceed?         |
//! |    > codex    |                                  |
//! +---------------+----------------------------------+
//! |  Footer: key hints / action message              |  <- 3 lines
//! +--------------------------------------------------+
//! ```

pub mod layout;
pub mod preview;
pub mod status_bar;
pub mod theme;
pub mod tree_list;

use crate::app::App;
use layout::AppLayout;
use ratatui::Frame;

pub use preview::render_preview;
pub use status_bar::{render_footer, render_header};
pub use tree_list::render_tree_list;

/// Renders the complete TUI interface.
///
/// # Example
///
/// ```ignore
/// terminal.draw(|frame| {
///     ui::render(frame, &app);
/// })?;
/// ```
pub fn render(frame: &mut Frame, app: &App) {
    let layout = AppLayout::new(frame.area());

    render_header(frame, layout.header, app);
    render_footer(frame, layout.footer, app);
    if app.items.is_empty() {
        // Nothing to preview; the message gets the whole content row
        tree_list::render_empty_state(frame, layout.list_area.union(layout.preview_area));
    } else {
        render_tree_list(frame, layout.list_area, app);
        render_preview(frame, layout.preview_area, app);
    }
}
