//! Keyboard input handling for the amux TUI.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

// ============================================================================
// Action Types
// ============================================================================

/// Actions that can result from user input.
///
/// These actions are returned by the input handler to signal what
/// the update loop should do in response to user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action required.
    None,

    /// Quit the application.
    Quit,

    /// Run a classification cycle now.
    Refresh,

    /// The cursor landed on a different pane.
    CursorMoved,

    /// Switch the tmux client to this pane.
    Switch(String),

    /// Close this pane.
    Kill(String),
}

// ============================================================================
// Input Handler
// ============================================================================

/// Handles a keyboard event and updates application state accordingly.
///
/// # Key Bindings
///
/// | Key                 | Action                         |
/// |---------------------|--------------------------------|
/// | `q`, `Esc`, `Ctrl+C`| Quit the application           |
/// | `j`, `Down`         | Select the next pane           |
/// | `k`, `Up`           | Select the previous pane       |
/// | `g`                 | Select the first pane          |
/// | `G`                 | Select the last pane           |
/// | `Enter`             | Switch to the selected pane    |
/// | `d` `d`             | Kill the selected pane         |
/// | `r`                 | Refresh now                    |
///
/// Any key other than `d` cancels a pending `d`.
#[must_use]
pub fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    // Only react to presses (Windows also reports releases)
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }

    // Handle Ctrl+C specially as an unconditional quit
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Action::Quit;
    }

    let pending_kill = std::mem::take(&mut app.pending_kill);

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            Action::Quit
        }

        KeyCode::Char('j') | KeyCode::Down => moved(app.select_next()),
        KeyCode::Char('k') | KeyCode::Up => moved(app.select_previous()),
        KeyCode::Char('g') => moved(app.select_first()),
        KeyCode::Char('G') => moved(app.select_last()),

        KeyCode::Enter => match app.selected_target() {
            Some(target) => Action::Switch(target),
            None => Action::None,
        },

        KeyCode::Char('d') if pending_kill => match app.selected_target() {
            Some(target) => Action::Kill(target),
            None => Action::None,
        },
        KeyCode::Char('d') => {
            app.pending_kill = true;
            Action::None
        }

        KeyCode::Char('r') => Action::Refresh,

        // Unhandled keys
        _ => Action::None,
    }
}

fn moved(changed: bool) -> Action {
    if changed {
        Action::CursorMoved
    } else {
        Action::None
    }
}

// ============================================================================
// Tests
// ============================================================================
