//! Application state and the update loop.
//!
//! `App` owns all display state. It never performs I/O itself: every
//! [`Event`] is folded into state by [`App::update`], which returns the
//! [`Command`]s the runtime should execute. Commands that do work post
//! their outcome back as another `Event`.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

use std::time::Duration;

use amux_core::navigation::{self, NavItem};
use amux_core::{Pane, PaneStatus, Workspace};
use amux_tmux::KillScope;
use crossterm::event::KeyEvent;
use tracing::{debug, info, warn};

use crate::collector::StatusMode;
use crate::error::{ActionError, CollectionError};
use crate::input::{handle_key_event, Action};
use crate::poll::{Cadence, Schedule, Timer};

/// Ticks a footer message stays visible (3s at the 100ms tick rate).
const MESSAGE_TICKS: u32 = 30;

// ============================================================================
// Events and Commands
// ============================================================================

/// Inputs to the update loop.
#[derive(Debug)]
pub enum Event {
    /// Keyboard input from the user.
    Key(KeyEvent),

    /// Terminal window resize event.
    Resize(u16, u16),

    /// The pane cadence timer armed for this generation fired.
    PanesTick(u64),

    /// The preview cadence timer armed for this generation fired.
    PreviewTick(u64),

    /// A collection cycle finished.
    PanesLoaded {
        mode: StatusMode,
        result: Result<Vec<Workspace>, CollectionError>,
    },

    /// A preview capture finished.
    PreviewLoaded {
        target: String,
        result: Result<String, CollectionError>,
    },

    /// A switch or kill request finished.
    ActionDone(Result<ActionOutcome, ActionError>),
}

/// Successful pane actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Switched { target: String },
    Killed { target: String, scope: KillScope },
}

/// Work requested by the update loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a collection cycle.
    Collect(StatusMode),
    /// Capture the preview for a pane.
    CapturePreview(String),
    /// Post `PanesTick(generation)` after `delay`.
    ArmPanes { generation: u64, delay: Duration },
    /// Post `PreviewTick(generation)` after `delay`.
    ArmPreview { generation: u64, delay: Duration },
    /// Switch the tmux client to a pane.
    Switch(String),
    /// Close a pane.
    Kill(String),
    /// Stop everything.
    Quit,
}

// ============================================================================
// Application
// ============================================================================

/// Behaviour settings for [`App`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub panes_interval: Duration,
    pub preview_interval: Duration,
    pub quit_on_switch: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            panes_interval: Duration::from_millis(2000),
            preview_interval: Duration::from_millis(200),
            quit_on_switch: true,
        }
    }
}

/// Preview of the selected pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    /// Pane the content belongs to
    pub target: Option<String>,
    pub content: String,
}

/// Transient footer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub is_error: bool,
    expires_at: u32,
}

/// Core application state for the amux TUI.
#[derive(Debug, Clone)]
pub struct App {
    /// Workspaces from the most recent successful cycle.
    pub workspaces: Vec<Workspace>,

    /// Flattened rows of `workspaces`.
    pub items: Vec<NavItem>,

    /// Index into `items`; always a pane row when any exist.
    pub cursor: usize,

    /// Error banner from the last failed cycle, cleared on success.
    pub error: Option<String>,

    /// Transient footer message.
    pub message: Option<Message>,

    pub preview: Preview,

    /// Flag indicating the application should quit.
    pub should_quit: bool,

    /// Whether blinking status icons are currently visible.
    /// Toggles every 500ms (5 ticks at 100ms tick rate).
    pub blink_visible: bool,

    /// A first `d` was pressed; a second one kills the selected pane.
    pub pending_kill: bool,

    /// Whether a full classification has succeeded yet.
    pub status_loaded: bool,

    /// Internal tick counter for blink and message timing.
    tick_count: u32,

    panes: Cadence,
    preview_cadence: Cadence,
    quit_on_switch: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppOptions::default())
    }
}

impl App {
    pub fn new(options: AppOptions) -> Self {
        Self {
            workspaces: Vec::new(),
            items: Vec::new(),
            cursor: 0,
            error: None,
            message: None,
            preview: Preview::default(),
            should_quit: false,
            blink_visible: true,
            pending_kill: false,
            status_loaded: false,
            tick_count: 0,
            panes: Cadence::new(options.panes_interval),
            preview_cadence: Cadence::new(options.preview_interval),
            quit_on_switch: options.quit_on_switch,
        }
    }

    /// Commands to run at startup: a basic listing and the preview timer.
    pub fn start(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.panes.request() {
            commands.push(Command::Collect(StatusMode::Basic));
        }
        commands.push(arm_preview(self.preview_cadence.arm()));
        commands
    }

    /// Folds one event into state.
    pub fn update(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Key(key) => {
                let action = handle_key_event(key, self);
                self.apply_action(action)
            }
            Event::Resize(width, height) => {
                debug!(width, height, "Terminal resized");
                Vec::new()
            }
            Event::PanesTick(generation) => {
                if self.panes.on_tick(generation) {
                    vec![Command::Collect(StatusMode::Full)]
                } else {
                    debug!(generation, "Dropping stale panes tick");
                    Vec::new()
                }
            }
            Event::PreviewTick(generation) => {
                if self.preview_cadence.on_tick(generation) {
                    vec![self.preview_work()]
                } else {
                    Vec::new()
                }
            }
            Event::PanesLoaded { mode, result } => self.on_panes_loaded(mode, result),
            Event::PreviewLoaded { target, result } => self.on_preview_loaded(target, result),
            Event::ActionDone(result) => self.on_action_done(result),
        }
    }

    fn apply_action(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::None => Vec::new(),
            Action::Quit => {
                info!("User requested quit");
                self.quit();
                vec![Command::Quit]
            }
            Action::Refresh => {
                debug!("User requested refresh");
                self.request_refresh()
            }
            Action::CursorMoved => self.request_preview(),
            Action::Switch(target) => vec![Command::Switch(target)],
            Action::Kill(target) => vec![Command::Kill(target)],
        }
    }

    // ------------------------------------------------------------------------
    // Pane cadence
    // ------------------------------------------------------------------------

    fn request_refresh(&mut self) -> Vec<Command> {
        if self.panes.request() {
            vec![Command::Collect(StatusMode::Full)]
        } else {
            Vec::new()
        }
    }

    fn on_panes_loaded(
        &mut self,
        mode: StatusMode,
        result: Result<Vec<Workspace>, CollectionError>,
    ) -> Vec<Command> {
        let schedule = self.panes.complete();
        let previous_target = self.selected_target();

        match result {
            Ok(workspaces) => {
                self.error = None;
                self.items = navigation::flatten(&workspaces);
                self.cursor = match mode {
                    StatusMode::Full if !self.status_loaded => {
                        navigation::first_needing_attention(&self.items, &workspaces)
                    }
                    StatusMode::Basic if !self.status_loaded => {
                        navigation::first_selectable(&self.items)
                    }
                    _ => navigation::nearest_selectable(&self.items, self.cursor),
                };
                self.workspaces = workspaces;
                if mode == StatusMode::Full {
                    self.status_loaded = true;
                }
                debug!(?mode, rows = self.items.len(), cursor = self.cursor, "Panes applied");
            }
            Err(e) => {
                warn!(?mode, error = %e, "Collection cycle failed");
                self.error = Some(e.to_string());
            }
        }

        let mut commands = Vec::new();
        match schedule {
            Schedule::RunNow => commands.push(Command::Collect(StatusMode::Full)),
            // The basic listing is followed straight away by a full one
            Schedule::Arm(timer) => {
                let full_now = mode == StatusMode::Basic && self.panes.request();
                commands.push(if full_now {
                    Command::Collect(StatusMode::Full)
                } else {
                    arm_panes(timer)
                });
            }
        }

        if self.selected_target() != previous_target {
            commands.extend(self.request_preview());
        }
        commands
    }

    // ------------------------------------------------------------------------
    // Preview cadence
    // ------------------------------------------------------------------------

    fn request_preview(&mut self) -> Vec<Command> {
        if self.preview.target != self.selected_target() {
            self.preview = Preview::default();
        }
        if self.preview_cadence.request() {
            vec![self.preview_work()]
        } else {
            Vec::new()
        }
    }

    /// Work for a started preview cycle. With nothing selected the cycle
    /// completes on the spot.
    fn preview_work(&mut self) -> Command {
        match self.selected_target() {
            Some(target) => Command::CapturePreview(target),
            None => {
                // A pending rerun has nothing to capture either
                arm_preview(self.preview_cadence.abandon())
            }
        }
    }

    fn on_preview_loaded(
        &mut self,
        target: String,
        result: Result<String, CollectionError>,
    ) -> Vec<Command> {
        match result {
            Ok(content) if self.selected_target().as_deref() == Some(target.as_str()) => {
                // Unchanged content is not re-applied
                if self.preview.target.as_deref() != Some(target.as_str())
                    || self.preview.content != content
                {
                    self.preview = Preview {
                        target: Some(target),
                        content,
                    };
                }
            }
            Ok(_) => debug!(pane = %target, "Dropping preview for deselected pane"),
            Err(e) => debug!(pane = %target, error = %e, "Preview capture failed"),
        }

        match self.preview_cadence.complete() {
            Schedule::Arm(timer) => vec![arm_preview(timer)],
            Schedule::RunNow => vec![self.preview_work()],
        }
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    fn on_action_done(&mut self, result: Result<ActionOutcome, ActionError>) -> Vec<Command> {
        match result {
            Ok(ActionOutcome::Switched { target }) => {
                info!(pane = %target, "Switched to pane");
                if self.quit_on_switch {
                    self.quit();
                    return vec![Command::Quit];
                }
                self.set_message(format!("Switched to {target}"), false);
                Vec::new()
            }
            Ok(ActionOutcome::Killed { target, scope }) => {
                let text = match scope {
                    KillScope::Pane => format!("Killed pane {target}"),
                    KillScope::Window => format!("Killed window of {target}"),
                };
                self.set_message(text, false);
                self.request_refresh()
            }
            Err(e) => {
                warn!(error = %e, "Pane action failed");
                self.set_message(e.to_string(), true);
                Vec::new()
            }
        }
    }

    fn set_message(&mut self, text: String, is_error: bool) {
        self.message = Some(Message {
            text,
            is_error,
            expires_at: self.tick_count.wrapping_add(MESSAGE_TICKS),
        });
    }

    // ------------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------------

    /// Moves the cursor; returns true if it changed.
    pub fn move_to(&mut self, index: usize) -> bool {
        let changed = index != self.cursor;
        self.cursor = index;
        changed
    }

    pub fn select_next(&mut self) -> bool {
        self.move_to(navigation::next_selectable(&self.items, self.cursor))
    }

    pub fn select_previous(&mut self) -> bool {
        self.move_to(navigation::prev_selectable(&self.items, self.cursor))
    }

    pub fn select_first(&mut self) -> bool {
        self.move_to(navigation::first_selectable(&self.items))
    }

    pub fn select_last(&mut self) -> bool {
        self.move_to(navigation::last_selectable(&self.items))
    }

    /// The pane under the cursor, if the cursor is on a pane row.
    pub fn selected_pane(&self) -> Option<&Pane> {
        let item = self.items.get(self.cursor).filter(|item| item.is_selectable())?;
        self.workspaces
            .get(item.workspace)
            .and_then(|ws| ws.panes.get(item.pane))
    }

    pub fn selected_target(&self) -> Option<String> {
        self.selected_pane().map(|pane| pane.target.clone())
    }

    // ------------------------------------------------------------------------
    // Housekeeping
    // ------------------------------------------------------------------------

    /// Advances the blink animation by one tick and expires messages.
    ///
    /// Should be called every 100ms (on each event loop tick).
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if self.tick_count % 5 == 0 {
            self.blink_visible = !self.blink_visible;
        }
        if self
            .message
            .as_ref()
            .is_some_and(|m| m.expires_at == self.tick_count)
        {
            self.message = None;
        }
    }

    /// Sets the quit flag to true, signaling the application should exit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Total number of panes across all workspaces.
    pub fn pane_count(&self) -> usize {
        self.workspaces.iter().map(|ws| ws.panes.len()).sum()
    }

    /// Number of panes with the given status.
    pub fn count(&self, status: PaneStatus) -> usize {
        self.workspaces.iter().map(|ws| ws.count(status)).sum()
    }
}

fn arm_panes(timer: Timer) -> Command {
    Command::ArmPanes {
        generation: timer.generation,
        delay: timer.delay,
    }
}

fn arm_preview(timer: Timer) -> Command {
    Command::ArmPreview {
        generation: timer.generation,
        delay: timer.delay,
    }
}

// ============================================================================
// Tests
// ============================================================================
