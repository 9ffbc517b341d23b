//! amux TUI - Library modules
//!
//! This library provides the dashboard components for watching coding agents
//! running across tmux panes.
//!
//! # Architecture
//!
//! The TUI uses an event-driven architecture with three main components:
//!
//! 1. **Keyboard Task**: Polls for keyboard input and sends events to the main loop
//! 2. **Runtime**: Runs collection cycles, preview captures, timers and tmux
//!    actions as spawned tasks that post their outcome back as events
//! 3. **Main Event Loop**: Folds events into [`App`] state, executes the
//!    resulting commands, and renders the UI
//!
//! All tasks respect a shared `CancellationToken` for graceful shutdown.

pub mod app;
pub mod collector;
pub mod config;
pub mod error;
pub mod input;
pub mod poll;
pub mod runtime;
pub mod ui;

// Re-export commonly used types
pub use app::{App, AppOptions, Command, Event};
pub use collector::{Collector, CollectorOptions, StatusMode};
pub use config::Config;
pub use error::{ActionError, CollectionError, Result, TuiError};
pub use runtime::Runtime;
