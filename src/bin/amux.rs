//! amux - terminal dashboard for AI coding agents running in tmux
//!
//! Lists every pane running a recognized agent, grouped by working
//! directory, and shows whether each one is idle, busy, or waiting on you.
//!
//! # Usage
//!
//! ```text
//! amux                       # run inside tmux
//! amux --config ./amux.toml  # use a specific config file
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use amux_core::{ActivityHistory, DetectorRegistry};
use amux_tmux::{ensure_in_tmux, TmuxCli, TmuxClient};
use amux_tui::app::{App, Event};
use amux_tui::collector::Collector;
use amux_tui::config::Config;
use amux_tui::error::{Result as TuiResult, TuiError};
use amux_tui::runtime::Runtime;
use amux_tui::ui;

// ============================================================================
// CLI Arguments
// ============================================================================

/// amux - watch AI coding agents across tmux panes
#[derive(Parser, Debug)]
#[command(name = "amux")]
#[command(about = "Dashboard for AI coding agents running in tmux")]
#[command(version)]
struct Args {
    /// Config file (defaults to ~/.config/amux/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

// ============================================================================
// Terminal Setup / Cleanup
// ============================================================================

fn setup_terminal() -> TuiResult<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(|e| TuiError::TerminalInit(e.to_string()))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| TuiError::TerminalInit(e.to_string()))?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| TuiError::TerminalInit(e.to_string()))
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> TuiResult<()> {
    disable_raw_mode().map_err(|e| TuiError::TerminalCleanup(e.to_string()))?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| TuiError::TerminalCleanup(e.to_string()))?;

    terminal
        .show_cursor()
        .map_err(|e| TuiError::TerminalCleanup(e.to_string()))?;

    Ok(())
}

// ============================================================================
// Keyboard Input Task
// ============================================================================

fn spawn_keyboard_task(
    event_tx: mpsc::UnboundedSender<Event>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if cancel_token.is_cancelled() {
                debug!("Keyboard task shutting down");
                break;
            }

            let poll_result = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await;

            match poll_result {
                Ok(Some(CrosstermEvent::Key(key))) => {
                    if event_tx.send(Event::Key(key)).is_err() {
                        debug!("Event channel closed, keyboard task exiting");
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(width, height))) => {
                    if event_tx.send(Event::Resize(width, height)).is_err() {
                        break;
                    }
                }
                Ok(Some(_)) | Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Keyboard polling task panicked");
                    break;
                }
            }
        }
    })
}

// ============================================================================
// Main Event Loop
// ============================================================================

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    runtime: &Runtime,
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
    cancel_token: &CancellationToken,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    for command in app.start() {
        runtime.execute(command);
    }

    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        match tokio::time::timeout(tick_rate, event_rx.recv()).await {
            Ok(Some(event)) => {
                for command in app.update(event) {
                    runtime.execute(command);
                }
            }
            Ok(None) => {
                warn!("Event channel closed");
                break;
            }
            Err(_) => {}
        }

        if app.should_quit || cancel_token.is_cancelled() {
            break;
        }
    }

    Ok(())
}

// ============================================================================
// Logging Setup
// ============================================================================

fn get_log_dir() -> Option<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg_state).join("amux"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/amux"))
}

fn create_log_file() -> Option<std::fs::File> {
    let log_dir = get_log_dir()?;

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory {log_dir:?}: {e}");
        return None;
    }

    let log_path = log_dir.join("amux.log");

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {log_path:?}: {e}");
            None
        }
    }
}

fn init_logging() {
    if let Some(file) = create_log_file() {
        let writer = Mutex::new(file);

        let filter = EnvFilter::from_default_env().add_directive(
            "amux=info"
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::Directive::from(tracing::Level::INFO)),
        );

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init();
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging();

    info!("amux starting...");

    ensure_in_tmux().context("amux must be run inside a tmux session")?;

    let config = Config::load(args.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    let home = dirs::home_dir();
    let client: Arc<dyn TmuxClient> = Arc::new(TmuxCli::new(config.tmux.clone()));
    let history = ActivityHistory::new(config.history_path(home.as_deref()));
    let collector = Collector::new(
        Arc::clone(&client),
        Arc::new(DetectorRegistry::builtin()),
        Arc::new(history),
        config.collector_options(home),
    );

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let cancel_token = CancellationToken::new();

    let runtime = Runtime::new(
        Arc::new(collector),
        client,
        event_tx.clone(),
        cancel_token.clone(),
    );

    let mut terminal = match setup_terminal() {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to initialize terminal");
            return Err(e.into());
        }
    };

    let mut app = App::new(config.app_options());

    let keyboard_handle = spawn_keyboard_task(event_tx, cancel_token.clone());

    let result = run_event_loop(&mut terminal, &mut app, &runtime, &mut event_rx, &cancel_token).await;

    cancel_token.cancel();

    let _ = tokio::time::timeout(Duration::from_millis(100), keyboard_handle).await;

    if let Err(e) = cleanup_terminal(&mut terminal) {
        error!(error = %e, "Failed to cleanup terminal");
    }

    info!("amux stopped");

    result
}
