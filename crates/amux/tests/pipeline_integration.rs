//! Integration tests for the collection pipeline and the update loop.
//!
//! A scripted tmux server stands in for the real one, so these tests cover
//! listing, agent resolution, capture-based classification, activity lookup
//! and grouping, then feed the result through `App::update`.
//!
//! Tests CAN use `.unwrap()` and `.expect()` - this is allowed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use amux_core::{
    ActivityHistory, AgentKind, DetectorRegistry, PaneStatus, ProcessNode, ProcessSource, ProcessTree,
};
use amux_tmux::{Capture, PaneRow, Result as TmuxResult, TmuxClient, TmuxError};
use amux_tui::app::{Command, Event};
use amux_tui::collector::{Collector, CollectorOptions, StatusMode};
use amux_tui::error::CollectionError;
use amux_tui::App;
use async_trait::async_trait;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// A pid no real process will have, so resolution relies on the command.
const NO_SUCH_PID: u32 = 99_999_999;

/// Scripted tmux server: fixed pane rows and per-target captures.
#[derive(Default)]
struct ScriptedServer {
    rows: Vec<PaneRow>,
    captures: HashMap<String, String>,
    fail_listing: bool,
    captured: Mutex<Vec<(String, Capture)>>,
}

impl ScriptedServer {
    fn with_pane(self, target: &str, command: &str, path: &Path, capture: &str) -> Self {
        self.with_owned_pane(target, command, NO_SUCH_PID, path, capture)
    }

    fn with_owned_pane(
        mut self,
        target: &str,
        command: &str,
        pid: u32,
        path: &Path,
        capture: &str,
    ) -> Self {
        self.rows.push(PaneRow {
            target: target.to_string(),
            command: command.to_string(),
            path: path.to_string_lossy().into_owned(),
            pid,
        });
        self.captures.insert(target.to_string(), capture.to_string());
        self
    }

    fn captured(&self) -> Vec<(String, Capture)> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait]
impl TmuxClient for ScriptedServer {
    async fn list_panes(&self) -> TmuxResult<Vec<PaneRow>> {
        if self.fail_listing {
            return Err(TmuxError::CommandFailed("list-panes failed: no server running".to_string()));
        }
        Ok(self.rows.clone())
    }

    async fn capture_pane(&self, target: &str, capture: Capture) -> TmuxResult<String> {
        self.captured.lock().unwrap().push((target.to_string(), capture));
        self.captures
            .get(target)
            .cloned()
            .ok_or_else(|| TmuxError::CommandFailed(format!("capture-pane failed: can't find pane {target}")))
    }

    async fn switch_client(&self, _window_target: &str) -> TmuxResult<()> {
        Ok(())
    }

    async fn select_pane(&self, _target: &str) -> TmuxResult<()> {
        Ok(())
    }

    async fn window_pane_count(&self, _window_target: &str) -> TmuxResult<usize> {
        Ok(2)
    }

    async fn kill_pane(&self, _target: &str) -> TmuxResult<()> {
        Ok(())
    }

    async fn kill_window(&self, _window_target: &str) -> TmuxResult<()> {
        Ok(())
    }
}

/// Two project directories (`alpha` on branch `main`, `beta` without git)
/// plus an activity log mentioning `alpha`.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let alpha = dir.path().join("alpha");
        fs::create_dir_all(alpha.join(".git")).unwrap();
        fs::write(alpha.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::create_dir_all(dir.path().join("beta")).unwrap();

        let log = format!(
            "{{\"timestamp\":1700000000000,\"project\":\"{0}\"}}\n\
             {{\"timestamp\":1700000500000,\"project\":\"{0}\"}}\n",
            alpha.display()
        );
        fs::write(dir.path().join("history.jsonl"), log).unwrap();

        Self { dir }
    }

    fn alpha(&self) -> std::path::PathBuf {
        self.dir.path().join("alpha")
    }

    fn beta(&self) -> std::path::PathBuf {
        self.dir.path().join("beta")
    }

    fn collector(&self, server: Arc<ScriptedServer>) -> Collector {
        let history = ActivityHistory::new(Some(self.dir.path().join("history.jsonl")));
        Collector::new(
            server,
            Arc::new(DetectorRegistry::builtin()),
            Arc::new(history),
            CollectorOptions {
                process_source: ProcessSource::Sysinfo,
                capture_lines: 10,
                preview_lines: 50,
                home: None,
            },
        )
    }
}

/// zsh(100) runs `node .../gemini`(110); claude(200) works through
/// node(210), which keeps caffeinate(220) alive.
fn agent_process_tree() -> ProcessTree {
    let node = |pid, ppid, comm: &str, args: &str| ProcessNode {
        pid,
        ppid: Some(ppid),
        comm: comm.to_string(),
        args: args.to_string(),
    };
    ProcessTree::from_nodes(vec![
        node(100, 1, "zsh", "-zsh"),
        node(110, 100, "node", "node /opt/homebrew/bin/gemini --yolo"),
        node(200, 1, "claude", "claude"),
        node(210, 200, "node", "node /opt/tools/mcp-server.js"),
        node(220, 210, "caffeinate", "caffeinate -i -w 200"),
        node(300, 1, "zsh", "-zsh"),
        node(310, 300, "vim", "vim notes.md"),
    ])
}

fn mixed_server(fixture: &Fixture) -> ScriptedServer {
    ScriptedServer::default()
        .with_pane(
            "dev:0.0",
            "claude",
            &fixture.alpha(),
            "● Bash(cargo test)\n\nDo you want to proceed?\n❯ 1. Yes\n  2. No\n",
        )
        .with_pane("dev:0.1", "zsh", &fixture.alpha(), "$ ls\n")
        .with_pane(
            "dev:1.0",
            "codex",
            &fixture.beta(),
            "• Working (11s • esc to interrupt)\n",
        )
        .with_pane("dev:1.1", "opencode", &fixture.beta(), "ready\n")
}

// ============================================================================
// Collection Tests
// ============================================================================

#[tokio::test]
async fn test_full_cycle_classifies_and_groups() {
    let fixture = Fixture::new();
    let collector = fixture.collector(Arc::new(mixed_server(&fixture)));

    let workspaces = collector.collect(StatusMode::Full).await.expect("cycle should succeed");

    assert_eq!(workspaces.len(), 2);
    let alpha = &workspaces[0];
    let beta = &workspaces[1];

    assert_eq!(alpha.short_path, "alpha");
    assert_eq!(alpha.branch.as_deref(), Some("main"));
    assert_eq!(alpha.panes.len(), 1, "the plain shell pane is not an agent");
    assert_eq!(alpha.panes[0].target, "dev:0.0");
    assert_eq!(alpha.panes[0].agent, AgentKind::Claude);
    assert_eq!(alpha.panes[0].status, PaneStatus::NeedsAttention);
    assert_eq!(
        alpha.panes[0].last_active.map(|t| t.timestamp_millis()),
        Some(1_700_000_500_000)
    );

    assert_eq!(beta.short_path, "beta");
    assert_eq!(beta.branch, None);
    let statuses: Vec<_> = beta.panes.iter().map(|p| (p.agent, p.status)).collect();
    assert_eq!(
        statuses,
        [
            (AgentKind::Codex, PaneStatus::Busy),
            (AgentKind::OpenCode, PaneStatus::Idle)
        ]
    );
    assert_eq!(beta.panes[0].last_active, None);
}

#[tokio::test]
async fn test_basic_cycle_skips_captures() {
    let fixture = Fixture::new();
    let server = Arc::new(mixed_server(&fixture));
    let collector = fixture.collector(Arc::clone(&server));

    let workspaces = collector.collect(StatusMode::Basic).await.unwrap();

    let panes: Vec<_> = workspaces.iter().flat_map(|w| &w.panes).collect();
    assert_eq!(panes.len(), 3);
    assert!(panes.iter().all(|p| p.status == PaneStatus::Idle));
    assert!(server.captured().is_empty());
}

#[tokio::test]
async fn test_failed_capture_classifies_without_output() {
    let fixture = Fixture::new();
    let mut server = mixed_server(&fixture);
    server.captures.remove("dev:1.0");
    let collector = fixture.collector(Arc::new(server));

    let workspaces = collector.collect(StatusMode::Full).await.unwrap();

    let codex = workspaces
        .iter()
        .flat_map(|w| &w.panes)
        .find(|p| p.target == "dev:1.0")
        .expect("pane is still listed");
    assert_eq!(codex.status, PaneStatus::Idle);
}

#[tokio::test]
async fn test_listing_failure_is_an_error() {
    let fixture = Fixture::new();
    let server = ScriptedServer {
        fail_listing: true,
        ..Default::default()
    };
    let collector = fixture.collector(Arc::new(server));

    let err = collector.collect(StatusMode::Full).await.unwrap_err();
    assert!(matches!(err, CollectionError::Tmux(_)));
    assert!(err.to_string().contains("no server running"));
}

#[tokio::test]
async fn test_capture_preview_uses_scrollback() {
    let fixture = Fixture::new();
    let server = Arc::new(mixed_server(&fixture));
    let collector = fixture.collector(Arc::clone(&server));

    let preview = collector.capture_preview("dev:1.1").await.unwrap();

    assert_eq!(preview, "ready");
    assert_eq!(
        server.captured(),
        [("dev:1.1".to_string(), Capture::Scrollback(50))]
    );
}

#[tokio::test]
async fn test_agent_resolved_through_child_process() {
    let fixture = Fixture::new();
    let server = ScriptedServer::default()
        .with_owned_pane("dev:0.0", "zsh", 100, &fixture.beta(), "")
        .with_owned_pane("dev:0.1", "zsh", 300, &fixture.beta(), "");
    let collector = fixture
        .collector(Arc::new(server))
        .with_process_snapshot(Arc::new(agent_process_tree()));

    let workspaces = collector.collect(StatusMode::Full).await.unwrap();

    let panes: Vec<_> = workspaces.iter().flat_map(|w| &w.panes).collect();
    assert_eq!(panes.len(), 1, "the shell running vim is not an agent");
    assert_eq!(panes[0].target, "dev:0.0");
    assert_eq!(panes[0].agent, AgentKind::Gemini);
    assert_eq!(panes[0].status, PaneStatus::Idle);
}

#[tokio::test]
async fn test_claude_busy_from_caffeinate_grandchild() {
    let fixture = Fixture::new();
    let server = ScriptedServer::default()
        .with_owned_pane("dev:0.0", "claude", 200, &fixture.alpha(), "● Reading src/main.rs\n")
        .with_owned_pane("dev:0.1", "claude", 300, &fixture.alpha(), "❯ \n");
    let collector = fixture
        .collector(Arc::new(server))
        .with_process_snapshot(Arc::new(agent_process_tree()));

    let workspaces = collector.collect(StatusMode::Full).await.unwrap();

    let statuses: Vec<_> = workspaces[0]
        .panes
        .iter()
        .map(|p| (p.target.as_str(), p.status))
        .collect();
    assert_eq!(
        statuses,
        [("dev:0.0", PaneStatus::Busy), ("dev:0.1", PaneStatus::Idle)]
    );
}

// ============================================================================
// Update Loop Tests
// ============================================================================

#[tokio::test]
async fn test_app_selects_pane_needing_attention() {
    let fixture = Fixture::new();
    let server = mixed_server(&fixture)
        .with_pane("dev:2.0", "gemini", &fixture.beta(), "")
        .with_pane("dev:2.1", "claude", &fixture.beta(), "Allow this edit?\n");
    let collector = fixture.collector(Arc::new(server));

    let mut app = App::default();
    assert!(app.start().contains(&Command::Collect(StatusMode::Basic)));

    let basic = collector.collect(StatusMode::Basic).await;
    let commands = app.update(Event::PanesLoaded {
        mode: StatusMode::Basic,
        result: basic,
    });
    assert!(commands.contains(&Command::Collect(StatusMode::Full)));
    assert_eq!(app.selected_target().as_deref(), Some("dev:0.0"));
    assert!(!app.status_loaded);

    let full = collector.collect(StatusMode::Full).await;
    app.update(Event::PanesLoaded {
        mode: StatusMode::Full,
        result: full,
    });

    assert!(app.status_loaded);
    assert_eq!(app.pane_count(), 5);
    assert_eq!(app.count(PaneStatus::NeedsAttention), 2);
    assert_eq!(app.count(PaneStatus::Busy), 1);
    assert_eq!(app.selected_target().as_deref(), Some("dev:0.0"));
    assert!(app.error.is_none());
}

#[tokio::test]
async fn test_app_keeps_panes_after_failed_cycle() {
    let fixture = Fixture::new();
    let good = fixture.collector(Arc::new(mixed_server(&fixture)));
    let bad = fixture.collector(Arc::new(ScriptedServer {
        fail_listing: true,
        ..Default::default()
    }));

    let mut app = App::default();
    app.start();
    app.update(Event::PanesLoaded {
        mode: StatusMode::Full,
        result: good.collect(StatusMode::Full).await,
    });
    assert_eq!(app.pane_count(), 3);

    app.update(Event::PanesLoaded {
        mode: StatusMode::Full,
        result: bad.collect(StatusMode::Full).await,
    });

    assert_eq!(app.pane_count(), 3);
    assert!(app.error.as_deref().unwrap().contains("no server running"));
}
