//! One poll cycle: gather, resolve, classify, group.
//!
//! The pane listing, the process snapshot and the activity history are
//! independent, so they are gathered concurrently; each writes only its own
//! result. Resolution and classification then run sequentially, one pane at
//! a time, reusing a single capture per pane.

use std::path::PathBuf;
use std::sync::Arc;

use amux_core::{
    classify, group_panes, recent_lines, ActivityHistory, DetectorRegistry, Pane, PaneStatus,
    ProcessSnapshot, ProcessSource, ProcessTree, Workspace,
};
use amux_tmux::{Capture, TmuxClient};
use tracing::{debug, warn};

use crate::error::CollectionError;

/// How much work a cycle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Agent panes only, every status Idle; no pane captures
    Basic,
    /// Full classification
    Full,
}

/// Collection settings.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub process_source: ProcessSource,
    pub capture_lines: usize,
    pub preview_lines: usize,
    /// Home directory, for `~` collapsing in workspace names
    pub home: Option<PathBuf>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            process_source: ProcessSource::default(),
            capture_lines: amux_core::status::DEFAULT_CAPTURE_LINES,
            preview_lines: 50,
            home: None,
        }
    }
}

/// Runs poll cycles against a tmux server.
///
/// Cheap to share: every dependency is behind an `Arc`.
pub struct Collector {
    client: Arc<dyn TmuxClient>,
    registry: Arc<DetectorRegistry>,
    history: Arc<ActivityHistory>,
    processes: Arc<dyn ProcessSnapshot>,
    options: CollectorOptions,
}

impl Collector {
    pub fn new(
        client: Arc<dyn TmuxClient>,
        registry: Arc<DetectorRegistry>,
        history: Arc<ActivityHistory>,
        options: CollectorOptions,
    ) -> Self {
        Self {
            client,
            registry,
            history,
            processes: Arc::new(options.process_source),
            options,
        }
    }

    /// Replaces the process snapshot source chosen by `options`.
    #[must_use]
    pub fn with_process_snapshot(mut self, processes: Arc<dyn ProcessSnapshot>) -> Self {
        self.processes = processes;
        self
    }

    /// Runs one cycle and returns the workspace tree.
    ///
    /// # Errors
    ///
    /// * `CollectionError::Tmux` - If panes could not be listed
    /// * `CollectionError::Task` - If a blocking gather task panicked
    pub async fn collect(&self, mode: StatusMode) -> Result<Vec<Workspace>, CollectionError> {
        let processes = Arc::clone(&self.processes);
        let history = Arc::clone(&self.history);

        let (rows, tree, activity) = tokio::join!(
            self.client.list_panes(),
            tokio::task::spawn_blocking(move || processes.snapshot()),
            tokio::task::spawn_blocking(move || history.last_active_by_project()),
        );

        let rows = rows?;
        let tree = tree.unwrap_or_else(|e| {
            warn!(error = %e, "Process snapshot task failed");
            ProcessTree::default()
        });
        let activity = activity.unwrap_or_else(|e| {
            warn!(error = %e, "Activity history task failed");
            None
        });

        let mut panes = Vec::new();
        for row in rows {
            let Some(detector) = self.registry.resolve(&row.command, row.pid, &tree) else {
                continue;
            };

            let status = match mode {
                StatusMode::Basic => PaneStatus::Idle,
                StatusMode::Full => {
                    let lines = match self.client.capture_pane(&row.target, Capture::Visible).await {
                        Ok(capture) => recent_lines(&capture, self.options.capture_lines),
                        Err(e) => {
                            debug!(pane = %row.target, error = %e, "Capture failed, classifying without output");
                            Vec::new()
                        }
                    };
                    classify(&lines, Some(detector), row.pid, &tree)
                }
            };

            let last_active = activity
                .as_ref()
                .and_then(|map| map.get(&row.path).copied());

            panes.push(
                Pane::new(row.target, row.path, row.pid, detector.kind())
                    .with_status(status)
                    .with_last_active(last_active),
            );
        }

        debug!(?mode, panes = panes.len(), processes = tree.len(), "Cycle collected");

        // Branch lookup reads `.git/HEAD` from disk
        let home = self.options.home.clone();
        tokio::task::spawn_blocking(move || group_panes(panes, home.as_deref()))
            .await
            .map_err(|e| CollectionError::Task(e.to_string()))
    }

    /// Captures a pane's recent scroll-back for the preview.
    ///
    /// # Errors
    ///
    /// * `CollectionError::Tmux` - If the capture failed
    pub async fn capture_preview(&self, target: &str) -> Result<String, CollectionError> {
        let capture = self
            .client
            .capture_pane(target, Capture::Scrollback(self.options.preview_lines))
            .await?;
        Ok(capture.trim_end_matches('\n').to_string())
    }
}
