//! Executes [`Command`]s produced by the update loop.
//!
//! Every command that does work runs as its own spawned task and reports
//! back by posting exactly one [`Event`]. Timers respect the shared
//! `CancellationToken`, so nothing is posted once shutdown has begun.

use std::sync::Arc;
use std::time::Duration;

use amux_tmux::{kill_target, switch_to, TmuxClient};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::app::{ActionOutcome, Command, Event};
use crate::collector::Collector;
use crate::error::ActionError;

/// Spawns the work behind each command.
#[derive(Clone)]
pub struct Runtime {
    collector: Arc<Collector>,
    client: Arc<dyn TmuxClient>,
    event_tx: mpsc::UnboundedSender<Event>,
    cancel_token: CancellationToken,
}

impl Runtime {
    pub fn new(
        collector: Arc<Collector>,
        client: Arc<dyn TmuxClient>,
        event_tx: mpsc::UnboundedSender<Event>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            collector,
            client,
            event_tx,
            cancel_token,
        }
    }

    /// Starts the work for one command.
    pub fn execute(&self, command: Command) {
        match command {
            Command::Collect(mode) => {
                let collector = Arc::clone(&self.collector);
                self.spawn(async move {
                    let result = collector.collect(mode).await;
                    Event::PanesLoaded { mode, result }
                });
            }
            Command::CapturePreview(target) => {
                let collector = Arc::clone(&self.collector);
                self.spawn(async move {
                    let result = collector.capture_preview(&target).await;
                    Event::PreviewLoaded { target, result }
                });
            }
            Command::ArmPanes { generation, delay } => {
                self.arm(delay, Event::PanesTick(generation));
            }
            Command::ArmPreview { generation, delay } => {
                self.arm(delay, Event::PreviewTick(generation));
            }
            Command::Switch(target) => {
                let client = Arc::clone(&self.client);
                self.spawn(async move {
                    let result = match switch_to(client.as_ref(), &target).await {
                        Ok(()) => Ok(ActionOutcome::Switched { target }),
                        Err(source) => Err(ActionError::Switch { target, source }),
                    };
                    Event::ActionDone(result)
                });
            }
            Command::Kill(target) => {
                let client = Arc::clone(&self.client);
                self.spawn(async move {
                    let result = match kill_target(client.as_ref(), &target).await {
                        Ok(scope) => Ok(ActionOutcome::Killed { target, scope }),
                        Err(source) => Err(ActionError::Kill { target, source }),
                    };
                    Event::ActionDone(result)
                });
            }
            Command::Quit => {
                debug!("Quit command, cancelling tasks");
                self.cancel_token.cancel();
            }
        }
    }

    fn spawn<F>(&self, work: F)
    where
        F: std::future::Future<Output = Event> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        let cancel_token = self.cancel_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel_token.cancelled() => {}
                event = work => {
                    if event_tx.send(event).is_err() {
                        debug!("Event channel closed, dropping result");
                    }
                }
            }
        });
    }

    fn arm(&self, delay: Duration, event: Event) {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            event
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CollectorOptions, StatusMode};
    use amux_core::{ActivityHistory, DetectorRegistry};
    use amux_tmux::{Capture, PaneRow, Result as TmuxResult, TmuxError};
    use async_trait::async_trait;

    /// A server with no panes whose mutating calls fail.
    struct EmptyServer;

    #[async_trait]
    impl TmuxClient for EmptyServer {
        async fn list_panes(&self) -> TmuxResult<Vec<PaneRow>> {
            Ok(Vec::new())
        }
        async fn capture_pane(&self, _target: &str, _capture: Capture) -> TmuxResult<String> {
            Ok("line\n".to_string())
        }
        async fn switch_client(&self, _window_target: &str) -> TmuxResult<()> {
            Err(TmuxError::CommandFailed("no current client".to_string()))
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

    fn runtime() -> (Runtime, mpsc::UnboundedReceiver<Event>, CancellationToken) {
        let client: Arc<dyn TmuxClient> = Arc::new(EmptyServer);
        let collector = Arc::new(Collector::new(
            Arc::clone(&client),
            Arc::new(DetectorRegistry::builtin()),
            Arc::new(ActivityHistory::new(None)),
            CollectorOptions::default(),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        (Runtime::new(collector, client, tx, token.clone()), rx, token)
    }

    #[tokio::test]
    async fn test_collect_posts_panes_loaded() {
        let (runtime, mut rx, _token) = runtime();
        runtime.execute(Command::Collect(StatusMode::Full));
        match rx.recv().await {
            Some(Event::PanesLoaded { mode, result }) => {
                assert_eq!(mode, StatusMode::Full);
                assert!(result.unwrap().is_empty());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capture_preview_trims() {
        let (runtime, mut rx, _token) = runtime();
        runtime.execute(Command::CapturePreview("a:0.0".to_string()));
        match rx.recv().await {
            Some(Event::PreviewLoaded { target, result }) => {
                assert_eq!(target, "a:0.0");
                assert_eq!(result.unwrap(), "line");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_fires_after_delay() {
        let (runtime, mut rx, _token) = runtime();
        runtime.execute(Command::ArmPanes {
            generation: 7,
            delay: Duration::from_secs(2),
        });
        assert!(matches!(rx.recv().await, Some(Event::PanesTick(7))));
    }

    #[tokio::test]
    async fn test_switch_failure_is_action_error() {
        let (runtime, mut rx, _token) = runtime();
        runtime.execute(Command::Switch("a:0.0".to_string()));
        assert!(matches!(
            rx.recv().await,
            Some(Event::ActionDone(Err(ActionError::Switch { .. })))
        ));
    }

    #[tokio::test]
    async fn test_kill_reports_scope() {
        let (runtime, mut rx, _token) = runtime();
        runtime.execute(Command::Kill("a:0.1".to_string()));
        match rx.recv().await {
            Some(Event::ActionDone(Ok(outcome))) => assert_eq!(
                outcome,
                ActionOutcome::Killed {
                    target: "a:0.1".to_string(),
                    scope: amux_tmux::KillScope::Pane
                }
            ),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_cancels_pending_timers() {
        let (runtime, mut rx, token) = runtime();
        runtime.execute(Command::ArmPreview {
            generation: 1,
            delay: Duration::from_millis(200),
        });
        runtime.execute(Command::Quit);
        assert!(token.is_cancelled());

        drop(runtime);
        // Every sender is gone once the cancelled tasks finish
        assert!(rx.recv().await.is_none());
    }
}
