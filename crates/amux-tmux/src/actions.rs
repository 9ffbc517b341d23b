//! Pane lifecycle actions: focus and close.

use amux_core::Target;
use tracing::{debug, info};

use crate::client::TmuxClient;
use crate::error::{Result, TmuxError};

/// What a close request ended up removing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillScope {
    /// Only the pane; its window lives on
    Pane,
    /// The whole window, since the pane was its only one
    Window,
}

fn window_of(target: &str) -> Result<Target> {
    let parsed = Target::parse(target);
    if parsed.session.is_empty() || parsed.window.is_empty() {
        return Err(TmuxError::InvalidTarget(target.to_string()));
    }
    Ok(parsed)
}

/// Switches the attached client to the pane's window, then focuses the pane.
///
/// # Errors
///
/// * `TmuxError::InvalidTarget` - If `target` has no window part
/// * `TmuxError::CommandFailed` - If either tmux call fails
pub async fn switch_to<C>(client: &C, target: &str) -> Result<()>
where
    C: TmuxClient + ?Sized,
{
    let parsed = window_of(target)?;
    client.switch_client(&parsed.window_target()).await?;
    client.select_pane(target).await?;
    info!(pane = target, "Switched to pane");
    Ok(())
}

/// Closes a pane.
///
/// Killing the last pane of a window with `kill-pane` would leave tmux to
/// decide what to do with the window, so a sole pane is closed by killing
/// its window instead.
///
/// # Errors
///
/// * `TmuxError::InvalidTarget` - If `target` has no window part
/// * `TmuxError::CommandFailed` - If a tmux call fails
pub async fn kill_target<C>(client: &C, target: &str) -> Result<KillScope>
where
    C: TmuxClient + ?Sized,
{
    let parsed = window_of(target)?;
    let window = parsed.window_target();
    let count = client.window_pane_count(&window).await?;
    debug!(pane = target, window = %window, count, "Closing pane");

    if count <= 1 {
        client.kill_window(&window).await?;
        info!(window = %window, "Killed window");
        Ok(KillScope::Window)
    } else {
        client.kill_pane(target).await?;
        info!(pane = target, "Killed pane");
        Ok(KillScope::Pane)
    }
}
