//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use nethawk_core::{Dashboard, DashboardConfig, Notification, SessionInfo, SessionState};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Connect, run `f`, and disconnect whatever `f` returned.
pub async fn with_dashboard<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CliError>
where
    F: FnOnce(Dashboard) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let dashboard = Dashboard::new(config);
    dashboard.connect().await?;
    let result = f(dashboard.clone()).await;
    dashboard.disconnect().await;
    result
}

/// Wait until `check` yields an outcome for the panel state.
///
/// `check` runs against the current snapshot first, then after every
/// change, until it returns `Some` or `limit` elapses.
pub async fn wait_until<S, T>(
    rx: &mut watch::Receiver<Arc<S>>,
    limit: Duration,
    what: &str,
    mut check: impl FnMut(&S) -> Option<Result<T, CliError>>,
) -> Result<T, CliError> {
    let wait = async {
        loop {
            let outcome = check(&rx.borrow_and_update());
            if let Some(outcome) = outcome {
                return outcome;
            }
            if rx.changed().await.is_err() {
                return Err(CliError::NotConnected);
            }
        }
    };
    tokio::time::timeout(limit, wait)
        .await
        .map_err(|_| CliError::Timeout {
            what: what.into(),
            seconds: limit.as_secs(),
        })?
}

/// Wait for the first notification whose title is in `titles`.
pub async fn wait_notification(
    rx: &mut broadcast::Receiver<Notification>,
    limit: Duration,
    what: &str,
    titles: &[&str],
) -> Result<Notification, CliError> {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(n) if titles.contains(&n.title.as_str()) => return Ok(n),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return Err(CliError::NotConnected),
            }
        }
    };
    tokio::time::timeout(limit, wait)
        .await
        .map_err(|_| CliError::Timeout {
            what: what.into(),
            seconds: limit.as_secs(),
        })?
}

/// Map a profile session to a wait outcome: `Ok` once confirmed, an
/// error once failed or dropped, `None` while still in flight.
pub fn session_outcome(info: Option<&SessionInfo>, what: &str) -> Option<Result<(), CliError>> {
    let info = info?;
    match info.state {
        SessionState::Connected => Some(Ok(())),
        // A failure walks straight through Error to Disconnected; the
        // backend message survives in `last_error`.
        SessionState::Error | SessionState::Disconnected => {
            let message = match (&info.last_error, info.error_at) {
                (Some(message), Some(_)) => message.clone(),
                _ => "session ended before it was ready".into(),
            };
            Some(Err(CliError::SessionFailed {
                what: what.into(),
                message,
            }))
        }
        SessionState::Idle | SessionState::Connecting => None,
    }
}

/// Truncate `text` to `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
