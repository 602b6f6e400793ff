//! Data bridge: forwards [`Dashboard`] streams into the action channel.
//!
//! Runs as a background task. It holds a handler on every panel so push
//! events are applied for all screens, connects, sends the initial
//! snapshots, then relays each panel change, notification and connection
//! transition as an [`Action`] until cancelled.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use nethawk_core::{
    Command, ConnectionState, Dashboard, Notification, PanelKind, Subscription,
};

use crate::action::Action;

/// How often the overview panel is re-fetched over HTTP.
const OVERVIEW_REFRESH: Duration = Duration::from_secs(30);

pub async fn spawn_data_bridge(
    dashboard: Dashboard,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _handlers: Vec<Subscription> = [
        PanelKind::Overview,
        PanelKind::Network,
        PanelKind::Bandwidth,
        PanelKind::Ports,
        PanelKind::Ftp,
        PanelKind::Mail,
    ]
    .into_iter()
    .map(|panel| dashboard.subscribe(panel))
    .collect();

    let _ = action_tx.send(Action::ConnectionChanged(ConnectionState::Connecting));
    let connected = tokio::select! {
        () = cancel.cancelled() => return,
        result = dashboard.connect() => result,
    };
    if let Err(e) = connected {
        warn!(error = %e, "failed to connect to backend");
        let _ = action_tx.send(Action::ConnectionChanged(ConnectionState::Failed));
        let _ = action_tx.send(Action::Notify(Notification::error(
            "Connection failed",
            e.to_string(),
        )));
        return;
    }

    let mut overview = dashboard.overview_stream();
    let mut network = dashboard.network_stream();
    let mut bandwidth = dashboard.bandwidth_stream();
    let mut ports = dashboard.ports_stream();
    let mut ftp = dashboard.ftp_stream();
    let mut mail = dashboard.mail_stream();
    let mut notifications = dashboard.notifications();
    let mut conn_state = dashboard.connection_state();

    let _ = action_tx.send(Action::ConnectionChanged(*conn_state.borrow_and_update()));
    let _ = action_tx.send(Action::OverviewUpdated(overview.current().clone()));
    let _ = action_tx.send(Action::NetworkUpdated(network.current().clone()));
    let _ = action_tx.send(Action::BandwidthUpdated(bandwidth.current().clone()));
    let _ = action_tx.send(Action::PortsUpdated(ports.current().clone()));
    let _ = action_tx.send(Action::FtpUpdated(ftp.current().clone()));
    let _ = action_tx.send(Action::MailUpdated(mail.current().clone()));

    // First tick fires immediately and loads the overview.
    let mut refresh = tokio::time::interval(OVERVIEW_REFRESH);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = conn_state.changed() => {
                let state = *conn_state.borrow_and_update();
                debug!(%state, "connection state changed");
                let _ = action_tx.send(Action::ConnectionChanged(state));
            }
            note = notifications.recv() => match note {
                Ok(note) => {
                    let _ = action_tx.send(Action::Notify(note));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "notification feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(s) = overview.changed() => {
                let _ = action_tx.send(Action::OverviewUpdated(s));
            }
            Some(s) = network.changed() => {
                let _ = action_tx.send(Action::NetworkUpdated(s));
            }
            Some(s) = bandwidth.changed() => {
                let _ = action_tx.send(Action::BandwidthUpdated(s));
            }
            Some(s) = ports.changed() => {
                let _ = action_tx.send(Action::PortsUpdated(s));
            }
            Some(s) = ftp.changed() => {
                let _ = action_tx.send(Action::FtpUpdated(s));
            }
            Some(s) = mail.changed() => {
                let _ = action_tx.send(Action::MailUpdated(s));
            }
            _ = refresh.tick() => {
                let reachable = matches!(
                    *conn_state.borrow(),
                    ConnectionState::Connected | ConnectionState::Reconnecting { .. }
                );
                if reachable {
                    let _ = action_tx.send(Action::Execute(Command::RefreshOverview));
                }
            }
        }
    }

    dashboard.disconnect().await;
    debug!("data bridge shut down");
}
