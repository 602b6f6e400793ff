// ── Dashboard controller ──
//
// Owns the backend connection for every panel: the HTTP client, the
// shared push channel, the panel subscription registry and the
// background tasks that fold channel events into panel state. User
// intents arrive as `Command`s through an mpsc channel and are routed to
// exactly one outbound message or HTTP call each.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use nethawk_api::events::{
    self as wire, MailGetEmailContent, MailSendTest, ProfileConnect, StartNetworkScan,
    StartPortScan, outbound,
};
use nethawk_api::models::NewMailConnection;
use nethawk_api::{BackendClient, ChannelEvent, ChannelState, PushChannel};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::manager::{ConnectionManager, Subscription};
use crate::model::{FtpProfile, MailProfile, Notification};
use crate::panel::{
    BandwidthState, FtpState, MailState, NetworkScanState, OverviewState, OverviewUpdate,
    PanelKind, PortScanState,
};
use crate::stream::PanelStream;
use crate::sync::{Effect, Inbound, PanelEvent, Reducer, decode};
use crate::util::join_ports;

const COMMAND_CHANNEL_SIZE: usize = 64;
const NOTIFY_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

/// Backend link state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    #[strum(to_string = "Reconnecting (attempt {attempt})")]
    Reconnecting {
        attempt: u32,
    },
    Failed,
}

impl From<ChannelState> for ConnectionState {
    fn from(state: ChannelState) -> Self {
        match state {
            ChannelState::Disconnected => Self::Disconnected,
            ChannelState::Connecting => Self::Connecting,
            ChannelState::Connected => Self::Connected,
            ChannelState::Reconnecting { attempt } => Self::Reconnecting { attempt },
            ChannelState::Failed => Self::Failed,
        }
    }
}

// ── Panel state publishers ───────────────────────────────────────

struct Panels {
    overview: watch::Sender<Arc<OverviewState>>,
    network: watch::Sender<Arc<NetworkScanState>>,
    bandwidth: watch::Sender<Arc<BandwidthState>>,
    ports: watch::Sender<Arc<PortScanState>>,
    ftp: watch::Sender<Arc<FtpState>>,
    mail: watch::Sender<Arc<MailState>>,
}

impl Panels {
    fn new(config: &DashboardConfig) -> Self {
        Self {
            overview: watch::channel(Arc::default()).0,
            network: watch::channel(Arc::default()).0,
            bandwidth: watch::channel(Arc::new(BandwidthState::new(config.bandwidth_history))).0,
            ports: watch::channel(Arc::default()).0,
            ftp: watch::channel(Arc::default()).0,
            mail: watch::channel(Arc::new(MailState::new(
                config.mail_per_page,
                config.mailbox.clone(),
            )))
            .0,
        }
    }

    /// Back to the initial empty form.
    fn reset(&self, config: &DashboardConfig) {
        self.overview.send_replace(Arc::default());
        self.network.send_replace(Arc::default());
        self.bandwidth
            .send_replace(Arc::new(BandwidthState::new(config.bandwidth_history)));
        self.ports.send_replace(Arc::default());
        self.ftp.send_replace(Arc::default());
        self.mail.send_replace(Arc::new(MailState::new(
            config.mail_per_page,
            config.mailbox.clone(),
        )));
    }
}

/// Mutate published state in place under the channel's write lock, so the
/// command and event tasks never lose each other's updates.
fn mutate<S: Clone, R>(tx: &watch::Sender<Arc<S>>, f: impl FnOnce(&mut S) -> R) -> R {
    let mut out = None;
    tx.send_modify(|state| out = Some(f(Arc::make_mut(state))));
    match out {
        Some(result) => result,
        None => unreachable!("send_modify always runs its closure"),
    }
}

// ── Dashboard ────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. Manages the connection
/// lifecycle, command routing and per-panel state publication.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    connection_state: watch::Sender<ConnectionState>,
    notify_tx: broadcast::Sender<Notification>,
    panels: Panels,
    manager: ConnectionManager,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection. Cancelled on disconnect,
    /// replaced on connect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<BackendClient>>,
    channel: Mutex<Option<Arc<PushChannel>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Create a dashboard. Does NOT connect; call
    /// [`connect()`](Self::connect) to reach the backend.
    pub fn new(config: DashboardConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (notify_tx, _) = broadcast::channel(NOTIFY_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let panels = Panels::new(&config);

        Self {
            inner: Arc::new(DashboardInner {
                config,
                connection_state,
                notify_tx,
                panels,
                manager: ConnectionManager::new(),
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                channel: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.inner.manager
    }

    /// Attach a handler for `panel`: push events for it are applied
    /// while the returned guard lives.
    pub fn subscribe(&self, panel: PanelKind) -> Subscription {
        self.inner.manager.subscribe(panel)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the backend.
    ///
    /// Builds the HTTP client, opens the push channel (when enabled) and
    /// waits for it to join, spawns the event and command tasks, then
    /// loads profiles. Idempotent while connected.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() == ConnectionState::Connected {
            debug!("already connected");
            return Ok(());
        }
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = match BackendClient::new(config.backend_url.clone(), &config.transport()) {
            Ok(client) => client,
            Err(e) => {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e.into());
            }
        };
        *self.inner.client.lock().await = Some(client);

        let mut handles = Vec::new();
        if config.push_enabled {
            if let Err(e) = self.open_channel(&child, &mut handles).await {
                child.cancel();
                for handle in handles {
                    handle.abort();
                }
                *self.inner.client.lock().await = None;
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e);
            }
        }

        // Command processor
        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let this = self.clone();
            handles.push(tokio::spawn(command_processor_task(this, rx)));
        }
        *self.inner.task_handles.lock().await = handles;

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!(backend = %config.backend_url, push = config.push_enabled, "connected to backend");

        if let Err(e) = self.refresh_profiles().await {
            warn!(error = %e, "initial profile load failed (non-fatal)");
        }
        Ok(())
    }

    /// Open the push channel, wait for the namespace join and spawn the
    /// event processor plus the link-state bridge.
    async fn open_channel(
        &self,
        cancel: &CancellationToken,
        handles: &mut Vec<JoinHandle<()>>,
    ) -> Result<(), CoreError> {
        let config = &self.inner.config;
        let channel = Arc::new(PushChannel::connect(
            &config.backend_url,
            config.reconnect_config(),
            cancel.child_token(),
        )?);
        // Subscribe before the join so nothing is missed.
        let events = channel.subscribe();
        let mut link = channel.state();

        let joined = tokio::time::timeout(
            config.timeout,
            link.wait_for(|s| matches!(s, ChannelState::Connected | ChannelState::Failed)),
        )
        .await
        .map(|r| r.map(|state| *state));
        let reason = match joined {
            Ok(Ok(state)) if state == ChannelState::Connected => None,
            Ok(Ok(_)) => Some("push channel gave up reconnecting".to_owned()),
            Ok(Err(_)) => Some("push channel task exited".to_owned()),
            Err(_) => Some(format!(
                "push channel did not connect within {}s",
                config.timeout.as_secs()
            )),
        };
        if let Some(reason) = reason {
            channel.shutdown();
            return Err(CoreError::ConnectionFailed {
                url: config.backend_url.to_string(),
                reason,
            });
        }

        handles.push(tokio::spawn(event_processor_task(
            self.clone(),
            events,
            Arc::clone(&channel),
            cancel.clone(),
        )));
        handles.push(tokio::spawn(link_state_task(
            self.inner.connection_state.clone(),
            link,
            cancel.clone(),
        )));

        *self.inner.channel.lock().await = Some(channel);
        info!("push channel joined");
        Ok(())
    }

    /// Disconnect from the backend.
    ///
    /// Cancels background tasks, detaches every panel handler, shuts the
    /// push channel down and resets every panel to its initial form.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent, so connect can run again).
        self.inner.cancel_child.lock().await.cancel();
        self.inner.manager.detach_all();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if let Some(channel) = self.inner.channel.lock().await.take() {
            channel.shutdown();
        }
        *self.inner.client.lock().await = None;

        // Recreate command channel so reconnects can spawn a fresh receiver.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner.panels.reset(&self.inner.config);
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result. HTTP-only commands are
    /// accepted while the push channel is reconnecting.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let state = *self.inner.connection_state.borrow();
        let ready = match state {
            ConnectionState::Connected => true,
            ConnectionState::Reconnecting { .. } => cmd.is_http(),
            _ => false,
        };
        if !ready {
            return Err(CoreError::NotConnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::NotConnected)?;

        rx.await.map_err(|_| CoreError::NotConnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Dashboard) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let dashboard = Dashboard::new(config);
        dashboard.connect().await?;
        let result = f(dashboard.clone()).await;
        dashboard.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to user-facing notifications.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notify_tx.subscribe()
    }

    pub fn overview(&self) -> watch::Receiver<Arc<OverviewState>> {
        self.inner.panels.overview.subscribe()
    }

    pub fn network(&self) -> watch::Receiver<Arc<NetworkScanState>> {
        self.inner.panels.network.subscribe()
    }

    pub fn bandwidth(&self) -> watch::Receiver<Arc<BandwidthState>> {
        self.inner.panels.bandwidth.subscribe()
    }

    pub fn ports(&self) -> watch::Receiver<Arc<PortScanState>> {
        self.inner.panels.ports.subscribe()
    }

    pub fn ftp(&self) -> watch::Receiver<Arc<FtpState>> {
        self.inner.panels.ftp.subscribe()
    }

    pub fn mail(&self) -> watch::Receiver<Arc<MailState>> {
        self.inner.panels.mail.subscribe()
    }

    pub fn ports_stream(&self) -> PanelStream<PortScanState> {
        PanelStream::new(self.ports())
    }

    pub fn network_stream(&self) -> PanelStream<NetworkScanState> {
        PanelStream::new(self.network())
    }

    pub fn bandwidth_stream(&self) -> PanelStream<BandwidthState> {
        PanelStream::new(self.bandwidth())
    }

    pub fn ftp_stream(&self) -> PanelStream<FtpState> {
        PanelStream::new(self.ftp())
    }

    pub fn mail_stream(&self) -> PanelStream<MailState> {
        PanelStream::new(self.mail())
    }

    pub fn overview_stream(&self) -> PanelStream<OverviewState> {
        PanelStream::new(self.overview())
    }

    // ── HTTP reads ───────────────────────────────────────────────

    async fn client(&self) -> Result<BackendClient, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }

    async fn channel(&self) -> Result<Arc<PushChannel>, CoreError> {
        self.inner
            .channel
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }

    /// Reload FTP and mail profiles. Each failed list is reported as a
    /// notification and leaves the cached profiles alone; the first
    /// failure is also returned.
    pub async fn refresh_profiles(&self) -> Result<(usize, usize), CoreError> {
        let client = self.client().await?;
        let (ftp, mail) = tokio::join!(client.list_ftp_profiles(), client.list_mail_profiles());
        let mut first_error = None;

        let ftp_count = match ftp {
            Ok(list) => {
                let profiles: Vec<FtpProfile> = list.into_iter().map(FtpProfile::from).collect();
                let count = profiles.len();
                mutate(&self.inner.panels.ftp, |s| s.set_profiles(profiles));
                count
            }
            Err(e) => {
                let e = CoreError::from(e);
                self.notify(Notification::error("FTP profiles", e.to_string()));
                first_error.get_or_insert(e);
                self.inner.panels.ftp.borrow().profiles.len()
            }
        };
        let mail_count = match mail {
            Ok(list) => {
                let profiles: Vec<MailProfile> = list.into_iter().map(MailProfile::from).collect();
                let count = profiles.len();
                mutate(&self.inner.panels.mail, |s| s.set_profiles(profiles));
                count
            }
            Err(e) => {
                let e = CoreError::from(e);
                self.notify(Notification::error("Mail profiles", e.to_string()));
                first_error.get_or_insert(e);
                self.inner.panels.mail.borrow().profiles.len()
            }
        };

        debug!(ftp = ftp_count, mail = mail_count, "profiles loaded");
        match first_error {
            Some(e) => Err(e),
            None => Ok((ftp_count, mail_count)),
        }
    }

    /// Re-read the four overview endpoints. Returns how many failed;
    /// failed endpoints keep their previous data.
    pub async fn refresh_overview(&self) -> Result<usize, CoreError> {
        let client = self.client().await?;
        mutate(&self.inner.panels.overview, OverviewState::begin_refresh);

        let (stats, traffic, devices, activity) = tokio::join!(
            client.overview_stats(),
            client.overview_traffic(),
            client.overview_devices(),
            client.overview_activity(),
        );

        let mut events = Vec::with_capacity(5);
        let mut failed = 0;
        let mut fold = |endpoint: &str, result: Result<OverviewUpdate, nethawk_api::Error>| {
            match result {
                Ok(update) => events.push(PanelEvent::Item(update)),
                Err(e) => {
                    failed += 1;
                    warn!(endpoint, error = %e, "overview endpoint failed");
                    events.push(PanelEvent::Error {
                        message: CoreError::from(e).to_string(),
                        target: Some(endpoint.to_owned()),
                    });
                }
            }
        };
        fold("stats", stats.map(|s| OverviewUpdate::Stats(s.into())));
        fold(
            "traffic",
            traffic.map(|t| OverviewUpdate::Traffic(t.into_iter().map(Into::into).collect())),
        );
        fold(
            "devices",
            devices.map(|d| OverviewUpdate::Devices(d.into_iter().map(Into::into).collect())),
        );
        fold(
            "activity",
            activity.map(|a| OverviewUpdate::Activity(a.into_iter().map(Into::into).collect())),
        );
        events.push(PanelEvent::Complete { message: None });

        let effects = mutate(&self.inner.panels.overview, |state| {
            events
                .into_iter()
                .flat_map(|event| state.apply(event))
                .collect::<Vec<_>>()
        });
        self.perform(effects, None);
        Ok(failed)
    }

    // ── Event handling ───────────────────────────────────────────

    fn notify(&self, notification: Notification) {
        trace!(title = %notification.title, "notification");
        let _ = self.inner.notify_tx.send(notification);
    }

    /// Carry out reducer effects after state has been published.
    fn perform(&self, effects: Vec<Effect>, channel: Option<&PushChannel>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => self.notify(notification),
                Effect::Emit(emit) => match channel {
                    Some(channel) => {
                        if let Err(e) = channel.emit(emit.event, &emit.payload) {
                            warn!(event = emit.event, error = %e, "follow-up emit failed");
                        }
                    }
                    None => debug!(event = emit.event, "no push channel for follow-up emit"),
                },
            }
        }
    }

    /// Apply one decoded event to its panel, if that panel is listening.
    fn dispatch(&self, inbound: Inbound) -> Vec<Effect> {
        if let Some(panel) = inbound.panel() {
            if !self.inner.manager.is_subscribed(panel) {
                trace!(%panel, "no subscribers, dropping event");
                return Vec::new();
            }
        }
        let panels = &self.inner.panels;
        match inbound {
            Inbound::Ports(event) => mutate(&panels.ports, |s| s.apply(event)),
            Inbound::Network(event) => mutate(&panels.network, |s| s.apply(event)),
            Inbound::Ftp(event) => mutate(&panels.ftp, |s| s.apply(event)),
            Inbound::FtpDirectory { path, files } => {
                mutate(&panels.ftp, |s| s.on_directory(path, files));
                Vec::new()
            }
            Inbound::FtpTransfer(progress) => {
                mutate(&panels.ftp, |s| s.on_transfer(progress));
                Vec::new()
            }
            Inbound::Mail(event) => mutate(&panels.mail, |s| s.apply(event)),
            Inbound::MailSummary(summary) => {
                mutate(&panels.mail, |s| s.on_summary(summary));
                Vec::new()
            }
            Inbound::MailContent(content) => mutate(&panels.mail, |s| s.on_content(content)),
            Inbound::Bandwidth(event) => mutate(&panels.bandwidth, |s| s.apply(event)),
            Inbound::Greeting(message) => {
                info!(%message, "backend greeting");
                Vec::new()
            }
        }
    }

    /// The push channel dropped: end every live session and operation.
    fn transport_lost(&self, reason: &str) {
        let panels = &self.inner.panels;
        mutate(&panels.ports, PortScanState::transport_lost);
        mutate(&panels.network, NetworkScanState::transport_lost);
        mutate(&panels.bandwidth, BandwidthState::transport_lost);
        mutate(&panels.ftp, FtpState::transport_lost);
        mutate(&panels.mail, MailState::transport_lost);
        mutate(&panels.overview, OverviewState::transport_lost);
        warn!(%reason, "push channel lost");
        self.notify(Notification::warning("Lost connection to backend", reason));
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Fold channel events into panel state, strictly in arrival order.
async fn event_processor_task(
    dashboard: Dashboard,
    mut rx: broadcast::Receiver<ChannelEvent>,
    channel: Arc<PushChannel>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = rx.recv() => {
                match result {
                    Ok(ChannelEvent::Event(raw)) => {
                        if let Some(inbound) = decode(&raw) {
                            let effects = dashboard.dispatch(inbound);
                            dashboard.perform(effects, Some(&channel));
                        }
                    }
                    Ok(ChannelEvent::Connected) => {
                        debug!("push channel (re)joined");
                        mutate(&dashboard.inner.panels.mail, MailState::channel_rejoined);
                    }
                    Ok(ChannelEvent::Disconnected { reason }) => dashboard.transport_lost(&reason),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "event processor lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Mirror the push channel's link state into `ConnectionState`.
async fn link_state_task(
    state_tx: watch::Sender<ConnectionState>,
    mut link: watch::Receiver<ChannelState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = link.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = ConnectionState::from(*link.borrow_and_update());
                debug!(%state, "link state");
                state_tx.send_replace(state);
            }
        }
    }
}

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(dashboard: Dashboard, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = dashboard.inner.cancel_child.lock().await.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&dashboard, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

fn emit_on(
    channel: &PushChannel,
    event: &'static str,
    payload: &impl serde::Serialize,
) -> Result<CommandResult, CoreError> {
    channel.emit(event, payload)?;
    Ok(CommandResult::Emitted(event))
}

/// Route a command: the owning panel accepts or refuses it, then exactly
/// one message goes out.
#[allow(clippy::too_many_lines)]
async fn route_command(dashboard: &Dashboard, cmd: Command) -> Result<CommandResult, CoreError> {
    let panels = &dashboard.inner.panels;
    debug!(?cmd, "routing command");

    if cmd.is_http() {
        return route_http(dashboard, cmd).await;
    }
    let channel = dashboard.channel().await?;

    match cmd {
        // ── Port scanner ─────────────────────────────────────────
        Command::StartPortScan {
            host,
            mut ports,
            scan_type,
        } => {
            ports.sort_unstable();
            ports.dedup();
            mutate(&panels.ports, |s| s.start(&host, &ports, scan_type))?;
            let payload = StartPortScan {
                host: host.trim().to_owned(),
                ports: join_ports(&ports),
                scan_type: scan_type.to_string(),
            };
            info!(host = %payload.host, ports = ports.len(), %scan_type, "starting port scan");
            emit_on(&channel, outbound::START_PORT_SCAN, &payload)
        }
        Command::StopPortScan => {
            mutate(&panels.ports, PortScanState::stop);
            emit_on(&channel, outbound::STOP_PORT_SCAN, &json!({}))
        }

        // ── Network scanner ──────────────────────────────────────
        Command::StartNetworkScan {
            ip_range,
            scan_type,
        } => {
            mutate(&panels.network, |s| s.start(&ip_range, scan_type))?;
            let payload = StartNetworkScan {
                ip_range: ip_range.trim().to_owned(),
                scan_type: scan_type.to_string(),
            };
            emit_on(&channel, outbound::START_NETWORK_SCAN, &payload)
        }
        Command::StopNetworkScan => {
            mutate(&panels.network, NetworkScanState::stop);
            emit_on(&channel, outbound::STOP_NETWORK_SCAN, &json!({}))
        }

        // ── FTP ──────────────────────────────────────────────────
        Command::FtpConnect {
            profile_id,
            password,
        } => {
            mutate(&panels.ftp, |s| s.begin_connect(&profile_id))?;
            info!(profile = %profile_id, "ftp connect requested");
            emit_on(&channel, outbound::FTP_CONNECT, &connect_payload(profile_id, password))
        }
        Command::FtpDisconnect => {
            mutate(&panels.ftp, FtpState::begin_disconnect);
            emit_on(&channel, outbound::FTP_DISCONNECT, &json!({}))
        }
        Command::FtpListDir { path } => {
            let path = mutate(&panels.ftp, |s| s.request_list(&path))?;
            emit_on(&channel, outbound::FTP_LIST_DIR, &wire::FtpListDir { path })
        }
        Command::FtpNavigate { name } => {
            let path = mutate(&panels.ftp, |s| s.navigate(&name))?;
            emit_on(&channel, outbound::FTP_LIST_DIR, &wire::FtpListDir { path })
        }

        // ── Mail ─────────────────────────────────────────────────
        Command::MailConnect {
            profile_id,
            password,
        } => {
            mutate(&panels.mail, |s| s.begin_connect(&profile_id))?;
            info!(profile = %profile_id, "mail connect requested");
            emit_on(&channel, outbound::MAIL_CONNECT, &connect_payload(profile_id, password))
        }
        Command::MailDisconnect => {
            mutate(&panels.mail, MailState::begin_disconnect);
            emit_on(&channel, outbound::MAIL_DISCONNECT, &json!({}))
        }
        Command::MailFetchInbox { page } => {
            let request = mutate(&panels.mail, |s| s.fetch_inbox(page))?;
            emit_on(&channel, outbound::MAIL_LIST_INBOX, &request.payload())
        }
        Command::MailGetContent { uid } => {
            let mailbox = mutate(&panels.mail, |s| s.request_content(&uid))?;
            let payload = MailGetEmailContent {
                uid: uid.to_string(),
                mailbox,
            };
            emit_on(&channel, outbound::MAIL_GET_EMAIL_CONTENT, &payload)
        }
        Command::MailSendTest {
            profile_id,
            recipient,
            subject,
            body,
            password,
        } => {
            let recipient = recipient.trim().to_owned();
            if recipient.is_empty() || !recipient.contains('@') {
                return Err(CoreError::validation(format!(
                    "invalid recipient address: {recipient}"
                )));
            }
            let connection_id = {
                let mail = panels.mail.borrow();
                match profile_id {
                    Some(id) if mail.profiles.contains_key(&id) => id,
                    Some(id) => return Err(CoreError::ProfileNotFound { id }),
                    None => mail.send_test_target()?,
                }
            };
            let payload = MailSendTest {
                connection_id,
                recipient_email: recipient,
                subject,
                body,
                password,
            };
            emit_on(&channel, outbound::MAIL_SEND_TEST, &payload)
        }

        // ── Bandwidth ────────────────────────────────────────────
        Command::StartBandwidth => {
            if !mutate(&panels.bandwidth, BandwidthState::start) {
                return Err(CoreError::AlreadyActive {
                    panel: PanelKind::Bandwidth,
                });
            }
            emit_on(&channel, outbound::START_BANDWIDTH_MONITOR, &json!({}))
        }
        Command::StopBandwidth => {
            mutate(&panels.bandwidth, BandwidthState::stop);
            emit_on(&channel, outbound::STOP_BANDWIDTH_MONITOR, &json!({}))
        }

        http @ (Command::AddMailProfile(_)
        | Command::DeleteMailProfile { .. }
        | Command::RefreshProfiles
        | Command::RefreshOverview) => route_http(dashboard, http).await,
    }
}

fn connect_payload(id: String, password: SecretString) -> ProfileConnect {
    ProfileConnect { id, password }
}

async fn route_http(dashboard: &Dashboard, cmd: Command) -> Result<CommandResult, CoreError> {
    let panels = &dashboard.inner.panels;
    match cmd {
        Command::AddMailProfile(profile) => {
            if profile.name.trim().is_empty() || profile.username.trim().is_empty() {
                return Err(CoreError::validation("profile name and username are required"));
            }
            let client = dashboard.client().await?;
            let request = NewMailConnection::from(profile);
            let created = match client.add_mail_profile(&request).await {
                Ok(dto) => MailProfile::from(dto),
                Err(e) => {
                    let e = CoreError::from(e);
                    dashboard.notify(Notification::error("Add mail profile", e.to_string()));
                    return Err(e);
                }
            };
            mutate(&panels.mail, |s| s.upsert_profile(created.clone()));
            dashboard.notify(Notification::success(
                "Mail profile added",
                format!("{} is ready to connect", created.name),
            ));
            Ok(CommandResult::MailProfile(created))
        }
        Command::DeleteMailProfile { id } => {
            let client = dashboard.client().await?;
            let message = match client.delete_mail_profile(&id).await {
                Ok(message) => message,
                Err(e) => {
                    let e = if e.is_not_found() {
                        CoreError::ProfileNotFound { id }
                    } else {
                        CoreError::from(e)
                    };
                    dashboard.notify(Notification::error("Delete mail profile", e.to_string()));
                    return Err(e);
                }
            };
            mutate(&panels.mail, |s| s.remove_profile(&id));
            dashboard.notify(Notification::success("Mail profile deleted", message.clone()));
            Ok(CommandResult::Message(message))
        }
        Command::RefreshProfiles => {
            let (ftp, mail) = dashboard.refresh_profiles().await?;
            Ok(CommandResult::Profiles { ftp, mail })
        }
        Command::RefreshOverview => {
            let failed = dashboard.refresh_overview().await?;
            Ok(CommandResult::Overview { failed })
        }
        other => Err(CoreError::Internal(format!("not an HTTP command: {other:?}"))),
    }
}
