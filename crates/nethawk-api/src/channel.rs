//! Socket.IO push channel with auto-reconnect.
//!
//! Connects to the backend's Socket.IO endpoint over a raw WebSocket and
//! streams inbound events through a [`tokio::sync::broadcast`] channel in
//! arrival order. Outbound commands are queued on an mpsc and written by
//! the same background task, so one task owns the socket for its whole
//! life. Handles reconnection with exponential backoff + jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use nethawk_api::{ChannelEvent, PushChannel, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let base = Url::parse("http://localhost:5000")?;
//! let channel = PushChannel::connect(&base, ReconnectConfig::default(), CancellationToken::new())?;
//! let mut rx = channel.subscribe();
//!
//! channel.emit("start_bandwidth_monitor", &())?;
//! while let Ok(ChannelEvent::Event(evt)) = rx.recv().await {
//!     println!("{}: {}", evt.name, evt.payload);
//! }
//!
//! channel.shutdown();
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::socketio::{self, EnginePacket, SocketPacket};

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Liveness window used until the server handshake tells us its own.
const DEFAULT_LIVENESS: Duration = Duration::from_secs(45);

// ── Events & state ───────────────────────────────────────────────────

/// A named Socket.IO event with its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub name: String,
    pub payload: Value,
}

/// Everything the channel reports to subscribers, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The default namespace was joined (fresh connect or reconnect).
    Connected,
    /// A previously joined session dropped.
    Disconnected { reason: String },
    Event(RawEvent),
}

/// Link state of the channel, observable through a `watch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
    },
    Failed,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for channel reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── PushChannel ──────────────────────────────────────────────────────

/// Handle to a running push channel.
///
/// Owned by whoever constructs it and injected into the consumers that
/// need it. Call [`shutdown`](Self::shutdown) (or cancel the token passed
/// to [`connect`](Self::connect)) to tear down the background task.
pub struct PushChannel {
    event_tx: broadcast::Sender<ChannelEvent>,
    outbound_tx: mpsc::UnboundedSender<String>,
    state_rx: watch::Receiver<ChannelState>,
    cancel: CancellationToken,
}

impl PushChannel {
    /// Spawn the connection loop against `base_url`'s Socket.IO endpoint.
    ///
    /// Returns immediately once the background task is spawned. The first
    /// connection attempt happens asynchronously; watch [`state`](Self::state)
    /// or wait for [`ChannelEvent::Connected`] before emitting.
    pub fn connect(
        base_url: &Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let ws_url = socketio::socket_url(base_url)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);

        let task_events = event_tx.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(
                ws_url,
                task_events,
                outbound_rx,
                state_tx,
                reconnect,
                task_cancel,
            )
            .await;
        });

        Ok(Self {
            event_tx,
            outbound_tx,
            state_rx,
            cancel,
        })
    }

    /// Get a new receiver for the inbound event stream.
    ///
    /// Multiple consumers can subscribe concurrently. If a consumer falls
    /// behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.event_tx.subscribe()
    }

    /// Observe the link state.
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.state_rx.borrow() == ChannelState::Connected
    }

    /// Queue an outbound event.
    ///
    /// Never blocks. While the link is down the event is dropped with a
    /// warning; the drop itself is reported to subscribers as
    /// [`ChannelEvent::Disconnected`], not through this return value.
    /// Only payload encoding failures are errors.
    pub fn emit(&self, name: &str, payload: &impl Serialize) -> Result<(), Error> {
        let frame = socketio::encode_event(name, payload)?;

        if !self.is_connected() {
            tracing::warn!(event = name, "push channel not connected, dropping command");
            return Ok(());
        }

        tracing::debug!(event = name, "emitting");
        if self.outbound_tx.send(frame).is_err() {
            tracing::warn!(event = name, "push channel task has exited, dropping command");
        }
        Ok(())
    }

    /// Signal the background task to leave the namespace and shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn ws_loop(
    ws_url: Url,
    event_tx: broadcast::Sender<ChannelEvent>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    state_tx: watch::Sender<ChannelState>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        // Commands queued for a previous session must not leak into a new one.
        let mut stale = 0_usize;
        while outbound_rx.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            tracing::debug!(stale, "discarded commands queued before reconnect");
        }

        let mut joined = false;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &event_tx, &mut outbound_rx, &state_tx, &cancel, &mut joined) => result,
        };

        if joined {
            let reason = match &result {
                Ok(()) => "server closed the connection".to_owned(),
                Err(e) => e.to_string(),
            };
            let _ = event_tx.send(ChannelEvent::Disconnected { reason });
            attempt = 0;
        }

        if cancel.is_cancelled() {
            break;
        }

        match result {
            // Clean disconnect (server close frame or stream ended).
            // Reconnect immediately.
            Ok(()) => {
                tracing::info!("push channel disconnected cleanly, reconnecting");
                state_tx.send_replace(ChannelState::Reconnecting { attempt: 0 });
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "push channel error");

                if let Some(max) = reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(
                            max_retries = max,
                            "push channel reconnection limit reached, giving up"
                        );
                        state_tx.send_replace(ChannelState::Failed);
                        return;
                    }
                }

                attempt += 1;
                state_tx.send_replace(ChannelState::Reconnecting { attempt });

                let delay = calculate_backoff(attempt - 1, &reconnect);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    state_tx.send_replace(ChannelState::Disconnected);
    tracing::debug!("push channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single WebSocket connection, run the Engine.IO session,
/// and pump frames until it drops. Sets `joined` once the namespace
/// acknowledgement arrives.
async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<ChannelEvent>,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    state_tx: &watch::Sender<ChannelState>,
    cancel: &CancellationToken,
    joined: &mut bool,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to push channel");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::debug!("WebSocket open, awaiting Engine.IO handshake");

    let (mut write, mut read) = ws_stream.split();
    let mut liveness = DEFAULT_LIVENESS;
    let mut deadline = Instant::now() + liveness;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(tungstenite::Message::Text(socketio::DISCONNECT.into())).await;
                let _ = write.close().await;
                return Ok(());
            }
            () = tokio::time::sleep_until(deadline) => {
                return Err(Error::Protocol(format!(
                    "no ping from server within {}ms",
                    liveness.as_millis()
                )));
            }
            Some(frame) = outbound_rx.recv(), if *joined => {
                write
                    .send(tungstenite::Message::Text(frame.into()))
                    .await
                    .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        let reply = match socketio::decode(&text) {
                            Ok(packet) => handle_packet(packet, event_tx, state_tx, joined, &mut liveness)?,
                            Err(e) => {
                                tracing::debug!(error = %e, "skipping undecodable frame");
                                None
                            }
                        };
                        deadline = Instant::now() + liveness;
                        if let Some(reply) = reply {
                            write
                                .send(tungstenite::Message::Text(reply.into()))
                                .await
                                .map_err(|e| Error::WebSocketConnect(e.to_string()))?;
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "WebSocket close frame received"
                            );
                            if *joined && cf.code != tungstenite::protocol::frame::coding::CloseCode::Normal {
                                return Err(Error::WebSocketClosed {
                                    code: cf.code.into(),
                                    reason: cf.reason.as_str().to_owned(),
                                });
                            }
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("WebSocket stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Ping, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

/// Apply one decoded packet. Returns a frame to send back, if any.
fn handle_packet(
    packet: EnginePacket,
    event_tx: &broadcast::Sender<ChannelEvent>,
    state_tx: &watch::Sender<ChannelState>,
    joined: &mut bool,
    liveness: &mut Duration,
) -> Result<Option<String>, Error> {
    match packet {
        EnginePacket::Open(handshake) => {
            tracing::debug!(sid = %handshake.sid, "Engine.IO session open");
            *liveness = handshake.liveness_window();
            Ok(Some(socketio::CONNECT.to_owned()))
        }
        EnginePacket::Ping => Ok(Some(socketio::PONG.to_owned())),
        EnginePacket::Pong | EnginePacket::Noop => Ok(None),
        EnginePacket::Close => Err(Error::WebSocketClosed {
            code: 1000,
            reason: "Engine.IO close packet".into(),
        }),
        EnginePacket::Message(SocketPacket::Connect(_)) => {
            tracing::info!("push channel connected");
            *joined = true;
            state_tx.send_replace(ChannelState::Connected);
            let _ = event_tx.send(ChannelEvent::Connected);
            Ok(None)
        }
        EnginePacket::Message(SocketPacket::Disconnect) => Err(Error::WebSocketClosed {
            code: 1000,
            reason: "server left the namespace".into(),
        }),
        EnginePacket::Message(SocketPacket::ConnectError(detail)) => Err(Error::Protocol(
            format!("namespace connection refused: {detail}"),
        )),
        EnginePacket::Message(SocketPacket::Event { name, payload }) => {
            tracing::trace!(event = %name, "inbound event");
            // Ignore send errors -- just means no active subscribers right now
            let _ = event_tx.send(ChannelEvent::Event(RawEvent { name, payload }));
            Ok(None)
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% to spread out reconnection storms from multiple clients.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixtures() -> (
        broadcast::Sender<ChannelEvent>,
        broadcast::Receiver<ChannelEvent>,
        watch::Sender<ChannelState>,
    ) {
        let (tx, rx) = broadcast::channel(16);
        let (state_tx, _) = watch::channel(ChannelState::Connecting);
        (tx, rx, state_tx)
    }

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = calculate_backoff(10, &config);
        assert!(
            d10 <= Duration::from_secs(13),
            "delay at attempt 10 ({d10:?}) should be capped near max_delay"
        );
        // Huge attempt numbers must not overflow the exponent.
        assert!(calculate_backoff(u32::MAX, &config) <= Duration::from_secs(13));
    }

    #[test]
    fn open_packet_requests_namespace() {
        let (tx, _rx, state_tx) = fixtures();
        let mut joined = false;
        let mut liveness = DEFAULT_LIVENESS;

        let packet = socketio::decode(r#"0{"sid":"s1","pingInterval":1000,"pingTimeout":500}"#)
            .unwrap();
        let reply = handle_packet(packet, &tx, &state_tx, &mut joined, &mut liveness).unwrap();

        assert_eq!(reply.as_deref(), Some("40"));
        assert_eq!(liveness, Duration::from_millis(1500));
        assert!(!joined);
    }

    #[test]
    fn namespace_ack_marks_connected() {
        let (tx, mut rx, state_tx) = fixtures();
        let state_rx = state_tx.subscribe();
        let mut joined = false;
        let mut liveness = DEFAULT_LIVENESS;

        let packet = socketio::decode(r#"40{"sid":"n1"}"#).unwrap();
        handle_packet(packet, &tx, &state_tx, &mut joined, &mut liveness).unwrap();

        assert!(joined);
        assert_eq!(*state_rx.borrow(), ChannelState::Connected);
        assert_eq!(rx.try_recv().unwrap(), ChannelEvent::Connected);
    }

    #[test]
    fn ping_is_answered_with_pong() {
        let (tx, _rx, state_tx) = fixtures();
        let mut joined = true;
        let mut liveness = DEFAULT_LIVENESS;

        let reply =
            handle_packet(EnginePacket::Ping, &tx, &state_tx, &mut joined, &mut liveness).unwrap();
        assert_eq!(reply.as_deref(), Some("3"));
    }

    #[test]
    fn events_are_broadcast_in_order() {
        let (tx, mut rx, state_tx) = fixtures();
        let mut joined = true;
        let mut liveness = DEFAULT_LIVENESS;

        for frame in [
            r#"42["ftp_status",{"status":"info","message":"a"}]"#,
            r#"42["ftp_status",{"status":"success","message":"b","is_connected":true}]"#,
        ] {
            let packet = socketio::decode(frame).unwrap();
            handle_packet(packet, &tx, &state_tx, &mut joined, &mut liveness).unwrap();
        }

        let ChannelEvent::Event(first) = rx.try_recv().unwrap() else {
            panic!("expected event");
        };
        let ChannelEvent::Event(second) = rx.try_recv().unwrap() else {
            panic!("expected event");
        };
        assert_eq!(first.payload["message"], json!("a"));
        assert_eq!(second.payload["message"], json!("b"));
    }

    #[test]
    fn connect_error_is_fatal_for_session() {
        let (tx, _rx, state_tx) = fixtures();
        let mut joined = false;
        let mut liveness = DEFAULT_LIVENESS;

        let packet = socketio::decode(r#"44{"message":"Not authorized"}"#).unwrap();
        let result = handle_packet(packet, &tx, &state_tx, &mut joined, &mut liveness);
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn emit_while_disconnected_is_dropped() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let cancel = CancellationToken::new();
        let channel = PushChannel::connect(&base, ReconnectConfig::default(), cancel.clone()).unwrap();

        assert!(!channel.is_connected());
        channel.emit("stop_port_scan", &()).unwrap();
        channel.shutdown();
        assert!(cancel.is_cancelled());
    }
}
