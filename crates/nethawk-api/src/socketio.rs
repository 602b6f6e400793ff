//! Engine.IO v4 / Socket.IO v5 text-frame codec.
//!
//! Only the subset the backend uses over a raw WebSocket transport:
//! default namespace, text payloads, no acknowledgements, no binary
//! attachments. Each WebSocket text frame holds exactly one Engine.IO
//! packet; message packets (`4`) wrap one Socket.IO packet.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::Error;

/// Engine.IO handshake payload sent by the server in the open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
}

impl Handshake {
    /// How long without a server ping before the link is considered dead.
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

// ── Packets ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect (client → server) or its acknowledgement.
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(Value),
}

// ── Encoding ─────────────────────────────────────────────────────────

/// Client request to join the default namespace.
pub const CONNECT: &str = "40";
/// Client leaving the default namespace.
pub const DISCONNECT: &str = "41";
/// Reply to a server ping.
pub const PONG: &str = "3";

/// Encode an event as `42["name",payload]`.
///
/// Unit payloads (`null`) are sent as a one-element array so handlers
/// registered without arguments still match.
pub fn encode_event(name: &str, payload: &impl Serialize) -> Result<String, Error> {
    let payload = serde_json::to_value(payload)
        .map_err(|e| Error::Protocol(format!("cannot encode `{name}` payload: {e}")))?;
    let array = if payload.is_null() {
        Value::Array(vec![Value::String(name.to_owned())])
    } else {
        Value::Array(vec![Value::String(name.to_owned()), payload])
    };
    Ok(format!("42{array}"))
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Decode one Engine.IO text frame.
pub fn decode(frame: &str) -> Result<EnginePacket, Error> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty frame".into()))?;
    let rest = chars.as_str();

    match kind {
        '0' => serde_json::from_str(rest)
            .map(EnginePacket::Open)
            .map_err(|e| Error::Protocol(format!("bad handshake: {e}"))),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping),
        '3' => Ok(EnginePacket::Pong),
        '4' => decode_socket(rest).map(EnginePacket::Message),
        '6' => Ok(EnginePacket::Noop),
        other => Err(Error::Protocol(format!("unknown engine packet type `{other}`"))),
    }
}

fn decode_socket(packet: &str) -> Result<SocketPacket, Error> {
    let mut chars = packet.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty socket packet".into()))?;
    let body = strip_ack_id(strip_namespace(chars.as_str()));

    match kind {
        '0' => {
            if body.is_empty() {
                Ok(SocketPacket::Connect(None))
            } else {
                serde_json::from_str(body)
                    .map(|v| SocketPacket::Connect(Some(v)))
                    .map_err(|e| Error::Protocol(format!("bad connect payload: {e}")))
            }
        }
        '1' => Ok(SocketPacket::Disconnect),
        '2' => decode_event(body),
        '4' => Ok(SocketPacket::ConnectError(
            serde_json::from_str(body).unwrap_or(Value::String(body.to_owned())),
        )),
        other => Err(Error::Protocol(format!("unsupported socket packet type `{other}`"))),
    }
}

fn decode_event(body: &str) -> Result<SocketPacket, Error> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::Protocol(format!("bad event payload: {e}")))?;
    let Value::Array(mut items) = value else {
        return Err(Error::Protocol("event payload is not an array".into()));
    };
    if items.is_empty() {
        return Err(Error::Protocol("event payload is empty".into()));
    }
    let Value::String(name) = items.remove(0) else {
        return Err(Error::Protocol("event name is not a string".into()));
    };
    let payload = if items.is_empty() {
        Value::Null
    } else {
        items.remove(0)
    };
    Ok(SocketPacket::Event { name, payload })
}

/// Namespaced packets look like `/admin,["evt",...]`.
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    }
}

/// Events expecting an ack carry a numeric id before the JSON.
fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

// ── URL ──────────────────────────────────────────────────────────────

/// Derive the WebSocket transport URL from the backend base URL:
/// `http://host:5000` → `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn socket_url(base: &Url) -> Result<Url, Error> {
    let mut url = base.clone();
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::WebSocketConnect(format!(
                "unsupported backend URL scheme `{other}`"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::WebSocketConnect(format!("cannot use scheme `{scheme}`")))?;

    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}/socket.io/"));
    url.set_query(Some("EIO=4&transport=websocket"));
    url.set_fragment(None);
    Ok(url)
}
