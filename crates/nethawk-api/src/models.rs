//! HTTP request and response bodies exchanged with the backend.
//!
//! Field names follow the backend's JSON exactly. Domain conversion
//! happens in `nethawk-core`.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── FTP profiles ─────────────────────────────────────────────────────

/// Protocol tag on an FTP connection profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FtpProtocol {
    Ftp,
    Ftps,
    Sftp,
}

/// `GET /ftp/connections` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConnectionDto {
    pub id: String,
    pub name: String,
    pub host: String,
    #[serde(deserialize_with = "de_port")]
    pub port: u16,
    pub username: String,
    pub protocol: FtpProtocol,
}

// ── Mail profiles ────────────────────────────────────────────────────

/// `GET /api/mail/connections` element. The backend never returns passwords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConnectionDto {
    pub id: String,
    pub name: String,
    pub imap_host: String,
    #[serde(deserialize_with = "de_port")]
    pub imap_port: u16,
    pub smtp_host: String,
    #[serde(deserialize_with = "de_port")]
    pub smtp_port: u16,
    pub username: String,
}

/// Body for `POST /api/mail/add_connection`.
#[derive(Debug, Clone, Serialize)]
pub struct NewMailConnection {
    pub name: String,
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    #[serde(serialize_with = "ser_secret")]
    pub password: SecretString,
}

/// `{success, message, connection?}` acknowledgement used by the mail routes.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub connection: Option<T>,
}

// ── Overview ─────────────────────────────────────────────────────────

/// `GET /api/overview/stats`: utilisation percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub network: f64,
}

/// `GET /api/overview/traffic` element (MB totals at a wall-clock minute).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPoint {
    pub time: String,
    pub upload: f64,
    pub download: f64,
}

/// `GET /api/overview/devices` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceShare {
    pub name: String,
    pub value: u64,
    pub color: String,
}

/// `GET /api/overview/activity` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub time: String,
    pub status: String,
}

// ── Error bodies ─────────────────────────────────────────────────────

/// Error body shapes the backend uses: `{message}` or `{error}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

// ── Serde helpers ────────────────────────────────────────────────────

/// Ports arrive as numbers from config-backed profiles and as strings
/// from form-created ones.
fn de_port<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Num(u16),
        Text(String),
    }

    match PortRepr::deserialize(deserializer)? {
        PortRepr::Num(n) => Ok(n),
        PortRepr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub(crate) fn ser_secret<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.expose_secret())
}
