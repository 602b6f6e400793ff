//! Push-channel event names and payloads.
//!
//! Inbound payloads mirror what the backend emits, field for field.
//! Unrecognised status strings land in an `Unknown` variant instead of
//! failing the whole frame, since the backend adds statuses freely.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::models::ser_secret;

// ── Event names ──────────────────────────────────────────────────────

/// Inbound event names (backend → client).
pub mod inbound {
    pub const SCAN_UPDATE: &str = "scan_update";
    pub const NETWORK_SCAN_UPDATE: &str = "network_scan_update";
    pub const FTP_STATUS: &str = "ftp_status";
    pub const FTP_DIR_LISTING: &str = "ftp_dir_listing";
    pub const FTP_TRANSFER_PROGRESS: &str = "ftp_transfer_progress";
    pub const MAIL_STATUS: &str = "mail_status";
    pub const MAIL_INBOX_SUMMARY: &str = "mail_inbox_summary";
    pub const MAIL_INBOX_LISTING: &str = "mail_inbox_listing";
    pub const MAIL_EMAIL_CONTENT: &str = "mail_email_content";
    pub const BANDWIDTH_UPDATE: &str = "bandwidth_update";
    pub const BANDWIDTH_STATUS: &str = "bandwidth_status";
    pub const SERVER_GREETING: &str = "my_response";
}

/// Outbound command names (client → backend).
pub mod outbound {
    pub const START_PORT_SCAN: &str = "start_port_scan";
    pub const STOP_PORT_SCAN: &str = "stop_port_scan";
    pub const START_NETWORK_SCAN: &str = "start_network_scan";
    pub const STOP_NETWORK_SCAN: &str = "stop_network_scan";
    pub const FTP_CONNECT: &str = "ftp_connect";
    pub const FTP_DISCONNECT: &str = "ftp_disconnect";
    pub const FTP_LIST_DIR: &str = "ftp_list_dir";
    pub const MAIL_CONNECT: &str = "mail_connect";
    pub const MAIL_DISCONNECT: &str = "mail_disconnect";
    pub const MAIL_LIST_INBOX: &str = "mail_list_inbox";
    pub const MAIL_GET_EMAIL_CONTENT: &str = "mail_get_email_content";
    pub const MAIL_SEND_TEST: &str = "mail_send_test";
    pub const START_BANDWIDTH_MONITOR: &str = "start_bandwidth_monitor";
    pub const STOP_BANDWIDTH_MONITOR: &str = "stop_bandwidth_monitor";
}

// ── Scans ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Info,
    Progress,
    OpenPort,
    PortStatus,
    Device,
    Complete,
    Stopped,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    #[serde(other)]
    Unknown,
}

/// `scan_update`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanUpdate {
    pub status: ScanStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub state: Option<PortState>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// A discovered host, carried by `network_scan_update` with `status: device`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDto {
    pub ip: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub open_ports: Option<Vec<u16>>,
    #[serde(default)]
    pub vulnerability: Option<String>,
}

/// `network_scan_update`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkScanUpdate {
    pub status: ScanStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub device: Option<DeviceDto>,
}

// ── FTP ──────────────────────────────────────────────────────────────

/// `ftp_status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_connected: Option<bool>,
    #[serde(default)]
    pub current_host: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FtpFileKind {
    File,
    Directory,
    Symlink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpFileDto {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FtpFileKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub permissions: String,
    #[serde(default)]
    pub owner: String,
}

/// `ftp_dir_listing`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpDirListing {
    pub path: String,
    #[serde(default)]
    pub files: Vec<FtpFileDto>,
}

/// `ftp_transfer_progress`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtpTransferProgress {
    #[serde(rename = "type")]
    pub direction: String,
    pub file_name: String,
    #[serde(default)]
    pub progress: f64,
    pub status: String,
    #[serde(default)]
    pub total_size: Option<u64>,
    #[serde(default)]
    pub transferred_size: Option<u64>,
}

// ── Mail ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailStatusKind {
    Connected,
    Disconnected,
    Error,
    Success,
    Info,
    #[serde(other)]
    Unknown,
}

/// `mail_status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailStatus {
    pub status: MailStatusKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub current_mail_config_id: Option<String>,
}

/// `mail_inbox_summary`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailInboxSummary {
    pub unread_count: u64,
    pub total_messages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessageDto {
    pub uid: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub message_id: String,
}

/// `mail_inbox_listing`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailInboxListing {
    pub mailbox: String,
    #[serde(default)]
    pub emails: Vec<MailMessageDto>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentDto {
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}

/// `mail_email_content`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailEmailContent {
    pub uid: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub cc: String,
    #[serde(default)]
    pub bcc: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub plain_text_body: String,
    #[serde(default)]
    pub html_body: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentDto>,
}

// ── Bandwidth ────────────────────────────────────────────────────────

/// `bandwidth_update`: Mbps for upload/download, ms for ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandwidthUpdate {
    pub timestamp: String,
    pub upload: f64,
    pub download: f64,
    #[serde(default)]
    pub ping: f64,
}

/// `bandwidth_status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandwidthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

// ── Outbound payloads ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPortScan {
    pub host: String,
    /// Comma-separated, already expanded and sorted.
    pub ports: String,
    pub scan_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNetworkScan {
    pub ip_range: String,
    pub scan_type: String,
}

/// Payload for `ftp_connect` and `mail_connect`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileConnect {
    pub id: String,
    #[serde(serialize_with = "ser_secret")]
    pub password: SecretString,
}

#[derive(Debug, Clone, Serialize)]
pub struct FtpListDir {
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailListInbox {
    pub mailbox: String,
    pub criteria: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailGetEmailContent {
    pub uid: String,
    pub mailbox: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailSendTest {
    pub connection_id: String,
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    #[serde(serialize_with = "ser_secret")]
    pub password: SecretString,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_update_open_port() {
        let json = r#"{"status":"open_port","port":22,"service":"ssh","state":"open",
                       "ip":"10.0.0.5","details":"ssh (OpenSSH 9.6)"}"#;
        let update: ScanUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.status, ScanStatus::OpenPort);
        assert_eq!(update.port, Some(22));
        assert_eq!(update.state, Some(PortState::Open));
        assert_eq!(update.details.as_deref(), Some("ssh (OpenSSH 9.6)"));
    }

    #[test]
    fn unknown_statuses_do_not_fail() {
        let update: ScanUpdate = serde_json::from_str(r#"{"status":"warming_up"}"#).unwrap();
        assert_eq!(update.status, ScanStatus::Unknown);

        let status: MailStatus =
            serde_json::from_str(r#"{"status":"rebooting","message":"x"}"#).unwrap();
        assert_eq!(status.status, MailStatusKind::Unknown);
    }

    #[test]
    fn inbox_listing_camel_case() {
        let json = r#"{"mailbox":"INBOX","totalCount":42,
                       "emails":[{"uid":"17","subject":"hi","from":"a@b","date":"d","message_id":"<m>"}]}"#;
        let listing: MailInboxListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.total_count, 42);
        assert_eq!(listing.emails[0].uid, "17");
    }

    #[test]
    fn start_port_scan_wire_shape() {
        let payload = StartPortScan {
            host: "127.0.0.1".into(),
            ports: "22,80,443".into(),
            scan_type: "tcp-connect".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"host":"127.0.0.1","ports":"22,80,443","scanType":"tcp-connect"})
        );
    }

    #[test]
    fn transfer_progress_field_names() {
        let json = r#"{"type":"upload","fileName":"a.bin","progress":40.5,"status":"transferring",
                       "totalSize":1000,"transferredSize":405}"#;
        let p: FtpTransferProgress = serde_json::from_str(json).unwrap();
        assert_eq!(p.direction, "upload");
        assert_eq!(p.file_name, "a.bin");
        assert_eq!(p.transferred_size, Some(405));
    }
}
