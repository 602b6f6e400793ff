// ── Wire event decoding ──
//
// Maps each named push-channel event onto the unified `PanelEvent`
// taxonomy for the panel that owns it. Unknown names and statuses are
// logged at debug and dropped.

use serde::de::DeserializeOwned;
use tracing::debug;

use nethawk_api::RawEvent;
use nethawk_api::events::{
    BandwidthStatus, BandwidthUpdate, FtpDirListing, FtpStatus, FtpTransferProgress,
    MailEmailContent, MailInboxListing, MailInboxSummary, MailStatus, MailStatusKind,
    NetworkScanUpdate, PortState, ScanStatus, ScanUpdate, inbound,
};

use super::{PanelEvent, SessionStatus};
use crate::model::{
    BandwidthSample, Device, EmailContent, FileEntry, InboxSummary, MailMessage, PortResult,
    PortStatus, TransferProgress,
};
use crate::panel::PanelKind;
use crate::util::port_details;

/// A decoded inbound event, routed to its panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Ports(PanelEvent<PortResult>),
    Network(PanelEvent<Device>),
    Ftp(PanelEvent<FileEntry>),
    /// Directory listing; the path travels with the files.
    FtpDirectory {
        path: String,
        files: Vec<FileEntry>,
    },
    FtpTransfer(TransferProgress),
    Mail(PanelEvent<MailMessage>),
    MailSummary(InboxSummary),
    MailContent(EmailContent),
    Bandwidth(PanelEvent<BandwidthSample>),
    /// Welcome message sent after the namespace join.
    Greeting(String),
}

impl Inbound {
    /// Panel whose subscription gates this event. `None` for
    /// channel-level events every consumer sees.
    pub fn panel(&self) -> Option<PanelKind> {
        match self {
            Self::Ports(_) => Some(PanelKind::Ports),
            Self::Network(_) => Some(PanelKind::Network),
            Self::Ftp(_) | Self::FtpDirectory { .. } | Self::FtpTransfer(_) => Some(PanelKind::Ftp),
            Self::Mail(_) | Self::MailSummary(_) | Self::MailContent(_) => Some(PanelKind::Mail),
            Self::Bandwidth(_) => Some(PanelKind::Bandwidth),
            Self::Greeting(_) => None,
        }
    }
}

fn parse<T: DeserializeOwned>(event: &RawEvent) -> Option<T> {
    match serde_json::from_value(event.payload.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(event = %event.name, error = %e, "malformed payload, ignoring");
            None
        }
    }
}

/// Decode one raw channel event. Returns `None` for anything the
/// dashboard does not handle.
pub fn decode(event: &RawEvent) -> Option<Inbound> {
    match event.name.as_str() {
        inbound::SCAN_UPDATE => parse::<ScanUpdate>(event)
            .and_then(decode_scan_update)
            .map(Inbound::Ports),
        inbound::NETWORK_SCAN_UPDATE => parse::<NetworkScanUpdate>(event)
            .and_then(decode_network_update)
            .map(Inbound::Network),
        inbound::FTP_STATUS => parse::<FtpStatus>(event).map(|s| Inbound::Ftp(decode_ftp_status(s))),
        inbound::FTP_DIR_LISTING => parse::<FtpDirListing>(event).map(|l| Inbound::FtpDirectory {
            path: l.path,
            files: l.files.into_iter().map(FileEntry::from).collect(),
        }),
        inbound::FTP_TRANSFER_PROGRESS => parse::<FtpTransferProgress>(event)
            .map(|p| Inbound::FtpTransfer(TransferProgress::from(p))),
        inbound::MAIL_STATUS => parse::<MailStatus>(event)
            .and_then(decode_mail_status)
            .map(Inbound::Mail),
        inbound::MAIL_INBOX_LISTING => parse::<MailInboxListing>(event).map(|l| {
            let items: Vec<MailMessage> = l.emails.into_iter().map(MailMessage::from).collect();
            let total = usize::try_from(l.total_count).unwrap_or(usize::MAX);
            Inbound::Mail(PanelEvent::Listing { items, total })
        }),
        inbound::MAIL_INBOX_SUMMARY => {
            parse::<MailInboxSummary>(event).map(|s| Inbound::MailSummary(s.into()))
        }
        inbound::MAIL_EMAIL_CONTENT => {
            parse::<MailEmailContent>(event).map(|c| Inbound::MailContent(c.into()))
        }
        inbound::BANDWIDTH_UPDATE => parse::<BandwidthUpdate>(event)
            .map(|u| Inbound::Bandwidth(PanelEvent::Item(BandwidthSample::from(u)))),
        inbound::BANDWIDTH_STATUS => {
            parse::<BandwidthStatus>(event).map(|s| Inbound::Bandwidth(decode_bandwidth_status(s)))
        }
        inbound::SERVER_GREETING => Some(Inbound::Greeting(
            event
                .payload
                .get("data")
                .and_then(|d| d.as_str())
                .unwrap_or("Connected to backend")
                .to_owned(),
        )),
        other => {
            debug!(event = other, "unhandled push event");
            None
        }
    }
}

// ── Per-event mappings ───────────────────────────────────────────────

fn port_status(state: PortState) -> PortStatus {
    match state {
        PortState::Open => PortStatus::Open,
        PortState::Closed => PortStatus::Closed,
        PortState::Filtered => PortStatus::Filtered,
        PortState::Unknown => PortStatus::Unknown,
    }
}

fn decode_scan_update(update: ScanUpdate) -> Option<PanelEvent<PortResult>> {
    match update.status {
        ScanStatus::Info => Some(PanelEvent::Notice {
            message: update.message.unwrap_or_default(),
            target: update.ip,
        }),
        ScanStatus::Progress => update.progress.map(PanelEvent::Progress),
        ScanStatus::OpenPort | ScanStatus::PortStatus => {
            let number = update.port?;
            let status = match (update.state, update.status) {
                (Some(state), _) => port_status(state),
                (None, ScanStatus::OpenPort) => PortStatus::Open,
                (None, _) => return None,
            };
            let (service, description) = port_details(number);
            Some(PanelEvent::Item(PortResult {
                number,
                status,
                protocol: "TCP".into(),
                service: update
                    .service
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| service.to_owned()),
                description: description.to_owned(),
                details: update.details,
            }))
        }
        ScanStatus::Complete => Some(PanelEvent::Complete {
            message: update.message,
        }),
        ScanStatus::Stopped => Some(PanelEvent::Stopped {
            message: update.message,
        }),
        ScanStatus::Error => Some(PanelEvent::Error {
            message: update.message.unwrap_or_else(|| "Scan failed".into()),
            target: update.ip,
        }),
        ScanStatus::Device | ScanStatus::Unknown => {
            debug!(status = ?update.status, "unhandled scan_update status");
            None
        }
    }
}

fn decode_network_update(update: NetworkScanUpdate) -> Option<PanelEvent<Device>> {
    match update.status {
        ScanStatus::Info => Some(PanelEvent::Notice {
            message: update.message.unwrap_or_default(),
            target: None,
        }),
        ScanStatus::Progress => update.progress.map(PanelEvent::Progress),
        ScanStatus::Device | ScanStatus::OpenPort | ScanStatus::PortStatus => {
            let dto = update.device?;
            match Device::try_from(dto) {
                Ok(device) => Some(PanelEvent::Item(device)),
                Err(e) => {
                    debug!(error = %e, "device with unparseable address, ignoring");
                    None
                }
            }
        }
        ScanStatus::Complete => Some(PanelEvent::Complete {
            message: update.message,
        }),
        ScanStatus::Stopped => Some(PanelEvent::Stopped {
            message: update.message,
        }),
        ScanStatus::Error => Some(PanelEvent::Error {
            message: update.message.unwrap_or_else(|| "Network scan failed".into()),
            target: None,
        }),
        ScanStatus::Unknown => None,
    }
}

fn decode_ftp_status(status: FtpStatus) -> PanelEvent<FileEntry> {
    if status.status.eq_ignore_ascii_case("error") {
        return PanelEvent::Error {
            message: status.message,
            target: status.current_host,
        };
    }
    let message = Some(status.message).filter(|m| !m.is_empty());
    match status.is_connected {
        Some(true) => PanelEvent::Status {
            state: SessionStatus::Connected,
            message,
            target: status.current_host,
        },
        Some(false) => PanelEvent::Status {
            state: SessionStatus::Disconnected,
            message,
            target: status.current_host,
        },
        None => PanelEvent::Notice {
            message: message.unwrap_or_default(),
            target: status.current_host,
        },
    }
}

fn decode_mail_status(status: MailStatus) -> Option<PanelEvent<MailMessage>> {
    let target = status.current_mail_config_id;
    let message = status.message;
    match status.status {
        MailStatusKind::Connected => Some(PanelEvent::Status {
            state: SessionStatus::Connected,
            message: Some(message),
            target,
        }),
        MailStatusKind::Disconnected => Some(PanelEvent::Status {
            state: SessionStatus::Disconnected,
            message: Some(message),
            target,
        }),
        MailStatusKind::Error => Some(PanelEvent::Error { message, target }),
        MailStatusKind::Success | MailStatusKind::Info => {
            Some(PanelEvent::Notice { message, target })
        }
        MailStatusKind::Unknown => {
            debug!(msg = %message, "unhandled mail_status");
            None
        }
    }
}

fn decode_bandwidth_status(status: BandwidthStatus) -> PanelEvent<BandwidthSample> {
    if status.status.eq_ignore_ascii_case("error") {
        PanelEvent::Error {
            message: status.message,
            target: None,
        }
    } else {
        PanelEvent::Notice {
            message: status.message,
            target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(name: &str, payload: serde_json::Value) -> RawEvent {
        RawEvent {
            name: name.into(),
            payload,
        }
    }

    #[test]
    fn port_status_item_falls_back_to_common_service() {
        let ev = raw("scan_update", json!({"status": "port_status", "port": 22, "state": "closed"}));
        let Some(Inbound::Ports(PanelEvent::Item(port))) = decode(&ev) else {
            panic!("expected port item");
        };
        assert_eq!(port.status, PortStatus::Closed);
        assert_eq!(port.service, "SSH");
        assert_eq!(port.description, "Secure Shell");
    }

    #[test]
    fn open_port_prefers_backend_service() {
        let ev = raw(
            "scan_update",
            json!({"status": "open_port", "port": 8080, "service": "http-proxy", "details": "squid 6"}),
        );
        let Some(Inbound::Ports(PanelEvent::Item(port))) = decode(&ev) else {
            panic!("expected port item");
        };
        assert_eq!(port.status, PortStatus::Open);
        assert_eq!(port.service, "http-proxy");
        assert_eq!(port.description, "N/A");
        assert_eq!(port.details.as_deref(), Some("squid 6"));
    }

    #[test]
    fn scan_info_is_a_notice_with_target() {
        let ev = raw("scan_update", json!({"status": "info", "message": "Scan initiated", "ip": "10.0.0.1"}));
        assert_eq!(
            decode(&ev),
            Some(Inbound::Ports(PanelEvent::Notice {
                message: "Scan initiated".into(),
                target: Some("10.0.0.1".into()),
            }))
        );
    }

    #[test]
    fn ftp_status_mapping() {
        let connected = raw(
            "ftp_status",
            json!({"status": "success", "message": "ok", "is_connected": true, "current_host": "ftp.example"}),
        );
        assert!(matches!(
            decode(&connected),
            Some(Inbound::Ftp(PanelEvent::Status { state: SessionStatus::Connected, target: Some(ref h), .. })) if h == "ftp.example"
        ));

        let error = raw("ftp_status", json!({"status": "error", "message": "530 Login incorrect", "is_connected": false}));
        assert!(matches!(decode(&error), Some(Inbound::Ftp(PanelEvent::Error { .. }))));

        let info = raw("ftp_status", json!({"status": "info", "message": "Not connected"}));
        assert!(matches!(decode(&info), Some(Inbound::Ftp(PanelEvent::Notice { .. }))));
    }

    #[test]
    fn mail_status_carries_profile_target() {
        let ev = raw(
            "mail_status",
            json!({"status": "connected", "message": "hi", "current_mail_config_id": "m1"}),
        );
        assert!(matches!(
            decode(&ev),
            Some(Inbound::Mail(PanelEvent::Status { state: SessionStatus::Connected, target: Some(ref id), .. })) if id == "m1"
        ));
    }

    #[test]
    fn inbox_listing_uses_backend_total() {
        let ev = raw(
            "mail_inbox_listing",
            json!({"mailbox": "INBOX", "totalCount": 57, "emails": [
                {"uid": "9", "subject": "a", "from": "x", "date": "d", "message_id": "<1>"}
            ]}),
        );
        let Some(Inbound::Mail(PanelEvent::Listing { items, total })) = decode(&ev) else {
            panic!("expected listing");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(total, 57);
    }

    #[test]
    fn unknown_and_malformed_events_are_dropped() {
        assert_eq!(decode(&raw("whatever", json!({}))), None);
        assert_eq!(decode(&raw("scan_update", json!({"status": "progress"}))), None);
        assert_eq!(decode(&raw("ftp_dir_listing", json!("nope"))), None);
    }

    #[test]
    fn greeting_extracts_data() {
        let ev = raw("my_response", json!({"data": "Connected to backend! Your SID: abc"}));
        assert_eq!(
            decode(&ev),
            Some(Inbound::Greeting("Connected to backend! Your SID: abc".into()))
        );
    }
}
