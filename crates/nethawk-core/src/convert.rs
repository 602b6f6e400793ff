// ── API-to-domain type conversions ──
//
// Bridges raw `nethawk_api` payloads into canonical `nethawk_core::model`
// types. Each impl parses strings into strong types and fills the same
// defaults the dashboard shows when the backend leaves a field out.

use std::net::Ipv4Addr;

use nethawk_api::events::{
    AttachmentDto, BandwidthUpdate, DeviceDto, FtpFileDto, FtpFileKind, FtpTransferProgress,
    MailEmailContent, MailInboxSummary, MailMessageDto,
};
use nethawk_api::models::{
    self as api, ActivityEntry, FtpConnectionDto, MailConnectionDto, NewMailConnection,
};

use crate::model::{
    ActivityItem, Attachment, BandwidthSample, Device, DeviceKind, DeviceShare, DeviceStatus,
    EmailContent, FileEntry, FileKind, FtpProfile, FtpProtocol, InboxSummary, MailMessage,
    MailProfile, MailUid, NewMailProfile, OverviewStats, TrafficPoint, TransferDirection,
    TransferProgress, Vulnerability,
};

// ── Profiles ─────────────────────────────────────────────────────────

impl From<api::FtpProtocol> for FtpProtocol {
    fn from(p: api::FtpProtocol) -> Self {
        match p {
            api::FtpProtocol::Ftp => Self::Ftp,
            api::FtpProtocol::Ftps => Self::Ftps,
            api::FtpProtocol::Sftp => Self::Sftp,
        }
    }
}

impl From<FtpConnectionDto> for FtpProfile {
    fn from(dto: FtpConnectionDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            host: dto.host,
            port: dto.port,
            username: dto.username,
            protocol: dto.protocol.into(),
        }
    }
}

impl From<MailConnectionDto> for MailProfile {
    fn from(dto: MailConnectionDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            imap_host: dto.imap_host,
            imap_port: dto.imap_port,
            smtp_host: dto.smtp_host,
            smtp_port: dto.smtp_port,
            username: dto.username,
        }
    }
}

impl From<NewMailProfile> for NewMailConnection {
    fn from(p: NewMailProfile) -> Self {
        Self {
            name: p.name,
            imap_host: p.imap_host,
            imap_port: p.imap_port,
            smtp_host: p.smtp_host,
            smtp_port: p.smtp_port,
            username: p.username,
            password: p.password,
        }
    }
}

// ── FTP ──────────────────────────────────────────────────────────────

impl From<FtpFileDto> for FileEntry {
    fn from(dto: FtpFileDto) -> Self {
        let kind = match dto.kind {
            FtpFileKind::File => FileKind::File,
            FtpFileKind::Directory => FileKind::Directory,
            FtpFileKind::Symlink => FileKind::Symlink,
        };
        let (name, link_target) = match (kind, dto.name.split_once(" -> ")) {
            (FileKind::Symlink, Some((name, target))) => (name.to_owned(), Some(target.to_owned())),
            _ => (dto.name, None),
        };
        Self {
            name,
            kind,
            size: dto.size,
            modified: dto.modified,
            permissions: dto.permissions,
            owner: dto.owner,
            link_target,
        }
    }
}

impl From<FtpTransferProgress> for TransferProgress {
    fn from(dto: FtpTransferProgress) -> Self {
        let direction = if dto.direction.eq_ignore_ascii_case("upload") {
            TransferDirection::Upload
        } else {
            TransferDirection::Download
        };
        Self {
            direction,
            file_name: dto.file_name,
            progress: dto.progress,
            status: dto.status,
            total_size: dto.total_size,
            transferred_size: dto.transferred_size,
        }
    }
}

// ── Mail ─────────────────────────────────────────────────────────────

impl From<MailMessageDto> for MailMessage {
    fn from(dto: MailMessageDto) -> Self {
        Self {
            uid: MailUid::new(dto.uid),
            subject: dto.subject,
            from: dto.from,
            date: dto.date,
            message_id: dto.message_id,
        }
    }
}

impl From<MailInboxSummary> for InboxSummary {
    fn from(dto: MailInboxSummary) -> Self {
        Self {
            unread: dto.unread_count,
            total: dto.total_messages,
        }
    }
}

impl From<AttachmentDto> for Attachment {
    fn from(dto: AttachmentDto) -> Self {
        Self {
            filename: dto.filename,
            content_type: dto.content_type,
            size: dto.size,
        }
    }
}

impl From<MailEmailContent> for EmailContent {
    fn from(dto: MailEmailContent) -> Self {
        Self {
            uid: MailUid::new(dto.uid),
            subject: dto.subject,
            from: dto.from,
            to: dto.to,
            cc: dto.cc,
            bcc: dto.bcc,
            date: dto.date,
            message_id: dto.message_id,
            body: dto.body,
            plain_text_body: dto.plain_text_body,
            html_body: dto.html_body,
            attachments: dto.attachments.into_iter().map(Attachment::from).collect(),
        }
    }
}

// ── Bandwidth ────────────────────────────────────────────────────────

impl From<BandwidthUpdate> for BandwidthSample {
    fn from(dto: BandwidthUpdate) -> Self {
        Self {
            timestamp: dto.timestamp,
            upload: dto.upload,
            download: dto.download,
            ping: dto.ping,
        }
    }
}

// ── Network devices ──────────────────────────────────────────────────

impl TryFrom<DeviceDto> for Device {
    type Error = std::net::AddrParseError;

    fn try_from(dto: DeviceDto) -> Result<Self, Self::Error> {
        let ip: Ipv4Addr = dto.ip.trim().parse()?;
        let kind = dto
            .device_type
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DeviceKind::Unknown);
        let status = match dto.status.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("offline") => DeviceStatus::Offline,
            _ => DeviceStatus::Online,
        };
        let mut open_ports = dto.open_ports.unwrap_or_default();
        open_ports.sort_unstable();
        open_ports.dedup();

        Ok(Self {
            ip,
            mac: dto.mac,
            hostname: dto.hostname,
            vendor: dto.vendor,
            kind,
            status,
            last_seen: dto.last_seen.unwrap_or_else(|| "Now".into()),
            open_ports,
            vulnerability: dto
                .vulnerability
                .as_deref()
                .and_then(|v| v.parse::<Vulnerability>().ok()),
        })
    }
}

// ── Overview ─────────────────────────────────────────────────────────

impl From<api::OverviewStats> for OverviewStats {
    fn from(dto: api::OverviewStats) -> Self {
        Self {
            cpu: dto.cpu,
            memory: dto.memory,
            disk: dto.disk,
            network: dto.network,
        }
    }
}

impl From<api::TrafficPoint> for TrafficPoint {
    fn from(dto: api::TrafficPoint) -> Self {
        Self {
            time: dto.time,
            upload: dto.upload,
            download: dto.download,
        }
    }
}

impl From<api::DeviceShare> for DeviceShare {
    fn from(dto: api::DeviceShare) -> Self {
        Self {
            name: dto.name,
            value: dto.value,
            color: dto.color,
        }
    }
}

impl From<ActivityEntry> for ActivityItem {
    fn from(dto: ActivityEntry) -> Self {
        Self {
            id: dto.id,
            kind: dto.kind,
            message: dto.message,
            time: dto.time,
            status: dto.status,
        }
    }
}
