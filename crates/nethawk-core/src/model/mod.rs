// ── Domain model ──
//
// Canonical types the panels hold and the CLI/TUI render. Wire DTOs from
// `nethawk-api` are converted into these in `crate::convert`.

pub mod bandwidth;
pub mod device;
pub mod file;
pub mod mail;
pub mod notification;
pub mod overview;
pub mod port;
pub mod profile;

pub use bandwidth::BandwidthSample;
pub use device::{Device, DeviceKind, DeviceStatus, NetworkScanType, Vulnerability};
pub use file::{FileEntry, FileKind, TransferDirection, TransferProgress};
pub use mail::{Attachment, EmailContent, InboxSummary, MailMessage, MailUid};
pub use notification::{Notification, NotifyLevel};
pub use overview::{ActivityItem, DeviceShare, OverviewStats, TrafficPoint};
pub use port::{PortResult, PortStatus, ScanType};
pub use profile::{FtpProfile, FtpProtocol, MailProfile, NewMailProfile};
