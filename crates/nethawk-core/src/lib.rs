//! Reactive data layer between `nethawk-api` and UI consumers (CLI / TUI).
//!
//! This crate owns the panel state, the sync rules that fold backend push
//! events into it, and the connection lifecycle:
//!
//! - **[`Dashboard`]**: central facade. [`connect()`](Dashboard::connect)
//!   builds the HTTP client, joins the push channel and spawns the event
//!   and command tasks. [`Dashboard::oneshot()`](Dashboard::oneshot) wraps a
//!   single CLI invocation.
//!
//! - **Panels** ([`panel`]): one state type per dashboard panel, each a
//!   [`Reducer`] over [`PanelEvent`]s. Result sets are [`KeyedSet`]s and
//!   progress is monotonic.
//!
//! - **[`ConnectionManager`]**: reference-counted panel subscriptions.
//!   Push events for a panel with no handler are dropped.
//!
//! - **[`Command`]**: typed user intents routed through an `mpsc` channel
//!   to the dashboard's command processor.
//!
//! - **[`projection`]**: view projections (empty, loading, error,
//!   populated) consumed by renderers.

pub mod command;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod manager;
pub mod model;
pub mod panel;
pub mod projection;
pub mod session;
pub mod stream;
pub mod sync;
pub mod util;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{DashboardConfig, ReconnectPolicy};
pub use dashboard::{ConnectionState, Dashboard};
pub use error::CoreError;
pub use manager::{ConnectionManager, Subscription};
pub use panel::{
    BandwidthState, FtpState, InboxRequest, MailState, NetworkScanState, OverviewState,
    OverviewUpdate, PanelKind, PortScanState,
};
pub use projection::ResultView;
pub use session::{SessionInfo, SessionState, SessionTrigger};
pub use stream::PanelStream;
pub use sync::{Effect, Emit, KeyedSet, PanelEvent, Progress, Reducer, SessionStatus};

pub use model::{
    ActivityItem, Attachment, BandwidthSample, Device, DeviceKind, DeviceShare, DeviceStatus,
    EmailContent, FileEntry, FileKind, FtpProfile, FtpProtocol, InboxSummary, MailMessage,
    MailProfile, MailUid, NetworkScanType, NewMailProfile, Notification, NotifyLevel,
    OverviewStats, PortResult, PortStatus, ScanType, TrafficPoint, TransferDirection,
    TransferProgress, Vulnerability,
};
