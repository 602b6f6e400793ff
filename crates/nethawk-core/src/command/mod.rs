// ── Command API ──
//
// Every user intent flows through a unified `Command` enum. The
// dashboard routes each variant to exactly one push-channel message or
// one HTTP call, after the owning panel has accepted it.

use secrecy::SecretString;

use crate::error::CoreError;
use crate::model::{MailProfile, MailUid, NetworkScanType, NewMailProfile, ScanType};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All user intents the dashboard accepts.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Port scanner ─────────────────────────────────────────────────
    StartPortScan {
        host: String,
        ports: Vec<u16>,
        scan_type: ScanType,
    },
    StopPortScan,

    // ── Network scanner ──────────────────────────────────────────────
    StartNetworkScan {
        ip_range: String,
        scan_type: NetworkScanType,
    },
    StopNetworkScan,

    // ── FTP ──────────────────────────────────────────────────────────
    FtpConnect {
        profile_id: String,
        password: SecretString,
    },
    FtpDisconnect,
    FtpListDir {
        path: String,
    },
    /// Open an entry of the current listing (`..` goes up).
    FtpNavigate {
        name: String,
    },

    // ── Mail ─────────────────────────────────────────────────────────
    MailConnect {
        profile_id: String,
        password: SecretString,
    },
    MailDisconnect,
    MailFetchInbox {
        page: u32,
    },
    MailGetContent {
        uid: MailUid,
    },
    /// Send through `profile_id`, or the active session's profile.
    MailSendTest {
        profile_id: Option<String>,
        recipient: String,
        subject: String,
        body: String,
        password: SecretString,
    },

    // ── Bandwidth ────────────────────────────────────────────────────
    StartBandwidth,
    StopBandwidth,

    // ── Profiles & overview (HTTP) ───────────────────────────────────
    AddMailProfile(NewMailProfile),
    DeleteMailProfile {
        id: String,
    },
    RefreshProfiles,
    RefreshOverview,
}

impl Command {
    /// Commands that only talk HTTP and work without the push channel.
    pub fn is_http(&self) -> bool {
        matches!(
            self,
            Self::AddMailProfile(_)
                | Self::DeleteMailProfile { .. }
                | Self::RefreshProfiles
                | Self::RefreshOverview
        )
    }
}

/// Outcome of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Accepted locally; nothing needed sending.
    Ok,
    /// The named push-channel event was queued.
    Emitted(&'static str),
    MailProfile(MailProfile),
    /// Backend confirmation text.
    Message(String),
    Profiles { ftp: usize, mail: usize },
    /// Overview refreshed; `failed` endpoints kept their previous data.
    Overview { failed: usize },
}
