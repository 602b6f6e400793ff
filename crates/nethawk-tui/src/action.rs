//! UI actions. Every state change in the app flows through one of these.

use std::sync::Arc;

use secrecy::SecretString;

use nethawk_config::SecretKind;
use nethawk_core::{
    BandwidthState, Command, ConnectionState, FtpState, MailState, NetworkScanState, Notification,
    OverviewState, PortScanState,
};

use crate::screen::ScreenId;

/// A command that can only be built once a password is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSecret {
    FtpConnect {
        profile_id: String,
    },
    MailConnect {
        profile_id: String,
    },
    MailSendTest {
        profile_id: String,
        recipient: String,
    },
}

impl PendingSecret {
    pub fn kind(&self) -> SecretKind {
        match self {
            Self::FtpConnect { .. } => SecretKind::Ftp,
            Self::MailConnect { .. } | Self::MailSendTest { .. } => SecretKind::Mail,
        }
    }

    pub fn profile_id(&self) -> &str {
        match self {
            Self::FtpConnect { profile_id }
            | Self::MailConnect { profile_id }
            | Self::MailSendTest { profile_id, .. } => profile_id,
        }
    }

    pub fn into_command(self, password: SecretString) -> Command {
        match self {
            Self::FtpConnect { profile_id } => Command::FtpConnect {
                profile_id,
                password,
            },
            Self::MailConnect { profile_id } => Command::MailConnect {
                profile_id,
                password,
            },
            Self::MailSendTest {
                profile_id,
                recipient,
            } => Command::MailSendTest {
                profile_id: Some(profile_id),
                recipient,
                subject: "NetHawk test message".into(),
                body: "This is a test message sent from the NetHawk terminal dashboard.".into(),
                password,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────────
    Tick,
    Render,
    Resize(u16, u16),
    Quit,

    // ── Navigation ────────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Backend feed ──────────────────────────────────────────────────
    ConnectionChanged(ConnectionState),
    Notify(Notification),
    OverviewUpdated(Arc<OverviewState>),
    NetworkUpdated(Arc<NetworkScanState>),
    BandwidthUpdated(Arc<BandwidthState>),
    PortsUpdated(Arc<PortScanState>),
    FtpUpdated(Arc<FtpState>),
    MailUpdated(Arc<MailState>),

    // ── Intents ───────────────────────────────────────────────────────
    /// Run a command against the dashboard in the background.
    Execute(Command),
    /// Run a password-gated command. `None` resolves the stored secret.
    WithSecret {
        request: PendingSecret,
        password: Option<String>,
    },
    /// No stored secret; the owning screen should prompt for one.
    PasswordRequired(PendingSecret),
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn send_test_targets_its_profile() {
        let request = PendingSecret::MailSendTest {
            profile_id: "9f1c".into(),
            recipient: "ops@example.com".into(),
        };
        assert_eq!(request.kind(), SecretKind::Mail);
        assert_eq!(request.profile_id(), "9f1c");

        let Command::MailSendTest {
            profile_id,
            recipient,
            password,
            ..
        } = request.into_command(SecretString::from("hunter2"))
        else {
            panic!("expected MailSendTest");
        };
        assert_eq!(profile_id.as_deref(), Some("9f1c"));
        assert_eq!(recipient, "ops@example.com");
        assert_eq!(password.expose_secret(), "hunter2");
    }

    #[test]
    fn ftp_connect_uses_ftp_secret() {
        let request = PendingSecret::FtpConnect {
            profile_id: "1".into(),
        };
        assert_eq!(request.kind(), SecretKind::Ftp);
        assert!(matches!(
            request.into_command(SecretString::from("x")),
            Command::FtpConnect { ref profile_id, .. } if profile_id == "1"
        ));
    }
}
