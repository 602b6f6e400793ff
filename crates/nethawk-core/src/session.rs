// ── Per-profile session state machine ──
//
// User actions only *request* transitions (UserStart / UserStop); the
// backend confirms them through status events. Every change goes
// through `SessionState::transition`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Lifecycle of one backend session bound to a profile or panel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// What asked for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionTrigger {
    /// User pressed connect/start.
    UserStart,
    /// Backend reported the session live.
    Confirmed,
    /// Backend reported a failure for this session.
    Failed,
    /// User pressed disconnect/stop.
    UserStop,
    /// Backend or transport ended the session.
    Dropped,
    /// Backend reported the session live without a prior start, as after
    /// a push-channel reconnect.
    ChannelReplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal session transition from {from} on {trigger}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub trigger: SessionTrigger,
}

impl SessionState {
    pub fn transition(self, trigger: SessionTrigger) -> Result<Self, InvalidTransition> {
        use SessionState::{Connected, Connecting, Disconnected, Error, Idle};
        use SessionTrigger::{ChannelReplay, Confirmed, Dropped, Failed, UserStart, UserStop};

        match (self, trigger) {
            (Idle | Disconnected, UserStart) => Ok(Connecting),
            (Connecting, Confirmed) | (Idle | Disconnected, ChannelReplay) => Ok(Connected),
            (Connecting | Connected, Failed) => Ok(Error),
            (Connecting | Connected | Error, UserStop | Dropped) => Ok(Disconnected),
            (from, trigger) => Err(InvalidTransition { from, trigger }),
        }
    }

    /// Connecting or Connected.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

// ── SessionInfo ──────────────────────────────────────────────────────

/// Session bookkeeping attached to one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionInfo {
    pub state: SessionState,
    /// Bound to the panel's single active session.
    pub active: bool,
    pub last_error: Option<String>,
    pub error_at: Option<DateTime<Utc>>,
    pub last_check: Option<DateTime<Utc>>,
}

impl SessionInfo {
    /// Apply a trigger, logging and ignoring illegal ones. Returns
    /// whether the state changed.
    pub fn apply(&mut self, trigger: SessionTrigger) -> bool {
        match self.state.transition(trigger) {
            Ok(next) => {
                self.state = next;
                true
            }
            Err(err) => {
                debug!(%err, "session transition ignored");
                false
            }
        }
    }

    /// The user asked to connect.
    pub fn begin(&mut self) -> bool {
        if self.apply(SessionTrigger::UserStart) {
            self.last_error = None;
            self.error_at = None;
            true
        } else {
            false
        }
    }

    /// Backend confirmed the session. A confirmation with no observed
    /// `Connecting` is replayed state from a channel reconnect.
    pub fn confirm(&mut self) {
        self.last_check = Some(Utc::now());
        self.last_error = None;
        self.error_at = None;
        match self.state {
            SessionState::Connected => {}
            SessionState::Idle | SessionState::Disconnected => {
                warn!(from = %self.state, "connected without connecting, treating as channel replay");
                self.apply(SessionTrigger::ChannelReplay);
            }
            _ => {
                self.apply(SessionTrigger::Confirmed);
            }
        }
        self.active = self.state == SessionState::Connected;
    }

    /// Backend reported a failure. Records the error and walks
    /// `Error -> Disconnected`.
    pub fn fail(&mut self, message: &str) {
        let now = Utc::now();
        self.last_error = Some(message.to_owned());
        self.error_at = Some(now);
        self.last_check = Some(now);
        self.apply(SessionTrigger::Failed);
        self.apply(SessionTrigger::Dropped);
        self.active = false;
    }

    /// Session ended by the backend or the transport.
    pub fn drop_session(&mut self) {
        self.last_check = Some(Utc::now());
        self.apply(SessionTrigger::Dropped);
        self.active = false;
    }

    /// Demoted because another profile became the active session.
    pub fn demote(&mut self) {
        if self.state.is_live() {
            self.apply(SessionTrigger::Dropped);
        }
        self.active = false;
        self.last_error = None;
        self.error_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SessionState::{Connected, Connecting, Disconnected, Error, Idle};
    use super::SessionTrigger::{ChannelReplay, Confirmed, Dropped, Failed, UserStart, UserStop};

    #[test]
    fn legal_edges() {
        let cases = [
            (Idle, UserStart, Connecting),
            (Disconnected, UserStart, Connecting),
            (Connecting, Confirmed, Connected),
            (Connecting, Failed, Error),
            (Connected, Failed, Error),
            (Connected, UserStop, Disconnected),
            (Connected, Dropped, Disconnected),
            (Error, UserStop, Disconnected),
            (Error, Dropped, Disconnected),
            (Connecting, UserStop, Disconnected),
            (Connecting, Dropped, Disconnected),
            (Idle, ChannelReplay, Connected),
            (Disconnected, ChannelReplay, Connected),
        ];
        for (from, trigger, to) in cases {
            assert_eq!(from.transition(trigger), Ok(to), "{from} on {trigger}");
        }
    }

    #[test]
    fn idle_cannot_jump_to_connected() {
        assert_eq!(
            Idle.transition(Confirmed),
            Err(InvalidTransition {
                from: Idle,
                trigger: Confirmed
            })
        );
        assert!(Connected.transition(UserStart).is_err());
        assert!(Error.transition(Confirmed).is_err());
    }

    #[test]
    fn confirm_from_idle_replays() {
        let mut info = SessionInfo::default();
        info.confirm();
        assert_eq!(info.state, Connected);
        assert!(info.active);
    }

    #[test]
    fn fail_walks_error_to_disconnected() {
        let mut info = SessionInfo::default();
        assert!(info.begin());
        info.confirm();
        info.fail("auth failed");
        assert_eq!(info.state, Disconnected);
        assert!(!info.active);
        assert_eq!(info.last_error.as_deref(), Some("auth failed"));
        assert!(info.error_at.is_some());
    }

    #[test]
    fn begin_is_refused_while_live() {
        let mut info = SessionInfo::default();
        assert!(info.begin());
        assert!(!info.begin());
        info.confirm();
        assert!(!info.begin());
    }

    #[test]
    fn parses_from_text() {
        assert_eq!("connected".parse::<SessionState>(), Ok(Connected));
    }
}
