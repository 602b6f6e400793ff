use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use nethawk_api::events::outbound;

use super::PanelKind;
use crate::error::CoreError;
use crate::model::{EmailContent, InboxSummary, MailMessage, MailProfile, MailUid, Notification};
use crate::session::{SessionInfo, SessionState, SessionTrigger};
use crate::sync::{Effect, Emit, KeyedSet, PanelEvent, Reducer, SessionStatus};

const SEARCH_ALL: &str = "ALL";

/// One page of the inbox to ask the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxRequest {
    pub mailbox: String,
    pub limit: u32,
    pub offset: u32,
}

impl InboxRequest {
    /// `mail_list_inbox` payload.
    pub fn payload(&self) -> Value {
        json!({
            "mailbox": self.mailbox,
            "criteria": SEARCH_ALL,
            "limit": self.limit,
            "offset": self.offset,
        })
    }
}

/// Mail checker panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailState {
    pub profiles: KeyedSet<MailProfile>,
    pub sessions: BTreeMap<String, SessionInfo>,
    /// Profile bound to the live session.
    pub active: Option<String>,
    /// Profile the user asked to connect, until the backend answers.
    pub pending: Option<String>,
    /// Profiles the user disconnected. Late `connected` statuses for these
    /// are dropped until the push channel re-joins.
    stopped: BTreeSet<String>,
    pub inbox: KeyedSet<MailMessage>,
    pub total_count: usize,
    pub summary: Option<InboxSummary>,
    pub selected_email: Option<EmailContent>,
    pub page: u32,
    pub per_page: u32,
    pub mailbox: String,
    pub loading: bool,
    pub last_message: Option<String>,
    pub last_error: Option<String>,
}

impl Default for MailState {
    fn default() -> Self {
        Self::new(10, "INBOX")
    }
}

impl MailState {
    pub fn new(per_page: u32, mailbox: impl Into<String>) -> Self {
        Self {
            profiles: KeyedSet::new(),
            sessions: BTreeMap::new(),
            active: None,
            pending: None,
            stopped: BTreeSet::new(),
            inbox: KeyedSet::new(),
            total_count: 0,
            summary: None,
            selected_email: None,
            page: 1,
            per_page: per_page.max(1),
            mailbox: mailbox.into(),
            loading: false,
            last_message: None,
            last_error: None,
        }
    }

    pub fn set_profiles(&mut self, profiles: Vec<MailProfile>) {
        self.profiles.replace_all(profiles);
        let profiles = &self.profiles;
        self.sessions.retain(|id, _| profiles.contains_key(id));
        if self
            .active
            .as_ref()
            .is_some_and(|id| !self.profiles.contains_key(id))
        {
            self.active = None;
            self.clear_inbox();
        }
    }

    pub fn upsert_profile(&mut self, profile: MailProfile) {
        self.profiles.upsert(profile);
    }

    pub fn remove_profile(&mut self, id: &str) -> Option<MailProfile> {
        let removed = self.profiles.remove(&id.to_owned());
        self.sessions.remove(id);
        if self.pending.as_deref() == Some(id) {
            self.pending = None;
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
            self.clear_inbox();
        }
        removed
    }

    pub fn session(&self, profile_id: &str) -> Option<&SessionInfo> {
        self.sessions.get(profile_id)
    }

    pub fn session_state(&self, profile_id: &str) -> SessionState {
        self.session(profile_id).map(|s| s.state).unwrap_or_default()
    }

    pub fn active_profile(&self) -> Option<&MailProfile> {
        self.active.as_ref().and_then(|id| self.profiles.get(id))
    }

    pub fn is_connected(&self) -> bool {
        self.active
            .as_deref()
            .and_then(|id| self.session(id))
            .is_some_and(|s| s.active && s.state == SessionState::Connected)
    }

    /// Profiles that currently claim the active session.
    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|s| s.active).count()
    }

    pub fn total_pages(&self) -> u32 {
        let per_page = usize::try_from(self.per_page).unwrap_or(usize::MAX).max(1);
        u32::try_from(self.total_count.div_ceil(per_page))
            .unwrap_or(u32::MAX)
            .max(1)
    }

    /// Guarded start of a connect to `profile_id`.
    ///
    /// Refused when that profile is already connecting, or connected and
    /// active. Otherwise every other profile loses its active flag and
    /// the inbox view is cleared until the backend confirms.
    pub fn begin_connect(&mut self, profile_id: &str) -> Result<(), CoreError> {
        if !self.profiles.contains_key(&profile_id.to_owned()) {
            return Err(CoreError::ProfileNotFound {
                id: profile_id.to_owned(),
            });
        }
        let current = self.sessions.get(profile_id).cloned().unwrap_or_default();
        let busy = current.state == SessionState::Connecting
            || (current.state == SessionState::Connected && current.active);
        if busy {
            return Err(CoreError::AlreadyActive {
                panel: PanelKind::Mail,
            });
        }

        // A connect still waiting on another profile is abandoned.
        if let Some(previous) = self.pending.take() {
            if previous != profile_id {
                if let Some(session) = self.sessions.get_mut(&previous) {
                    session.apply(SessionTrigger::UserStop);
                }
                self.stopped.insert(previous);
            }
        }
        for (id, session) in &mut self.sessions {
            if id != profile_id {
                session.active = false;
            }
        }
        let session = self.sessions.entry(profile_id.to_owned()).or_default();
        if matches!(session.state, SessionState::Connected | SessionState::Error) {
            // Stale: connected but no longer the active session.
            session.apply(SessionTrigger::UserStop);
        }
        session.begin();

        self.stopped.remove(profile_id);
        self.pending = Some(profile_id.to_owned());
        self.active = None;
        self.page = 1;
        self.clear_inbox();
        Ok(())
    }

    /// User asked to disconnect. Ends the active session, or the connect
    /// still in flight. Returns whether there was one to end.
    pub fn begin_disconnect(&mut self) -> bool {
        let pending = self.pending.take();
        let Some(id) = self.active.take().or(pending) else {
            return false;
        };
        if let Some(session) = self.sessions.get_mut(&id) {
            session.apply(SessionTrigger::UserStop);
            session.active = false;
        }
        self.stopped.insert(id);
        self.clear_inbox();
        true
    }

    /// The push channel joined again. Backend statuses replayed from here
    /// on describe sessions it still holds, so none are treated as stale.
    pub fn channel_rejoined(&mut self) {
        self.stopped.clear();
    }

    /// Page request for `page` (1-based), remembering the page.
    pub fn fetch_inbox(&mut self, page: u32) -> Result<InboxRequest, CoreError> {
        if !self.is_connected() {
            return Err(CoreError::NoActiveSession {
                panel: PanelKind::Mail,
            });
        }
        self.page = page.max(1);
        self.loading = true;
        Ok(self.inbox_request())
    }

    /// Mailbox to read `uid` from, once a session is active.
    pub fn request_content(&mut self, uid: &MailUid) -> Result<String, CoreError> {
        if !self.is_connected() {
            return Err(CoreError::NoActiveSession {
                panel: PanelKind::Mail,
            });
        }
        debug!(%uid, "requesting message body");
        Ok(self.mailbox.clone())
    }

    /// Connection id for a test send through the active session.
    pub fn send_test_target(&self) -> Result<String, CoreError> {
        match &self.active {
            Some(id) if self.is_connected() => Ok(id.clone()),
            _ => Err(CoreError::NoActiveSession {
                panel: PanelKind::Mail,
            }),
        }
    }

    pub fn on_summary(&mut self, summary: InboxSummary) {
        if self.is_connected() {
            self.summary = Some(summary);
        }
    }

    pub fn on_content(&mut self, content: EmailContent) -> Vec<Effect> {
        if !self.is_connected() {
            debug!(uid = %content.uid, "message body for an inactive session, ignoring");
            return Vec::new();
        }
        let subject = content.subject.clone();
        self.selected_email = Some(content);
        vec![Effect::Notify(Notification::info(
            "Email loaded",
            format!("Content for '{subject}' loaded."),
        ))]
    }

    pub fn close_email(&mut self) {
        self.selected_email = None;
    }

    fn inbox_request(&self) -> InboxRequest {
        InboxRequest {
            mailbox: self.mailbox.clone(),
            limit: self.per_page,
            offset: (self.page.max(1) - 1).saturating_mul(self.per_page),
        }
    }

    fn clear_inbox(&mut self) {
        self.inbox.clear();
        self.total_count = 0;
        self.summary = None;
        self.selected_email = None;
        self.loading = false;
    }

    /// Profile an untargeted status is about: the one mid-connect, else
    /// the active one.
    fn implied_target(&self) -> Option<String> {
        self.pending.clone().or_else(|| self.active.clone())
    }

    fn on_connected(&mut self, message: Option<String>, target: Option<String>) -> Vec<Effect> {
        let Some(id) = target.or_else(|| self.implied_target()) else {
            warn!("mail connected without a profile id, ignoring");
            return Vec::new();
        };
        if self.stopped.contains(&id) {
            debug!(profile = %id, "connected for a session the user ended, ignoring");
            return Vec::new();
        }
        if !self.profiles.contains_key(&id) {
            warn!(profile = %id, "mail connected for an unknown profile");
        }
        if self.pending.as_deref() == Some(id.as_str()) {
            self.pending = None;
        }

        // Most recent confirmation wins the active flag.
        for (other, session) in &mut self.sessions {
            if *other != id && session.active {
                session.demote();
            }
        }
        let session = self.sessions.entry(id.clone()).or_default();
        session.confirm();

        let switched = self.active.as_deref() != Some(id.as_str());
        self.active = Some(id);
        self.last_error = None;
        self.page = 1;
        if switched {
            self.clear_inbox();
        }
        self.loading = true;

        let name = self
            .active_profile()
            .map_or_else(|| "mail account".to_owned(), |p| p.name.clone());
        vec![
            Effect::Emit(Emit {
                event: outbound::MAIL_LIST_INBOX,
                payload: self.inbox_request().payload(),
            }),
            Effect::Notify(Notification::success(
                "Mail connected",
                message.unwrap_or_else(|| format!("Connected to {name}")),
            )),
        ]
    }

    fn on_disconnected(&mut self, message: Option<String>, target: Option<String>) -> Vec<Effect> {
        let Some(id) = target.or_else(|| self.implied_target()) else {
            debug!("mail disconnected with no active session");
            return Vec::new();
        };
        if self.pending.as_deref() == Some(id.as_str()) {
            self.pending = None;
        }
        if let Some(session) = self.sessions.get_mut(&id) {
            session.drop_session();
        }
        if self.active.as_deref() == Some(id.as_str()) {
            self.active = None;
        }
        self.clear_inbox();
        message
            .map(|m| vec![Effect::Notify(Notification::info("Mail disconnected", m))])
            .unwrap_or_default()
    }

    fn on_error(&mut self, message: String, target: Option<String>) -> Vec<Effect> {
        if let Some(id) = target.or_else(|| self.implied_target()) {
            if self.stopped.contains(&id) {
                debug!(profile = %id, %message, "error for a session the user ended, ignoring");
                return Vec::new();
            }
            if self.pending.as_deref() == Some(id.as_str()) {
                self.pending = None;
            }
            if let Some(session) = self.sessions.get_mut(&id) {
                session.fail(&message);
            }
            if self.active.as_deref() == Some(id.as_str()) {
                self.active = None;
            }
        }
        self.loading = false;
        self.last_error = Some(message.clone());
        vec![Effect::Notify(Notification::error("Mail error", message))]
    }
}

impl Reducer for MailState {
    type Item = MailMessage;

    fn apply(&mut self, event: PanelEvent<MailMessage>) -> Vec<Effect> {
        match event {
            PanelEvent::Status {
                state: SessionStatus::Connected,
                message,
                target,
            } => self.on_connected(message, target),
            PanelEvent::Status {
                state: SessionStatus::Disconnected,
                message,
                target,
            } => self.on_disconnected(message, target),
            PanelEvent::Status {
                state: SessionStatus::Connecting,
                ..
            }
            | PanelEvent::Progress(_)
            | PanelEvent::Complete { .. }
            | PanelEvent::Stopped { .. } => Vec::new(),
            PanelEvent::Item(message) => {
                if self.is_connected() {
                    self.inbox.upsert(message);
                }
                Vec::new()
            }
            PanelEvent::Listing { items, total } => {
                if !self.is_connected() {
                    debug!("inbox listing for an inactive session, ignoring");
                    return Vec::new();
                }
                let count = items.len();
                self.inbox.replace_all(items);
                self.total_count = total;
                self.loading = false;
                vec![Effect::Notify(Notification::info(
                    "Inbox updated",
                    format!("Loaded {count} messages from {}. Total: {total}", self.mailbox),
                ))]
            }
            PanelEvent::Error { message, target } => self.on_error(message, target),
            // Backend success/info messages name no profile.
            PanelEvent::Notice { message, .. } => {
                self.last_message = Some(message.clone());
                vec![Effect::Notify(Notification::info("Mail", message))]
            }
            PanelEvent::Reset => {
                let profiles = std::mem::take(&mut self.profiles);
                *self = Self {
                    profiles,
                    ..Self::new(self.per_page, self.mailbox.clone())
                };
                Vec::new()
            }
        }
    }

    fn transport_lost(&mut self) {
        for session in self.sessions.values_mut() {
            if session.state.is_live() || session.state == SessionState::Error {
                session.drop_session();
            }
            session.active = false;
        }
        self.active = None;
        self.pending = None;
        self.clear_inbox();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(id: &str) -> MailProfile {
        MailProfile {
            id: id.into(),
            name: format!("{id} account"),
            imap_host: "imap.example".into(),
            imap_port: 993,
            smtp_host: "smtp.example".into(),
            smtp_port: 587,
            username: format!("{id}@example"),
        }
    }

    fn message(uid: &str) -> MailMessage {
        MailMessage {
            uid: MailUid::from(uid),
            subject: format!("subject {uid}"),
            from: "x@example".into(),
            date: String::new(),
            message_id: format!("<{uid}@example>"),
        }
    }

    fn connected(id: &str) -> PanelEvent<MailMessage> {
        PanelEvent::Status {
            state: SessionStatus::Connected,
            message: Some("Connected".into()),
            target: Some(id.into()),
        }
    }

    fn state() -> MailState {
        let mut state = MailState::default();
        state.set_profiles(vec![profile("a"), profile("b")]);
        state
    }

    #[test]
    fn connect_auto_fetches_first_page() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        let effects = state.apply(connected("a"));
        assert_eq!(
            effects[0],
            Effect::Emit(Emit {
                event: outbound::MAIL_LIST_INBOX,
                payload: json!({"mailbox": "INBOX", "criteria": "ALL", "limit": 10, "offset": 0}),
            })
        );
        assert!(state.is_connected());
    }

    #[test]
    fn most_recent_connected_wins() {
        let mut state = state();
        state.begin_connect("b").unwrap();
        state.apply(connected("b"));
        state.apply(connected("a"));
        assert_eq!(state.active.as_deref(), Some("a"));
        assert_eq!(state.active_count(), 1);
        assert_eq!(state.session_state("b"), SessionState::Disconnected);
    }

    #[test]
    fn connect_guard() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        assert!(matches!(
            state.begin_connect("a"),
            Err(CoreError::AlreadyActive { panel: PanelKind::Mail })
        ));
        state.apply(connected("a"));
        assert!(state.begin_connect("a").is_err());
        // A different profile may take over.
        state.begin_connect("b").unwrap();
        assert_eq!(state.active, None);
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn fetch_inbox_offsets_by_page() {
        let mut state = state();
        assert!(state.fetch_inbox(1).is_err());
        state.begin_connect("a").unwrap();
        state.apply(connected("a"));
        let request = state.fetch_inbox(3).unwrap();
        assert_eq!(request.offset, 20);
        assert_eq!(request.limit, 10);
        assert_eq!(state.page, 3);
    }

    #[test]
    fn error_without_target_hits_active_and_keeps_inbox() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        state.apply(connected("a"));
        state.apply(PanelEvent::Listing {
            items: vec![message("2"), message("10")],
            total: 2,
        });
        state.apply(PanelEvent::Error {
            message: "auth failed".into(),
            target: None,
        });
        let session = state.session("a").unwrap();
        assert_eq!(session.state, SessionState::Disconnected);
        assert_eq!(session.last_error.as_deref(), Some("auth failed"));
        assert_eq!(state.inbox.len(), 2);
        assert!(!state.is_connected());
    }

    #[test]
    fn connect_failure_lands_on_connecting_profile() {
        let mut state = state();
        state.begin_connect("b").unwrap();
        state.apply(PanelEvent::Error {
            message: "IMAP login failed".into(),
            target: None,
        });
        assert_eq!(state.session_state("b"), SessionState::Disconnected);
        assert!(state.session("b").unwrap().error_at.is_some());
    }

    #[test]
    fn disconnected_clears_inbox_and_selection() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        state.apply(connected("a"));
        state.apply(PanelEvent::Listing {
            items: vec![message("1")],
            total: 1,
        });
        state.apply(PanelEvent::Status {
            state: SessionStatus::Disconnected,
            message: None,
            target: None,
        });
        assert!(state.inbox.is_empty());
        assert_eq!(state.selected_email, None);
        assert_eq!(state.active, None);
    }

    #[test]
    fn disconnect_cancels_a_pending_connect() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        assert!(state.begin_disconnect());
        assert_eq!(state.session_state("a"), SessionState::Disconnected);
        assert_eq!(state.pending, None);

        // The backend answers the abandoned connect after all.
        let effects = state.apply(connected("a"));
        assert!(effects.is_empty());
        assert!(!state.is_connected());

        // And the profile can be connected again right away.
        state.begin_connect("a").unwrap();
        assert_eq!(state.session_state("a"), SessionState::Connecting);
    }

    #[test]
    fn late_connected_after_stop_is_ignored() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        state.apply(connected("a"));
        assert!(state.begin_disconnect());

        let effects = state.apply(connected("a"));
        assert!(effects.is_empty());
        assert!(!state.is_connected());
        assert_eq!(state.active, None);
        assert_eq!(state.session_state("a"), SessionState::Disconnected);
    }

    #[test]
    fn late_error_after_stop_is_ignored() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        assert!(state.begin_disconnect());
        let effects = state.apply(PanelEvent::Error {
            message: "connection reset".into(),
            target: Some("a".into()),
        });
        assert!(effects.is_empty());
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn switching_profiles_abandons_the_pending_one() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        state.begin_connect("b").unwrap();
        assert_eq!(state.session_state("a"), SessionState::Disconnected);

        state.apply(connected("a"));
        assert_eq!(state.active, None);
        state.apply(connected("b"));
        assert_eq!(state.active.as_deref(), Some("b"));
    }

    #[test]
    fn rejoin_allows_replayed_connected() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        state.apply(connected("a"));
        assert!(state.begin_disconnect());

        state.channel_rejoined();
        state.apply(connected("a"));
        assert!(state.is_connected());
    }

    #[test]
    fn removing_active_profile_drops_session() {
        let mut state = state();
        state.begin_connect("a").unwrap();
        state.apply(connected("a"));
        assert!(state.remove_profile("a").is_some());
        assert!(!state.is_connected());
        assert_eq!(state.profiles.len(), 1);
    }
}
