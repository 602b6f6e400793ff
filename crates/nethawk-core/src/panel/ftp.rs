use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use nethawk_api::events::outbound;

use super::PanelKind;
use crate::error::CoreError;
use crate::model::{FileEntry, FtpProfile, Notification, TransferProgress};
use crate::session::{SessionInfo, SessionState, SessionTrigger};
use crate::sync::{Effect, Emit, KeyedSet, PanelEvent, Reducer, SessionStatus};
use crate::util::next_path;

const ROOT: &str = "/";

/// FTP manager panel: stored profiles, the single live session and the
/// current directory listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FtpState {
    pub profiles: KeyedSet<FtpProfile>,
    pub sessions: BTreeMap<String, SessionInfo>,
    pub active_profile: Option<String>,
    pub current_host: Option<String>,
    pub cwd: String,
    pub files: KeyedSet<FileEntry>,
    /// A listing request is in flight.
    pub loading: bool,
    pub transfer: Option<TransferProgress>,
    pub last_message: Option<String>,
    pub last_error: Option<String>,
}

impl Default for FtpState {
    fn default() -> Self {
        Self {
            profiles: KeyedSet::new(),
            sessions: BTreeMap::new(),
            active_profile: None,
            current_host: None,
            cwd: ROOT.to_owned(),
            files: KeyedSet::new(),
            loading: false,
            transfer: None,
            last_message: None,
            last_error: None,
        }
    }
}

impl FtpState {
    pub fn set_profiles(&mut self, profiles: Vec<FtpProfile>) {
        self.profiles.replace_all(profiles);
        let profiles = &self.profiles;
        self.sessions.retain(|id, _| profiles.contains_key(id));
    }

    pub fn session(&self, profile_id: &str) -> Option<&SessionInfo> {
        self.sessions.get(profile_id)
    }

    pub fn session_state(&self, profile_id: &str) -> SessionState {
        self.session(profile_id).map(|s| s.state).unwrap_or_default()
    }

    /// The profile bound to the live session, if any.
    pub fn active(&self) -> Option<&FtpProfile> {
        self.active_profile
            .as_ref()
            .and_then(|id| self.profiles.get(id))
    }

    pub fn is_connected(&self) -> bool {
        self.active_profile
            .as_deref()
            .is_some_and(|id| self.session_state(id) == SessionState::Connected)
    }

    /// Guarded start of a connect. Refused while any FTP session is
    /// connecting or connected: the panel holds one session at a time.
    pub fn begin_connect(&mut self, profile_id: &str) -> Result<(), CoreError> {
        if !self.profiles.contains_key(&profile_id.to_owned()) {
            return Err(CoreError::ProfileNotFound {
                id: profile_id.to_owned(),
            });
        }
        if self.sessions.values().any(|s| s.state.is_live()) {
            return Err(CoreError::AlreadyActive {
                panel: PanelKind::Ftp,
            });
        }
        let session = self.sessions.entry(profile_id.to_owned()).or_default();
        if !session.begin() {
            return Err(CoreError::AlreadyActive {
                panel: PanelKind::Ftp,
            });
        }
        self.active_profile = Some(profile_id.to_owned());
        self.last_error = None;
        Ok(())
    }

    /// User asked to disconnect. Returns whether a session was live.
    pub fn begin_disconnect(&mut self) -> bool {
        let Some(id) = self.active_profile.clone() else {
            return false;
        };
        let was_live = self
            .sessions
            .get_mut(&id)
            .is_some_and(|s| {
                let live = s.state.is_live();
                s.apply(SessionTrigger::UserStop);
                s.active = false;
                live
            });
        self.clear_listing();
        was_live
    }

    /// Validate and normalize a listing request.
    pub fn request_list(&mut self, path: &str) -> Result<String, CoreError> {
        if !self.is_connected() {
            return Err(CoreError::NoActiveSession {
                panel: PanelKind::Ftp,
            });
        }
        let path = next_path(ROOT, path);
        self.loading = true;
        Ok(path)
    }

    /// Resolve a click on `name` in the current listing into the path to
    /// list next.
    pub fn navigate(&mut self, name: &str) -> Result<String, CoreError> {
        if !self.is_connected() {
            return Err(CoreError::NoActiveSession {
                panel: PanelKind::Ftp,
            });
        }
        if name != ".." && name != "." {
            let entry = self
                .files
                .get(&name.to_owned())
                .ok_or_else(|| CoreError::validation(format!("no entry named {name} in {}", self.cwd)))?;
            if !entry.is_dir() {
                return Err(CoreError::validation(format!("{name} is not a directory")));
            }
        }
        let path = next_path(&self.cwd, name);
        self.loading = true;
        Ok(path)
    }

    /// A directory listing arrived. Returns whether it was applied.
    pub fn on_directory(&mut self, path: String, files: Vec<FileEntry>) -> bool {
        if !self.is_connected() {
            debug!(%path, "listing for a session no longer active, ignoring");
            return false;
        }
        self.cwd = next_path(ROOT, &path);
        self.files.replace_all(files);
        self.loading = false;
        true
    }

    pub fn on_transfer(&mut self, progress: TransferProgress) {
        self.transfer = Some(progress);
    }

    fn clear_listing(&mut self) {
        self.active_profile = None;
        self.current_host = None;
        self.cwd = ROOT.to_owned();
        self.files.clear();
        self.loading = false;
        self.transfer = None;
    }

    fn on_connected(&mut self, message: Option<String>, target: Option<String>) -> Vec<Effect> {
        let Some(id) = self.active_profile.clone() else {
            warn!(host = ?target, "ftp connected without a pending profile, ignoring");
            return Vec::new();
        };
        let host = target.or_else(|| self.profiles.get(&id).map(|p| p.host.clone()));
        let session = self.sessions.entry(id).or_default();
        let fresh = session.state != SessionState::Connected;
        session.confirm();

        self.current_host = host;
        self.last_error = None;
        self.cwd = ROOT.to_owned();
        self.loading = true;

        let mut effects = vec![Effect::Emit(Emit {
            event: outbound::FTP_LIST_DIR,
            payload: json!({ "path": ROOT }),
        })];
        if fresh {
            effects.push(Effect::Notify(Notification::success(
                "FTP connected",
                message.unwrap_or_else(|| {
                    format!("Connected to {}", self.current_host.as_deref().unwrap_or("server"))
                }),
            )));
        }
        effects
    }

    fn on_disconnected(&mut self, message: Option<String>) -> Vec<Effect> {
        let was_live = self.is_connected();
        if let Some(session) = self
            .active_profile
            .as_ref()
            .and_then(|id| self.sessions.get_mut(id))
        {
            session.drop_session();
        }
        self.clear_listing();
        match message {
            Some(text) if was_live => {
                vec![Effect::Notify(Notification::info("FTP disconnected", text))]
            }
            _ => Vec::new(),
        }
    }
}

impl Reducer for FtpState {
    type Item = FileEntry;

    fn apply(&mut self, event: PanelEvent<FileEntry>) -> Vec<Effect> {
        match event {
            PanelEvent::Status {
                state: SessionStatus::Connected,
                message,
                target,
            } => self.on_connected(message, target),
            PanelEvent::Status {
                state: SessionStatus::Disconnected,
                message,
                ..
            } => self.on_disconnected(message),
            PanelEvent::Status {
                state: SessionStatus::Connecting,
                ..
            }
            | PanelEvent::Progress(_)
            | PanelEvent::Complete { .. }
            | PanelEvent::Stopped { .. } => Vec::new(),
            PanelEvent::Item(entry) => {
                if self.is_connected() {
                    self.files.upsert(entry);
                }
                Vec::new()
            }
            PanelEvent::Listing { items, .. } => {
                if self.is_connected() {
                    self.files.replace_all(items);
                    self.loading = false;
                }
                Vec::new()
            }
            PanelEvent::Error { message, .. } => {
                if let Some(session) = self
                    .active_profile
                    .take()
                    .and_then(|id| self.sessions.get_mut(&id))
                {
                    session.fail(&message);
                }
                self.loading = false;
                self.transfer = None;
                self.last_error = Some(message.clone());
                vec![Effect::Notify(Notification::error("FTP error", message))]
            }
            PanelEvent::Notice { message, .. } => {
                self.last_message = Some(message.clone());
                if message.is_empty() {
                    Vec::new()
                } else {
                    vec![Effect::Notify(Notification::info("FTP", message))]
                }
            }
            PanelEvent::Reset => {
                let profiles = std::mem::take(&mut self.profiles);
                *self = Self {
                    profiles,
                    ..Self::default()
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
        self.clear_listing();
    }
}
