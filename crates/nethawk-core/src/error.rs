// ── Core error types ──
//
// User-facing errors from nethawk-core. Consumers never see raw HTTP
// status mapping or Socket.IO framing problems directly; the
// `From<nethawk_api::Error>` impl folds them into these variants.

use thiserror::Error;

use crate::panel::PanelKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Not connected to the backend")]
    NotConnected,

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Session errors ───────────────────────────────────────────────
    /// The client-side connect guard refused a duplicate session.
    #[error("{panel} session is already connecting or connected")]
    AlreadyActive { panel: PanelKind },

    #[error("No active {panel} session")]
    NoActiveSession { panel: PanelKind },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Profile not found: {id}")]
    ProfileNotFound { id: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` for failures a user retry may fix.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::NotConnected | Self::Timeout { .. } => true,
            Self::Api { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ProfileNotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nethawk_api::Error> for CoreError {
    fn from(err: nethawk_api::Error) -> Self {
        match err {
            nethawk_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            nethawk_api::Error::InvalidUrl(e) => CoreError::ValidationFailed {
                message: format!("invalid backend URL: {e}"),
            },
            nethawk_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            nethawk_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            nethawk_api::Error::NotFound { message } => CoreError::NotFound { message },
            nethawk_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: "push channel".into(),
                reason,
            },
            nethawk_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: "push channel".into(),
                reason: format!("closed with code {code}: {reason}"),
            },
            nethawk_api::Error::Protocol(message) => {
                CoreError::Internal(format!("push channel protocol error: {message}"))
            }
            nethawk_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response from backend: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_backend_message() {
        let err: CoreError = nethawk_api::Error::Api {
            status: 400,
            message: "Missing required fields".into(),
        }
        .into();
        assert_eq!(err.to_string(), "API error: Missing required fields");
        assert!(!err.is_transient());
    }

    #[test]
    fn not_found_maps_through() {
        let err: CoreError = nethawk_api::Error::NotFound {
            message: "Connection not found".into(),
        }
        .into();
        assert!(err.is_not_found());
    }

    #[test]
    fn server_errors_are_transient() {
        let err: CoreError = nethawk_api::Error::Api {
            status: 503,
            message: "busy".into(),
        }
        .into();
        assert!(err.is_transient());
    }
}
