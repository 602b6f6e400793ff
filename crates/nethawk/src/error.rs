//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use nethawk_config::ConfigError;
use nethawk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(nethawk::connection_failed),
        help(
            "Check that the NetHawk backend is running and reachable.\n\
             URL: {url}\n\
             Override it with --backend or: nethawk config init"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Not connected to the backend")]
    #[diagnostic(
        code(nethawk::not_connected),
        help("The push channel is down or was never opened. Retry, or run with -v for details.")
    )]
    NotConnected,

    #[error("{what} failed: {message}")]
    #[diagnostic(code(nethawk::session_failed))]
    SessionFailed { what: String, message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nethawk::not_found),
        help("Run: nethawk {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{what} is already connecting or connected")]
    #[diagnostic(code(nethawk::conflict))]
    Conflict { what: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(nethawk::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nethawk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nethawk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: nethawk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(nethawk::config),
        help("Check the file shown by: nethawk config path")
    )]
    Config(String),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(nethawk::keyring),
        help("Set NETHAWK_FTP_PASSWORD / NETHAWK_MAIL_PASSWORD instead, or pass --password.")
    )]
    Keyring(String),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(nethawk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("No password available for {kind} profile '{profile_id}'")]
    #[diagnostic(
        code(nethawk::no_password),
        help(
            "Pass --password, set {env_var}, or store one with:\n\
             nethawk config set-password {kind} {profile_id}"
        )
    )]
    NoPassword {
        kind: String,
        profile_id: String,
        env_var: String,
    },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Timed out after {seconds}s waiting for {what}")]
    #[diagnostic(
        code(nethawk::timeout),
        help("Increase the limit with --timeout or check backend responsiveness.")
    )]
    Timeout { what: String, seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(nethawk::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::NotConnected => exit_code::CONNECTION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoPassword { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::NotConnected => CliError::NotConnected,

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                what: "the backend".into(),
                seconds: timeout_secs,
            },

            CoreError::AlreadyActive { panel } => CliError::Conflict {
                what: format!("{panel} session"),
            },

            CoreError::NoActiveSession { panel } => CliError::SessionFailed {
                what: format!("{panel} request"),
                message: "no active session".into(),
            },

            CoreError::ProfileNotFound { id } => CliError::NotFound {
                resource_type: "profile".into(),
                identifier: id,
                list_command: "ftp profiles / mail profiles list".into(),
            },

            CoreError::NotFound { message } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: message,
                list_command: "--help".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nethawk_core::PanelKind;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let cases: Vec<(CoreError, i32)> = vec![
            (
                CoreError::ConnectionFailed {
                    url: "http://localhost:5000".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::NotConnected, exit_code::CONNECTION),
            (
                CoreError::AlreadyActive {
                    panel: PanelKind::Ftp,
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::ProfileNotFound { id: "7".into() },
                exit_code::NOT_FOUND,
            ),
            (CoreError::validation("bad port"), exit_code::USAGE),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
        ];
        for (core, code) in cases {
            let rendered = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{rendered}");
        }
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "lab".into(),
            available: vec!["default".into(), "home".into()],
        });
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "default, home"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
