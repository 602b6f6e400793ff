//! Shared configuration for the NetHawk CLI and TUI.
//!
//! TOML settings layered with environment overrides, backend profiles,
//! secret resolution for FTP/mail connects (env + keyring), and
//! translation to `nethawk_core::DashboardConfig`. Both binaries depend
//! on this crate; the CLI adds flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nethawk_core::{DashboardConfig, ReconnectPolicy};

/// Keyring service name for stored connection passwords.
pub const KEYRING_SERVICE: &str = "nethawk";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in configuration")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub reconnect: ReconnectSettings,

    #[serde(default)]
    pub bandwidth: BandwidthSettings,

    #[serde(default)]
    pub mail: MailSettings,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            reconnect: ReconnectSettings::default(),
            bandwidth: BandwidthSettings::default(),
            mail: MailSettings::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:5000".into()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Push-channel reconnect backoff.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReconnectSettings {
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
    /// Absent means retry forever.
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
            max_retries: None,
        }
    }
}

fn default_initial_ms() -> u64 {
    1_000
}
fn default_max_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BandwidthSettings {
    /// Samples kept for the chart.
    #[serde(default = "default_history")]
    pub history: usize,
}

impl Default for BandwidthSettings {
    fn default() -> Self {
        Self {
            history: default_history(),
        }
    }
}

fn default_history() -> usize {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MailSettings {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_mailbox")]
    pub mailbox: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            mailbox: default_mailbox(),
        }
    }
}

fn default_per_page() -> u32 {
    10
}
fn default_mailbox() -> String {
    "INBOX".into()
}

/// A named backend profile. Unset fields fall back to `[defaults]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    pub backend_url: Option<String>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,

    /// Environment variable holding FTP connect passwords.
    pub ftp_password_env: Option<String>,

    /// Environment variable holding mail connect passwords.
    pub mail_password_env: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "nethawk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for TUI log files.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", "nethawk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("logs");
            p
        },
        |dirs| dirs.data_local_dir().to_path_buf(),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nethawk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// `NETHAWK_` variables override file values; `__` separates nesting,
/// e.g. `NETHAWK_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETHAWK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Name of the profile to use: explicit choice, then `default_profile`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile. The implicit `default` profile always exists.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profiles.keys().cloned().collect(),
            }),
        }
    }

    /// Build a `DashboardConfig` for `profile` with no flag overrides.
    pub fn dashboard_config(&self, profile: &Profile) -> Result<DashboardConfig, ConfigError> {
        let raw = profile
            .backend_url
            .as_deref()
            .unwrap_or(&self.defaults.backend_url);
        let url = parse_backend_url(raw)?;

        let mut config = DashboardConfig::new(url);
        config.timeout = Duration::from_secs(profile.timeout.unwrap_or(self.defaults.timeout));
        config.insecure = profile.insecure.unwrap_or(self.defaults.insecure);
        config.reconnect = ReconnectPolicy {
            initial_delay: Duration::from_millis(self.reconnect.initial_ms),
            max_delay: Duration::from_millis(self.reconnect.max_ms.max(self.reconnect.initial_ms)),
            max_retries: self.reconnect.max_retries,
        };
        config.bandwidth_history = self.bandwidth.history.max(1);
        config.mail_per_page = self.mail.per_page.max(1);
        config.mailbox.clone_from(&self.mail.mailbox);
        Ok(config)
    }
}

/// Parse a backend root URL. Only `http` and `https` are accepted.
pub fn parse_backend_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.trim().parse().map_err(|_| ConfigError::Validation {
        field: "backend_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "backend_url".into(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

// ── Secret resolution ───────────────────────────────────────────────

/// Which kind of connection a password unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SecretKind {
    Ftp,
    Mail,
}

impl SecretKind {
    /// Shared fallback environment variable.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Ftp => "NETHAWK_FTP_PASSWORD",
            Self::Mail => "NETHAWK_MAIL_PASSWORD",
        }
    }

    /// Keyring account under [`KEYRING_SERVICE`].
    pub fn keyring_account(self, profile_id: &str) -> String {
        format!("{self}/{profile_id}")
    }
}

/// Resolve a connect password without prompting.
///
/// Order: the profile's `*_password_env` variable, the shared
/// `NETHAWK_{FTP,MAIL}_PASSWORD` variable, then the system keyring.
/// `None` means the caller must ask the user.
pub fn resolve_password(
    kind: SecretKind,
    profile: &Profile,
    profile_id: &str,
) -> Option<SecretString> {
    let override_env = match kind {
        SecretKind::Ftp => profile.ftp_password_env.as_deref(),
        SecretKind::Mail => profile.mail_password_env.as_deref(),
    };

    // 1. Profile-specific env var, then the shared one
    for name in override_env.into_iter().chain(std::iter::once(kind.env_var())) {
        if let Ok(val) = std::env::var(name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_account(profile_id))
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Store a connect password in the system keyring.
pub fn store_password(kind: SecretKind, profile_id: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_account(profile_id))?;
    entry.set_password(secret)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.backend_url, "http://localhost:5000");
        assert_eq!(cfg.mail.per_page, 10);
        assert_eq!(cfg.bandwidth.history, 30);
    }

    #[test]
    fn file_values_and_profiles_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 12

[mail]
per_page = 25

[profiles.lab]
backend_url = "https://hawk.lab:8443/"
insecure = true
mail_password_env = "LAB_MAIL_PW"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        let name = cfg.active_profile_name(None);
        assert_eq!(name, "lab");

        let profile = cfg.profile(&name).unwrap();
        let dash = cfg.dashboard_config(&profile).unwrap();
        assert_eq!(dash.backend_url.as_str(), "https://hawk.lab:8443/");
        assert!(dash.insecure);
        assert_eq!(dash.timeout, Duration::from_secs(12));
        assert_eq!(dash.mail_per_page, 25);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                backend_url: Some("http://10.0.0.2:5000".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profiles["default"].backend_url.as_deref(),
            Some("http://10.0.0.2:5000")
        );
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), Profile::default());
        match cfg.profile("prod") {
            Err(ConfigError::ProfileNotFound { available, .. }) => {
                assert_eq!(available, vec!["lab".to_owned()]);
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
        assert!(cfg.profile("default").is_ok());
    }

    #[test]
    fn backend_url_scheme_is_checked() {
        assert!(parse_backend_url("ftp://example.com").is_err());
        assert!(parse_backend_url("not a url").is_err());
        assert!(parse_backend_url(" http://localhost:5000 ").is_ok());
    }

    #[test]
    fn keyring_accounts_are_namespaced() {
        assert_eq!(SecretKind::Ftp.keyring_account("7"), "ftp/7");
        assert_eq!(SecretKind::Mail.keyring_account("m-1"), "mail/m-1");
    }
}
