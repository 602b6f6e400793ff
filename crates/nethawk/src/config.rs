//! CLI configuration -- thin wrapper around `nethawk_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--backend, --timeout, --insecure).

use secrecy::SecretString;

use nethawk_config::{Config, Profile, SecretKind};
use nethawk_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use nethawk_config::{config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Everything a command needs to reach the backend.
pub struct Resolved {
    pub profile: Profile,
    pub dashboard: DashboardConfig,
}

/// Translate the active profile + global flags into a `DashboardConfig`.
///
/// CLI flag overrides take priority over profile values. `push` selects
/// whether the push channel is opened on connect.
pub fn resolve(global: &GlobalOpts, push: bool) -> Result<Resolved, CliError> {
    let cfg = nethawk_config::load_config()?;
    let name = active_profile_name(global, &cfg);
    let mut profile = cfg.profile(&name)?;

    // 1. Backend URL (flag > env > profile > defaults)
    if let Some(ref url) = global.backend {
        profile.backend_url = Some(url.clone());
    }

    // 2. TLS and timeout
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }

    let mut dashboard = cfg.dashboard_config(&profile)?;
    dashboard.push_enabled = push;
    tracing::debug!(
        profile = %name,
        backend = %dashboard.backend_url,
        push,
        "resolved dashboard config"
    );
    Ok(Resolved { profile, dashboard })
}

/// Resolve a connect password: flag, then env/keyring, then a prompt.
pub fn password(
    kind: SecretKind,
    flag: Option<String>,
    resolved: &Resolved,
    profile_id: &str,
) -> Result<SecretString, CliError> {
    if let Some(value) = flag {
        return Ok(SecretString::from(value));
    }
    if let Some(secret) = nethawk_config::resolve_password(kind, &resolved.profile, profile_id) {
        return Ok(secret);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NoPassword {
            kind: kind.to_string(),
            profile_id: profile_id.into(),
            env_var: kind.env_var().into(),
        });
    }
    let entered = rpassword::prompt_password(format!("{kind} password for profile {profile_id}: "))?;
    Ok(SecretString::from(entered))
}
