//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input};

use nethawk_config::{Config, Profile, SecretKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretTarget};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "backend_url = \"{}\"", cfg.defaults.backend_url);
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let _ = writeln!(out);
    let _ = writeln!(out, "[reconnect]");
    let _ = writeln!(out, "initial_ms = {}", cfg.reconnect.initial_ms);
    let _ = writeln!(out, "max_ms = {}", cfg.reconnect.max_ms);
    if let Some(n) = cfg.reconnect.max_retries {
        let _ = writeln!(out, "max_retries = {n}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "[bandwidth]");
    let _ = writeln!(out, "history = {}", cfg.bandwidth.history);

    let _ = writeln!(out);
    let _ = writeln!(out, "[mail]");
    let _ = writeln!(out, "per_page = {}", cfg.mail.per_page);
    let _ = writeln!(out, "mailbox = \"{}\"", cfg.mail.mailbox);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref url) = p.backend_url {
            let _ = writeln!(out, "backend_url = \"{url}\"");
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref env) = p.ftp_password_env {
            let _ = writeln!(out, "ftp_password_env = \"{env}\"");
        }
        if let Some(ref env) = p.mail_password_env {
            let _ = writeln!(out, "mail_password_env = \"{env}\"");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

impl From<SecretTarget> for SecretKind {
    fn from(target: SecretTarget) -> Self {
        match target {
            SecretTarget::Ftp => Self::Ftp,
            SecretTarget::Mail => Self::Mail,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("NetHawk CLI configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = nethawk_config::load_config()?;

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(config::active_profile_name(global, &cfg))
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Backend URL
            let current = cfg.profile(&profile_name).unwrap_or_default();
            let backend: String = Input::new()
                .with_prompt("Backend URL")
                .default(
                    current
                        .backend_url
                        .clone()
                        .unwrap_or_else(|| cfg.defaults.backend_url.clone()),
                )
                .validate_with(|input: &String| {
                    nethawk_config::parse_backend_url(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            // 3. TLS
            let insecure = Confirm::new()
                .with_prompt("Accept self-signed certificates?")
                .default(current.insecure.unwrap_or(false))
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                backend_url: Some(backend),
                insecure: insecure.then_some(true),
                ..current
            };
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: nethawk overview");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set password ────────────────────────────────────────────
        ConfigCommand::SetPassword { kind, profile_id } => {
            let kind = SecretKind::from(kind);
            let secret = rpassword::prompt_password(format!(
                "{kind} password for profile {profile_id}: "
            ))
            .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            nethawk_config::store_password(kind, &profile_id, &secret)?;
            eprintln!("✓ {kind} password for profile {profile_id} stored in system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_config_lists_sections_and_profiles() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                backend_url: Some("http://10.0.0.5:5000".into()),
                mail_password_env: Some("LAB_MAIL_PW".into()),
                ..Profile::default()
            },
        );
        let text = format_config(&cfg);
        assert!(text.contains("[defaults]"));
        assert!(text.contains("backend_url = \"http://localhost:5000\""));
        assert!(text.contains("[profiles.lab]"));
        assert!(text.contains("mail_password_env = \"LAB_MAIL_PW\""));
    }
}
