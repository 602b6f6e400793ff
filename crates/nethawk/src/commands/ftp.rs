//! FTP command handlers.

use std::io::Read;

use tabled::Tabled;

use nethawk_config::SecretKind;
use nethawk_core::util::{format_file_size, parse_list_line};
use nethawk_core::{Command as CoreCommand, FileEntry, FtpProfile, PanelKind};

use crate::cli::{FtpArgs, FtpCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "User")]
    username: String,
}

impl From<&FtpProfile> for ProfileRow {
    fn from(p: &FtpProfile) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            endpoint: p.endpoint(),
            username: p.username.clone(),
        }
    }
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

impl From<&FileEntry> for FileRow {
    fn from(f: &FileEntry) -> Self {
        let name = match &f.link_target {
            Some(target) => format!("{} -> {target}", f.name),
            None if f.is_dir() => format!("{}/", f.name),
            None => f.name.clone(),
        };
        Self {
            name,
            kind: f.kind.to_string(),
            size: if f.is_dir() {
                "-".into()
            } else {
                format_file_size(f.size)
            },
            modified: f.modified.clone(),
            permissions: f.permissions.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: FtpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FtpCommand::Profiles => {
            let resolved = config::resolve(global, false)?;
            let profiles = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                dashboard.execute(CoreCommand::RefreshProfiles).await?;
                let ftp = dashboard.ftp().borrow().clone();
                Ok(ftp.profiles.values())
            })
            .await?;

            let out = output::render_list(&global.output, &profiles, |x| ProfileRow::from(x), |p| {
                p.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FtpCommand::Ls {
            profile_id,
            path,
            password,
        } => {
            let resolved = config::resolve(global, true)?;
            let secret = config::password(SecretKind::Ftp, password, &resolved, &profile_id)?;
            let limit = resolved.dashboard.timeout;

            let (cwd, files) = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                let _ftp_handler = dashboard.subscribe(PanelKind::Ftp);
                let mut rx = dashboard.ftp();

                dashboard
                    .execute(CoreCommand::FtpConnect {
                        profile_id: profile_id.clone(),
                        password: secret,
                    })
                    .await?;

                // Connecting lists the root on its own.
                let listed = util::wait_until(&mut rx, limit, "FTP connect", |ftp| {
                    match util::session_outcome(ftp.session(&profile_id), "FTP connect")? {
                        Ok(()) if ftp.loading => None,
                        outcome => Some(outcome),
                    }
                })
                .await;

                let listed = match (listed, path) {
                    (Ok(()), Some(path)) => {
                        dashboard.execute(CoreCommand::FtpListDir { path }).await?;
                        util::wait_until(&mut rx, limit, "directory listing", |ftp| {
                            match util::session_outcome(ftp.session(&profile_id), "FTP listing")? {
                                Ok(()) if ftp.loading => None,
                                outcome => Some(outcome),
                            }
                        })
                        .await
                    }
                    (outcome, _) => outcome,
                };

                let ftp = rx.borrow().clone();
                if let Err(e) = dashboard.execute(CoreCommand::FtpDisconnect).await {
                    tracing::debug!(error = %e, "ftp disconnect failed");
                }
                listed?;
                Ok((ftp.cwd.clone(), ftp.files.values()))
            })
            .await?;

            if output::interactive(&global.output, global.quiet) {
                eprintln!("{cwd}");
            }
            let out = output::render_list(&global.output, &files, |x| FileRow::from(x), |f| {
                f.name.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FtpCommand::Parse { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let files: Vec<FileEntry> = raw.lines().filter_map(parse_list_line).collect();
            tracing::debug!(entries = files.len(), "parsed raw listing");

            let out = output::render_list(&global.output, &files, |x| FileRow::from(x), |f| {
                f.name.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
