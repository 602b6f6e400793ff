//! Mail command handlers.

use std::fmt::Write as _;
use std::time::Duration;

use secrecy::SecretString;
use tabled::Tabled;

use nethawk_config::SecretKind;
use nethawk_core::util::format_file_size;
use nethawk_core::{
    Command as CoreCommand, CommandResult, Dashboard, EmailContent, MailMessage, MailProfile,
    MailUid, NewMailProfile, NotifyLevel, PanelKind,
};

use crate::cli::{GlobalOpts, MailArgs, MailCommand, MailProfilesCommand};
use crate::config::{self, Resolved};
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
    #[tabled(rename = "IMAP")]
    imap: String,
    #[tabled(rename = "SMTP")]
    smtp: String,
    #[tabled(rename = "User")]
    username: String,
}

impl From<&MailProfile> for ProfileRow {
    fn from(p: &MailProfile) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            imap: format!("{}:{}", p.imap_host, p.imap_port),
            smtp: format!("{}:{}", p.smtp_host, p.smtp_port),
            username: p.username.clone(),
        }
    }
}

#[derive(Tabled)]
struct MessageRow {
    #[tabled(rename = "UID")]
    uid: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&MailMessage> for MessageRow {
    fn from(m: &MailMessage) -> Self {
        Self {
            uid: m.uid.to_string(),
            from: util::truncate(&m.from, 32),
            subject: util::truncate(&m.subject, 48),
            date: m.date.clone(),
        }
    }
}

fn detail(email: &EmailContent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "UID:      {}", email.uid);
    let _ = writeln!(out, "From:     {}", email.from);
    let _ = writeln!(out, "To:       {}", email.to);
    if !email.cc.is_empty() {
        let _ = writeln!(out, "Cc:       {}", email.cc);
    }
    let _ = writeln!(out, "Date:     {}", email.date);
    let _ = writeln!(out, "Subject:  {}", email.subject);
    for a in &email.attachments {
        let _ = writeln!(
            out,
            "Attached: {} ({}, {})",
            a.filename,
            a.content_type,
            format_file_size(a.size)
        );
    }
    let _ = writeln!(out);
    out.push_str(email.display_body().trim_end());
    out
}

// ── Session helpers ─────────────────────────────────────────────────

/// Connect `profile_id` and wait for its first inbox page.
async fn open_session(
    dashboard: &Dashboard,
    profile_id: &str,
    password: SecretString,
    limit: Duration,
) -> Result<(), CliError> {
    dashboard
        .execute(CoreCommand::MailConnect {
            profile_id: profile_id.to_owned(),
            password,
        })
        .await?;
    // Connecting requests the first page on its own.
    wait_listing(dashboard, profile_id, limit, "mail connect").await
}

/// Wait until the active session's inbox request has been answered.
async fn wait_listing(
    dashboard: &Dashboard,
    profile_id: &str,
    limit: Duration,
    what: &str,
) -> Result<(), CliError> {
    let mut rx = dashboard.mail();
    util::wait_until(&mut rx, limit, what, |mail| {
        match util::session_outcome(mail.session(profile_id), what)? {
            Ok(()) if mail.loading => None,
            outcome => Some(outcome),
        }
    })
    .await
}

async fn close_session(dashboard: &Dashboard) {
    if let Err(e) = dashboard.execute(CoreCommand::MailDisconnect).await {
        tracing::debug!(error = %e, "mail disconnect failed");
    }
}

fn mail_password(
    flag: Option<String>,
    resolved: &Resolved,
    profile_id: &str,
) -> Result<SecretString, CliError> {
    config::password(SecretKind::Mail, flag, resolved, profile_id)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(args: MailArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Profiles ────────────────────────────────────────────────
        MailCommand::Profiles(profiles_args) => match profiles_args.command {
            MailProfilesCommand::List => {
                let resolved = config::resolve(global, false)?;
                let profiles = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                    dashboard.execute(CoreCommand::RefreshProfiles).await?;
                    let mail = dashboard.mail().borrow().clone();
                    Ok(mail.profiles.values())
                })
                .await?;

                let out = output::render_list(&global.output, &profiles, |x| ProfileRow::from(x), |p| {
                    p.id.clone()
                })?;
                output::print_output(&out, global.quiet);
                Ok(())
            }

            MailProfilesCommand::Add {
                name,
                imap_host,
                imap_port,
                smtp_host,
                smtp_port,
                username,
                password,
            } => {
                let resolved = config::resolve(global, false)?;
                let password = match password {
                    Some(p) => SecretString::from(p),
                    None => SecretString::from(rpassword::prompt_password("Account password: ")?),
                };
                let profile = NewMailProfile {
                    name,
                    imap_host,
                    imap_port,
                    smtp_host,
                    smtp_port,
                    username,
                    password,
                };

                let created = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                    match dashboard.execute(CoreCommand::AddMailProfile(profile)).await? {
                        CommandResult::MailProfile(p) => Ok(p),
                        other => Err(CliError::ApiError {
                            message: format!("unexpected result: {other:?}"),
                            status: None,
                        }),
                    }
                })
                .await?;

                let out = output::render_single(
                    &global.output,
                    &created,
                    |p| format!("Created mail profile '{}' (id {})", p.name, p.id),
                    |p| p.id.clone(),
                )?;
                output::print_output(&out, global.quiet);
                Ok(())
            }

            MailProfilesCommand::Delete { id } => {
                let prompt = format!("Delete mail profile {id}?");
                if !util::confirm("mail profiles delete", &prompt, global.yes)? {
                    return Ok(());
                }
                let resolved = config::resolve(global, false)?;
                let message = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                    match dashboard
                        .execute(CoreCommand::DeleteMailProfile { id: id.clone() })
                        .await
                    {
                        Ok(CommandResult::Message(m)) => Ok(m),
                        Ok(_) => Ok(format!("Deleted mail profile {id}")),
                        Err(nethawk_core::CoreError::ProfileNotFound { id }) => {
                            Err(CliError::NotFound {
                                resource_type: "mail profile".into(),
                                identifier: id,
                                list_command: "mail profiles list".into(),
                            })
                        }
                        Err(e) => Err(e.into()),
                    }
                })
                .await?;
                if !global.quiet {
                    eprintln!("✓ {message}");
                }
                Ok(())
            }
        },

        // ── Inbox ───────────────────────────────────────────────────
        MailCommand::Inbox {
            profile_id,
            page,
            per_page,
            mailbox,
            password,
        } => {
            let mut resolved = config::resolve(global, true)?;
            if let Some(n) = per_page {
                resolved.dashboard.mail_per_page = n.max(1);
            }
            if let Some(mb) = mailbox {
                resolved.dashboard.mailbox = mb;
            }
            let secret = mail_password(password, &resolved, &profile_id)?;
            let limit = resolved.dashboard.timeout;

            let mail = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                let _mail_handler = dashboard.subscribe(PanelKind::Mail);
                let opened = open_session(&dashboard, &profile_id, secret, limit).await;

                let listed = match opened {
                    Ok(()) if page > 1 => {
                        dashboard.execute(CoreCommand::MailFetchInbox { page }).await?;
                        wait_listing(&dashboard, &profile_id, limit, "inbox page").await
                    }
                    outcome => outcome,
                };

                let mail = dashboard.mail().borrow().clone();
                close_session(&dashboard).await;
                listed?;
                Ok(mail)
            })
            .await?;

            // Newest first.
            let mut messages = mail.inbox.values();
            messages.sort_by(|a, b| b.uid.cmp(&a.uid));

            if output::interactive(&global.output, global.quiet) {
                eprintln!(
                    "{}: page {} of {} ({} messages)",
                    mail.mailbox,
                    mail.page,
                    mail.total_pages().max(1),
                    mail.total_count
                );
            }
            let out = output::render_list(&global.output, &messages, |x| MessageRow::from(x), |m| {
                m.uid.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Read ────────────────────────────────────────────────────
        MailCommand::Read {
            profile_id,
            uid,
            mailbox,
            password,
        } => {
            let mut resolved = config::resolve(global, true)?;
            if let Some(mb) = mailbox {
                resolved.dashboard.mailbox = mb;
            }
            let secret = mail_password(password, &resolved, &profile_id)?;
            let limit = resolved.dashboard.timeout;
            let uid = MailUid::new(uid);

            let email = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                let _mail_handler = dashboard.subscribe(PanelKind::Mail);
                let mut rx = dashboard.mail();

                let fetched = match open_session(&dashboard, &profile_id, secret, limit).await {
                    Ok(()) => {
                        dashboard
                            .execute(CoreCommand::MailGetContent { uid: uid.clone() })
                            .await?;
                        util::wait_until(&mut rx, limit, "message content", |mail| {
                            if let Some(email) = mail.selected_email.as_ref() {
                                if email.uid == uid {
                                    return Some(Ok(email.clone()));
                                }
                            }
                            match util::session_outcome(mail.session(&profile_id), "mail read")? {
                                Ok(()) => None,
                                Err(e) => Some(Err(e)),
                            }
                        })
                        .await
                    }
                    Err(e) => Err(e),
                };

                close_session(&dashboard).await;
                fetched
            })
            .await?;

            let out = output::render_single(&global.output, &email, detail, |e| e.uid.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Send test ───────────────────────────────────────────────
        MailCommand::SendTest {
            profile_id,
            to,
            subject,
            body,
            password,
        } => {
            let resolved = config::resolve(global, true)?;
            let secret = mail_password(password, &resolved, &profile_id)?;
            let limit = resolved.dashboard.timeout;

            let reply = util::with_dashboard(resolved.dashboard, |dashboard| async move {
                let _mail_handler = dashboard.subscribe(PanelKind::Mail);
                let mut notes = dashboard.notifications();
                dashboard
                    .execute(CoreCommand::MailSendTest {
                        profile_id: Some(profile_id),
                        recipient: to,
                        subject,
                        body,
                        password: secret,
                    })
                    .await?;
                util::wait_notification(&mut notes, limit, "test send", &["Mail", "Mail error"])
                    .await
            })
            .await?;

            if reply.level == NotifyLevel::Error {
                return Err(CliError::SessionFailed {
                    what: "Test send".into(),
                    message: reply.message,
                });
            }
            if !global.quiet {
                eprintln!("✓ {}", reply.message);
            }
            Ok(())
        }
    }
}
