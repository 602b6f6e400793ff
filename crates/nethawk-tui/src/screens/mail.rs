//! Mail checker screen: accounts, a paged inbox and a reading pane.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState, Wrap};
use throbber_widgets_tui::ThrobberState;

use nethawk_config::SecretKind;
use nethawk_core::projection::project_inbox;
use nethawk_core::util::format_file_size;
use nethawk_core::{Command, EmailContent, MailMessage, MailState};

use crate::action::{Action, PendingSecret};
use crate::component::Component;
use crate::theme;
use crate::widgets::field::{Field, FieldEvent, render_prompt};
use crate::widgets::{self, clamp_cursor, hint_line, placeholder, session_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Profiles,
    Inbox,
}

enum Prompt {
    Password(PendingSecret, Field),
    Recipient { profile_id: String, field: Field },
}

pub struct MailScreen {
    state: Arc<MailState>,
    focus: Pane,
    profile_cursor: usize,
    message_cursor: usize,
    reading: bool,
    scroll: u16,
    prompt: Option<Prompt>,
    spinner: ThrobberState,
}

impl MailScreen {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MailState::default()),
            focus: Pane::Profiles,
            profile_cursor: 0,
            message_cursor: 0,
            reading: false,
            scroll: 0,
            prompt: None,
            spinner: ThrobberState::default(),
        }
    }

    /// Newest first.
    fn messages(&self) -> Vec<&MailMessage> {
        project_inbox(&self.state).items().iter().rev().collect()
    }

    fn selected_profile(&self) -> Option<String> {
        self.state
            .profiles
            .as_slice()
            .get(self.profile_cursor)
            .map(|p| p.id.clone())
    }

    /// Test sends go through the live session, else the highlighted profile.
    fn send_profile(&self) -> Option<String> {
        self.state.active.clone().or_else(|| self.selected_profile())
    }

    fn page_action(&self, page: u32) -> Option<Action> {
        (self.state.is_connected() && (1..=self.state.total_pages()).contains(&page))
            .then_some(Action::Execute(Command::MailFetchInbox { page }))
    }

    fn open_selected(&mut self) -> Option<Action> {
        match self.focus {
            Pane::Profiles => {
                let profile_id = self.selected_profile()?;
                Some(Action::WithSecret {
                    request: PendingSecret::MailConnect { profile_id },
                    password: None,
                })
            }
            Pane::Inbox => {
                let uid = self.messages().get(self.message_cursor)?.uid.clone();
                self.reading = true;
                self.scroll = 0;
                Some(Action::Execute(Command::MailGetContent { uid }))
            }
        }
    }

    fn move_cursor(&mut self, down: bool) {
        if self.reading {
            self.scroll = if down {
                self.scroll.saturating_add(1)
            } else {
                self.scroll.saturating_sub(1)
            };
            return;
        }
        let (cursor, len) = match self.focus {
            Pane::Profiles => (&mut self.profile_cursor, self.state.profiles.len()),
            Pane::Inbox => (&mut self.message_cursor, self.state.inbox.len()),
        };
        *cursor = if down {
            clamp_cursor(*cursor + 1, len)
        } else {
            cursor.saturating_sub(1)
        };
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<Action> {
        let event = match self.prompt.as_mut()? {
            Prompt::Password(_, field) | Prompt::Recipient { field, .. } => field.handle_key(key),
        };
        match event {
            FieldEvent::Submit => match self.prompt.take()? {
                Prompt::Password(request, field) => Some(Action::WithSecret {
                    request,
                    password: Some(field.value),
                }),
                Prompt::Recipient { profile_id, field } => {
                    let recipient = field.trimmed().to_owned();
                    if recipient.is_empty() {
                        return None;
                    }
                    Some(Action::WithSecret {
                        request: PendingSecret::MailSendTest {
                            profile_id,
                            recipient,
                        },
                        password: None,
                    })
                }
            },
            FieldEvent::Cancel => {
                self.prompt = None;
                None
            }
            FieldEvent::Edited | FieldEvent::Ignored => None,
        }
    }

    fn render_profiles(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Accounts", self.focus == Pane::Profiles && !self.reading);
        if self.state.profiles.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled(" No mail profiles. Press R to refresh.", theme::key_hint())),
                inner,
            );
            return;
        }

        let rows = self.state.profiles.iter().map(|p| {
            Row::new(vec![
                Line::from(Span::styled(p.name.clone(), theme::value())),
                Line::from(Span::styled(
                    format!("{} @ {}", p.username, p.imap_host),
                    theme::key_hint(),
                )),
                Line::from(session_span(self.state.session_state(&p.id))),
            ])
            .height(3)
            .style(theme::table_row())
        });
        let table = Table::new(rows, [Constraint::Min(10)])
            .block(block)
            .row_highlight_style(theme::table_selected());
        let mut table_state = TableState::default().with_selected(Some(self.profile_cursor));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_inbox(&self, frame: &mut Frame, area: Rect) {
        let s = &self.state;
        let mut title = format!("{} · page {}/{}", s.mailbox, s.page, s.total_pages());
        if let Some(ref summary) = s.summary {
            title.push_str(&format!(" · {} unread of {}", summary.unread, summary.total));
        }
        let block = widgets::panel(&title, self.focus == Pane::Inbox);
        let view = project_inbox(s);
        let messages = self.messages();
        if messages.is_empty() {
            frame.render_widget(block, area);
            let empty = if s.is_connected() {
                "Inbox is empty."
            } else {
                "Not connected. Select an account and press Enter."
            };
            placeholder::render(frame, area, &view, empty, &self.spinner);
            return;
        }

        let table = Table::new(
            messages.iter().map(|m| {
                Row::new(vec![
                    Cell::from(m.from.as_str()),
                    Cell::from(m.subject.as_str()),
                    Cell::from(m.date.as_str()),
                ])
                .style(theme::table_row())
            }),
            [Constraint::Length(28), Constraint::Min(20), Constraint::Length(22)],
        )
        .header(Row::new(["From", "Subject", "Date"]).style(theme::table_header()))
        .block(block)
        .row_highlight_style(theme::table_selected());
        let mut table_state = TableState::default().with_selected(Some(self.message_cursor));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_reader(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Message", true);
        let Some(ref email) = self.state.selected_email else {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled(" Loading message…", theme::key_hint())),
                inner,
            );
            return;
        };

        let text = reader_lines(email);
        frame.render_widget(
            Paragraph::new(text)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            area,
        );
    }

    fn status_line(&self) -> Line<'static> {
        let s = &self.state;
        if let Some(ref err) = s.last_error {
            return Line::from(Span::styled(format!(" ✗ {err}"), theme::error()));
        }
        match s.active_profile() {
            Some(p) => Line::from(vec![
                Span::raw(" "),
                session_span(s.session_state(&p.id)),
                Span::styled(format!("  {}", p.username), theme::value()),
                Span::styled(format!("  {} messages", s.total_count), theme::key_hint()),
            ]),
            None => Line::from(Span::styled(" No active session", theme::key_hint())),
        }
    }
}

fn header_line(label: &'static str, value: &str) -> Option<Line<'static>> {
    (!value.trim().is_empty()).then(|| {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), theme::label()),
            Span::styled(value.to_owned(), theme::value()),
        ])
    })
}

fn reader_lines(email: &EmailContent) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![Line::from(Span::styled(
        email.subject.clone(),
        Style::default()
            .fg(theme::HAWK_AMBER)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.extend(
        [
            ("From", email.from.as_str()),
            ("To", email.to.as_str()),
            ("Cc", email.cc.as_str()),
            ("Bcc", email.bcc.as_str()),
            ("Date", email.date.as_str()),
        ]
        .into_iter()
        .filter_map(|(label, value)| header_line(label, value)),
    );
    for a in &email.attachments {
        lines.push(Line::from(Span::styled(
            format!("attachment {} ({}, {})", a.filename, a.content_type, format_file_size(a.size)),
            Style::default().fg(theme::SKY_CYAN),
        )));
    }
    lines.push(Line::default());
    lines.extend(email.display_body().lines().map(|l| Line::from(l.to_owned())));
    lines
}

impl Component for MailScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.prompt.is_some() {
            return Ok(self.handle_prompt_key(key));
        }

        Ok(match key.code {
            KeyCode::Esc if self.reading => {
                self.reading = false;
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.reading = false;
                self.focus = Pane::Profiles;
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.focus = Pane::Inbox;
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_cursor(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_cursor(false);
                None
            }
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('n') => self.page_action(self.state.page + 1),
            KeyCode::Char('p') => self.page_action(self.state.page.saturating_sub(1)),
            KeyCode::Char('r') => self.page_action(self.state.page),
            KeyCode::Char('d') => Some(Action::Execute(Command::MailDisconnect)),
            KeyCode::Char('R') => Some(Action::Execute(Command::RefreshProfiles)),
            KeyCode::Char('t') => {
                if let Some(profile_id) = self.send_profile() {
                    self.prompt = Some(Prompt::Recipient {
                        profile_id,
                        field: Field::new("To", ""),
                    });
                }
                None
            }
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::MailUpdated(state) => {
                let page_changed = state.page != self.state.page;
                let connected = state.is_connected() && !self.state.is_connected();
                self.state = Arc::clone(state);
                self.profile_cursor = clamp_cursor(self.profile_cursor, self.state.profiles.len());
                self.message_cursor = if page_changed {
                    0
                } else {
                    clamp_cursor(self.message_cursor, self.state.inbox.len())
                };
                if connected {
                    self.focus = Pane::Inbox;
                }
                if !self.state.is_connected() {
                    self.reading = false;
                }
            }
            Action::PasswordRequired(request) if request.kind() == SecretKind::Mail => {
                self.prompt = Some(Prompt::Password(request.clone(), Field::masked("Password")));
            }
            Action::Tick if self.state.loading => self.spinner.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
        let cols = Layout::horizontal([Constraint::Length(32), Constraint::Min(30)]).split(rows[0]);

        self.render_profiles(frame, cols[0]);
        if self.reading {
            self.render_reader(frame, cols[1]);
        } else {
            self.render_inbox(frame, cols[1]);
        }

        frame.render_widget(Paragraph::new(self.status_line()), rows[1]);
        frame.render_widget(Paragraph::new(hint_line(self.key_hints())), rows[2]);

        match self.prompt {
            Some(Prompt::Password(ref request, ref field)) => {
                let note = match request {
                    PendingSecret::MailSendTest { recipient, .. } => format!("Send test to {recipient}"),
                    _ => self
                        .state
                        .profiles
                        .get(&request.profile_id().to_owned())
                        .map_or_else(String::new, |p| format!("{} @ {}", p.username, p.imap_host)),
                };
                render_prompt(frame, "Mail password", &note, field);
            }
            Some(Prompt::Recipient { ref field, .. }) => {
                render_prompt(frame, "Send test message", "Recipient address", field);
            }
            None => {}
        }
    }

    fn editing(&self) -> bool {
        self.prompt.is_some()
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("h/l", "pane"),
            ("Enter", "connect/read"),
            ("Esc", "close"),
            ("n/p", "page"),
            ("r", "reload"),
            ("t", "send test"),
            ("d", "disconnect"),
        ]
    }
}
