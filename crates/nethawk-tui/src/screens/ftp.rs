//! FTP manager screen: stored profiles on the left, remote listing on the right.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Gauge, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;

use nethawk_config::SecretKind;
use nethawk_core::projection::project_files;
use nethawk_core::util::format_file_size;
use nethawk_core::{Command, FileEntry, FileKind, FtpState};

use crate::action::{Action, PendingSecret};
use crate::component::Component;
use crate::theme;
use crate::widgets::field::{Field, FieldEvent, render_prompt};
use crate::widgets::{self, clamp_cursor, hint_line, placeholder, session_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Profiles,
    Files,
}

pub struct FtpScreen {
    state: Arc<FtpState>,
    focus: Pane,
    profile_cursor: usize,
    file_cursor: usize,
    prompt: Option<(PendingSecret, Field)>,
    spinner: ThrobberState,
}

impl FtpScreen {
    pub fn new() -> Self {
        Self {
            state: Arc::new(FtpState::default()),
            focus: Pane::Profiles,
            profile_cursor: 0,
            file_cursor: 0,
            prompt: None,
            spinner: ThrobberState::default(),
        }
    }

    /// Listing with directories first, then by name.
    fn rows(&self) -> Vec<&FileEntry> {
        let mut rows: Vec<&FileEntry> = project_files(&self.state).items().iter().collect();
        rows.sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
        rows
    }

    fn selected_profile(&self) -> Option<String> {
        self.state
            .profiles
            .as_slice()
            .get(self.profile_cursor)
            .map(|p| p.id.clone())
    }

    fn open_selected(&mut self) -> Option<Action> {
        match self.focus {
            Pane::Profiles => {
                let profile_id = self.selected_profile()?;
                Some(Action::WithSecret {
                    request: PendingSecret::FtpConnect { profile_id },
                    password: None,
                })
            }
            Pane::Files => {
                let entry = self.rows().get(self.file_cursor).copied()?;
                entry.is_dir().then(|| {
                    Action::Execute(Command::FtpNavigate {
                        name: entry.name.clone(),
                    })
                })
            }
        }
    }

    fn move_cursor(&mut self, down: bool) {
        let (cursor, len) = match self.focus {
            Pane::Profiles => (&mut self.profile_cursor, self.state.profiles.len()),
            Pane::Files => {
                let len = self.rows().len();
                (&mut self.file_cursor, len)
            }
        };
        *cursor = if down {
            clamp_cursor(*cursor + 1, len)
        } else {
            cursor.saturating_sub(1)
        };
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<Action> {
        let (_, field) = self.prompt.as_mut()?;
        match field.handle_key(key) {
            FieldEvent::Submit => {
                let (request, field) = self.prompt.take()?;
                Some(Action::WithSecret {
                    request,
                    password: Some(field.value),
                })
            }
            FieldEvent::Cancel => {
                self.prompt = None;
                None
            }
            FieldEvent::Edited | FieldEvent::Ignored => None,
        }
    }

    fn render_profiles(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Profiles", self.focus == Pane::Profiles);
        if self.state.profiles.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled(" No FTP profiles. Press R to refresh.", theme::key_hint())),
                inner,
            );
            return;
        }

        let rows = self.state.profiles.iter().map(|p| {
            Row::new(vec![
                Line::from(Span::styled(p.name.clone(), theme::value())),
                Line::from(vec![
                    Span::styled(format!("{} ", p.protocol), theme::label()),
                    Span::styled(p.endpoint(), theme::key_hint()),
                ]),
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

    fn render_files(&self, frame: &mut Frame, area: Rect) {
        let s = &self.state;
        let title = match (&s.current_host, s.is_connected()) {
            (Some(host), true) => format!("{host}:{}", s.cwd),
            _ => "Remote files".to_owned(),
        };
        let block = widgets::panel(&title, self.focus == Pane::Files);
        let view = project_files(s);
        let rows = self.rows();
        if rows.is_empty() {
            frame.render_widget(block, area);
            let empty = if s.is_connected() {
                "Empty directory."
            } else {
                "Not connected. Select a profile and press Enter."
            };
            placeholder::render(frame, area, &view, empty, &self.spinner);
            return;
        }

        let table = Table::new(
            rows.iter().map(|f| {
                let (icon, color) = match f.kind {
                    FileKind::Directory => ("▸ ", theme::SKY_CYAN),
                    FileKind::Symlink => ("↪ ", theme::ROSE),
                    FileKind::File => ("  ", theme::DIM_WHITE),
                };
                let name = match f.link_target {
                    Some(ref target) => format!("{icon}{} → {target}", f.name),
                    None => format!("{icon}{}", f.name),
                };
                Row::new(vec![
                    Cell::from(Span::styled(name, Style::default().fg(color))),
                    Cell::from(if f.is_dir() {
                        "-".to_owned()
                    } else {
                        format_file_size(f.size)
                    }),
                    Cell::from(f.modified.as_str()),
                    Cell::from(f.permissions.as_str()),
                    Cell::from(f.owner.as_str()),
                ])
                .style(theme::table_row())
            }),
            [
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(17),
                Constraint::Length(11),
                Constraint::Length(10),
            ],
        )
        .header(Row::new(["Name", "Size", "Modified", "Perms", "Owner"]).style(theme::table_header()))
        .block(block)
        .row_highlight_style(theme::table_selected());
        let mut table_state = TableState::default().with_selected(Some(self.file_cursor));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn status_line(&self) -> Line<'static> {
        let s = &self.state;
        if let Some(ref err) = s.last_error {
            return Line::from(Span::styled(format!(" ✗ {err}"), theme::error()));
        }
        match s.active() {
            Some(p) => Line::from(vec![
                Span::raw(" "),
                session_span(s.session_state(&p.id)),
                Span::styled(format!("  {} ({})", p.name, p.username), theme::value()),
                Span::styled(
                    s.last_message
                        .as_ref()
                        .map(|m| format!("  · {m}"))
                        .unwrap_or_default(),
                    theme::key_hint(),
                ),
            ]),
            None => Line::from(Span::styled(" No active session", theme::key_hint())),
        }
    }
}

impl Component for FtpScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.prompt.is_some() {
            return Ok(self.handle_prompt_key(key));
        }

        Ok(match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.focus = Pane::Profiles;
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.focus = Pane::Files;
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
            KeyCode::Backspace => Some(Action::Execute(Command::FtpNavigate { name: "..".into() })),
            KeyCode::Char('r') => Some(Action::Execute(Command::FtpListDir {
                path: self.state.cwd.clone(),
            })),
            KeyCode::Char('d') => Some(Action::Execute(Command::FtpDisconnect)),
            KeyCode::Char('R') => Some(Action::Execute(Command::RefreshProfiles)),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::FtpUpdated(state) => {
                let cwd_changed = state.cwd != self.state.cwd;
                let connected = state.is_connected() && !self.state.is_connected();
                self.state = Arc::clone(state);
                self.profile_cursor = clamp_cursor(self.profile_cursor, self.state.profiles.len());
                self.file_cursor = if cwd_changed {
                    0
                } else {
                    clamp_cursor(self.file_cursor, self.rows().len())
                };
                if connected {
                    self.focus = Pane::Files;
                }
            }
            Action::PasswordRequired(request) if request.kind() == SecretKind::Ftp => {
                self.prompt = Some((request.clone(), Field::masked("Password")));
            }
            Action::Tick if self.state.loading => self.spinner.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let transfer_height = u16::from(self.state.transfer.is_some());
        let rows = Layout::vertical([
            Constraint::Min(6),
            Constraint::Length(transfer_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
        let cols = Layout::horizontal([Constraint::Length(32), Constraint::Min(30)]).split(rows[0]);

        self.render_profiles(frame, cols[0]);
        self.render_files(frame, cols[1]);

        if let Some(ref t) = self.state.transfer {
            let sizes = match (t.transferred_size, t.total_size) {
                (Some(done), Some(total)) => {
                    format!("  {} / {}", format_file_size(done), format_file_size(total))
                }
                _ => String::new(),
            };
            frame.render_widget(
                Gauge::default()
                    .gauge_style(Style::default().fg(theme::HAWK_AMBER).bg(theme::BG_DARK))
                    .ratio((t.progress / 100.0).clamp(0.0, 1.0))
                    .label(format!(
                        "{} {} {:.0}% ({}){sizes}",
                        t.direction, t.file_name, t.progress, t.status
                    )),
                rows[1],
            );
        }

        frame.render_widget(Paragraph::new(self.status_line()), rows[2]);
        frame.render_widget(Paragraph::new(hint_line(self.key_hints())), rows[3]);

        if let Some((ref request, ref field)) = self.prompt {
            let note = self
                .state
                .profiles
                .get(&request.profile_id().to_owned())
                .map_or_else(
                    || "FTP password".to_owned(),
                    |p| format!("{}@{}", p.username, p.endpoint()),
                );
            render_prompt(frame, "FTP password", &note, field);
        }
    }

    fn editing(&self) -> bool {
        self.prompt.is_some()
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("h/l", "pane"),
            ("Enter", "connect/open"),
            ("Bksp", "up"),
            ("r", "reload"),
            ("d", "disconnect"),
            ("R", "profiles"),
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crossterm::event::KeyModifiers;

    use nethawk_core::{FtpProfile, FtpProtocol};

    use super::*;

    fn press(screen: &mut FtpScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn profile(id: &str) -> FtpProfile {
        FtpProfile {
            id: id.into(),
            name: format!("server {id}"),
            host: "ftp.example.com".into(),
            port: 21,
            username: "deploy".into(),
            protocol: FtpProtocol::Ftp,
        }
    }

    fn entry(name: &str, kind: FileKind) -> FileEntry {
        FileEntry {
            name: name.into(),
            kind,
            size: 2048,
            modified: "2024-01-01 10:00".into(),
            permissions: "rw-r--r--".into(),
            owner: "deploy".into(),
            link_target: None,
        }
    }

    fn with_profiles() -> FtpScreen {
        let mut screen = FtpScreen::new();
        let mut state = FtpState::default();
        state.set_profiles(vec![profile("a"), profile("b")]);
        screen.update(&Action::FtpUpdated(Arc::new(state))).unwrap();
        screen
    }

    #[test]
    fn enter_on_profile_asks_for_secret() {
        let mut screen = with_profiles();
        press(&mut screen, KeyCode::Char('j'));
        match press(&mut screen, KeyCode::Enter) {
            Some(Action::WithSecret {
                request: PendingSecret::FtpConnect { profile_id },
                password: None,
            }) => assert_eq!(profile_id, "b"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn password_prompt_submits_typed_secret() {
        let mut screen = with_profiles();
        let request = PendingSecret::FtpConnect {
            profile_id: "a".into(),
        };
        screen
            .update(&Action::PasswordRequired(request.clone()))
            .unwrap();
        assert!(screen.editing());

        for c in "pw".chars() {
            assert!(press(&mut screen, KeyCode::Char(c)).is_none());
        }
        match press(&mut screen, KeyCode::Enter) {
            Some(Action::WithSecret { request: r, password }) => {
                assert_eq!(r, request);
                assert_eq!(password.as_deref(), Some("pw"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!screen.editing());
    }

    #[test]
    fn mail_prompts_are_not_ours() {
        let mut screen = FtpScreen::new();
        screen
            .update(&Action::PasswordRequired(PendingSecret::MailConnect {
                profile_id: "m".into(),
            }))
            .unwrap();
        assert!(!screen.editing());
    }

    #[test]
    fn directories_sort_first_and_open_on_enter() {
        let mut screen = FtpScreen::new();
        let mut state = FtpState::default();
        state.files.replace_all(vec![
            entry("readme.txt", FileKind::File),
            entry("www", FileKind::Directory),
        ]);
        screen.update(&Action::FtpUpdated(Arc::new(state))).unwrap();

        let names: Vec<&str> = screen.rows().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["www", "readme.txt"]);

        press(&mut screen, KeyCode::Char('l'));
        match press(&mut screen, KeyCode::Enter) {
            Some(Action::Execute(Command::FtpNavigate { name })) => assert_eq!(name, "www"),
            other => panic!("unexpected {other:?}"),
        }
        press(&mut screen, KeyCode::Char('j'));
        assert!(press(&mut screen, KeyCode::Enter).is_none());
    }

    #[test]
    fn backspace_goes_up() {
        let mut screen = FtpScreen::new();
        assert!(matches!(
            press(&mut screen, KeyCode::Backspace),
            Some(Action::Execute(Command::FtpNavigate { ref name })) if name == ".."
        ));
    }
}
