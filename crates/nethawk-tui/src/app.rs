//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Tabs},
};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use nethawk_config::Profile;
use nethawk_core::{Command, CommandResult, ConnectionState, Dashboard, Notification};

use crate::action::{Action, PendingSecret};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets;

const GLOBAL_HINTS: &[(&str, &str)] = &[
    ("1-6", "jump to screen"),
    ("Tab", "next screen"),
    ("S-Tab", "previous screen"),
    ("j/k", "move"),
    ("?", "this help"),
    ("q", "quit"),
];

/// Top-level application state and event loop.
pub struct App {
    dashboard: Dashboard,
    /// Config profile used to look up stored FTP/mail passwords.
    profile: Profile,
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    connection: ConnectionState,
    last_notification: Option<Notification>,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

/// Status-bar notification for a finished command, if it is worth one.
fn result_notification(result: &CommandResult) -> Option<Notification> {
    match result {
        CommandResult::Ok | CommandResult::Emitted(_) => None,
        CommandResult::Message(msg) => Some(Notification::success("Done", msg.clone())),
        CommandResult::MailProfile(p) => Some(Notification::success(
            "Mail profile saved",
            format!("{} ({})", p.name, p.username),
        )),
        CommandResult::Profiles { ftp, mail } => Some(Notification::info(
            "Profiles refreshed",
            format!("{ftp} FTP, {mail} mail"),
        )),
        CommandResult::Overview { failed: 0 } => None,
        CommandResult::Overview { failed } => Some(Notification::warning(
            "Overview partially refreshed",
            format!("{failed} endpoint(s) unavailable, showing previous data"),
        )),
    }
}

impl App {
    pub fn new(dashboard: Dashboard, profile: Profile) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<ScreenId, Box<dyn Component>> = create_screens().into_iter().collect();

        Self {
            dashboard,
            profile,
            active_screen: ScreenId::default(),
            screens,
            running: true,
            connection: ConnectionState::Disconnected,
            last_notification: None,
            help_visible: false,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until quit.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let bridge = tokio::spawn(spawn_data_bridge(
            self.dashboard.clone(),
            self.action_tx.clone(),
            self.cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(backend = %self.dashboard.config().backend_url, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.cancel.cancel();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    fn active_editing(&self) -> bool {
        self.screens
            .get(&self.active_screen)
            .is_some_and(|s| s.editing())
    }

    /// Global keys first, then the active screen. While a screen has a
    /// text field open it gets every key.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if !self.active_editing() {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
                (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
                (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='6')) => {
                    let n = c.to_digit(10).and_then(|d| u8::try_from(d).ok());
                    if let Some(screen) = n.and_then(ScreenId::from_number) {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }
                (KeyModifiers::NONE, KeyCode::Tab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                (_, KeyCode::BackTab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
                }
                _ => {}
            }
        }

        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    /// Update app state, run intents, and fan everything else out to
    /// every screen so inactive screens stay current.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    self.active_screen = *target;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::ConnectionChanged(state) => self.connection = *state,

            Action::Notify(note) => {
                debug!(level = ?note.level, title = %note.title, "notification");
                self.last_notification = Some(note.clone());
            }

            Action::Execute(cmd) => self.spawn_command(cmd.clone()),

            Action::WithSecret { request, password } => self.run_with_secret(request, password.as_deref())?,

            Action::Render | Action::Resize(..) => {}

            other => self.broadcast(other)?,
        }
        Ok(())
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Typed password, else the stored one, else ask the owning screen.
    fn run_with_secret(&mut self, request: &PendingSecret, typed: Option<&str>) -> Result<()> {
        let secret = match typed {
            Some(p) => Some(SecretString::from(p.to_owned())),
            None => nethawk_config::resolve_password(request.kind(), &self.profile, request.profile_id()),
        };
        match secret {
            Some(secret) => self.spawn_command(request.clone().into_command(secret)),
            None => {
                debug!(kind = %request.kind(), profile = request.profile_id(), "no stored password, prompting");
                self.broadcast(&Action::PasswordRequired(request.clone()))?;
            }
        }
        Ok(())
    }

    /// Run `cmd` off the UI loop; its outcome comes back as a notification.
    fn spawn_command(&self, cmd: Command) {
        let dashboard = self.dashboard.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match dashboard.execute(cmd).await {
                Ok(result) => {
                    if let Some(note) = result_notification(&result) {
                        let _ = tx.send(Action::Notify(note));
                    }
                }
                Err(e) => {
                    warn!(error = %e, "command failed");
                    let _ = tx.send(Action::Notify(Notification::error("Command failed", e.to_string())));
                }
            }
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    /// Channel state, latest notification, global hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let dot = match self.connection {
            ConnectionState::Connected => "●",
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => "◐",
            ConnectionState::Disconnected | ConnectionState::Failed => "○",
        };
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(
                format!("{dot} {}", self.connection),
                Style::default().fg(theme::connection_color(self.connection)),
            ),
        ];

        if let Some(ref note) = self.last_notification {
            spans.push(Span::styled(" │ ", theme::key_hint()));
            spans.push(Span::styled(
                note.at.with_timezone(&Local).format("%H:%M:%S ").to_string(),
                theme::key_hint(),
            ));
            spans.push(Span::styled(
                format!("{}: {}", note.title, note.message),
                Style::default().fg(theme::notify_color(note.level)),
            ));
        }

        spans.push(Span::styled(" │ ? help  q quit", theme::key_hint()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let screen_hints = self
            .screens
            .get(&self.active_screen)
            .map_or(&[][..], |s| s.key_hints());
        let rows = u16::try_from(GLOBAL_HINTS.len() + screen_hints.len()).unwrap_or(u16::MAX);
        let help_area = widgets::centered(area, 56, rows.saturating_add(8));

        frame.render_widget(Block::default().style(Style::default().bg(theme::BG_DARK)), help_area);
        let block = widgets::panel("Keyboard Shortcuts", true);
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |title: String| {
            [
                Line::from(Span::styled(format!("  {title}"), Style::default().fg(theme::SKY_CYAN))),
                Line::from(Span::styled(format!("  {}", "─".repeat(title.chars().count())), theme::key_hint())),
            ]
        };
        let entry = |(key, desc): &(&str, &str)| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled((*desc).to_owned(), theme::key_hint()),
            ])
        };

        let mut lines = vec![Line::default()];
        lines.extend(section("Global".to_owned()));
        lines.extend(GLOBAL_HINTS.iter().map(entry));
        if !screen_hints.is_empty() {
            lines.push(Line::default());
            lines.extend(section(self.active_screen.label().to_owned()));
            lines.extend(screen_hints.iter().map(entry));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("  Esc or ? to close", theme::key_hint())));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use nethawk_core::DashboardConfig;

    use super::*;

    fn app() -> App {
        let url = "http://127.0.0.1:5000".parse().unwrap();
        App::new(Dashboard::new(DashboardConfig::new(url)), Profile::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn global_keys_map_to_actions() {
        let mut app = app();
        assert!(matches!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap(), Some(Action::Quit)));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::Char('5'))).unwrap(),
            Some(Action::SwitchScreen(ScreenId::Ftp))
        ));
        assert!(matches!(
            app.handle_key_event(key(KeyCode::BackTab)).unwrap(),
            Some(Action::SwitchScreen(ScreenId::Mail))
        ));
        assert!(app.handle_key_event(key(KeyCode::Char('7'))).unwrap().is_none());
    }

    #[test]
    fn help_swallows_other_keys() {
        let mut app = app();
        app.process_action(&Action::ToggleHelp).unwrap();
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        assert!(matches!(app.handle_key_event(key(KeyCode::Esc)).unwrap(), Some(Action::ToggleHelp)));
    }

    #[test]
    fn editing_screen_gets_plain_keys() {
        let mut app = app();
        app.process_action(&Action::SwitchScreen(ScreenId::Ports)).unwrap();
        // `e` opens the host field on the ports screen.
        assert!(app.handle_key_event(key(KeyCode::Char('e'))).unwrap().is_none());
        assert!(app.active_editing());
        assert!(app.handle_key_event(key(KeyCode::Char('q'))).unwrap().is_none());
        assert!(app.handle_key_event(key(KeyCode::Char('2'))).unwrap().is_none());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(app.handle_key_event(ctrl_c).unwrap(), Some(Action::Quit)));
    }

    #[test]
    fn notifications_reach_the_status_bar() {
        let mut app = app();
        app.process_action(&Action::Notify(Notification::error("Scan", "boom")))
            .unwrap();
        assert_eq!(app.last_notification.as_ref().unwrap().message, "boom");
        app.process_action(&Action::ConnectionChanged(ConnectionState::Connected))
            .unwrap();
        assert_eq!(app.connection, ConnectionState::Connected);
    }

    #[test]
    fn overview_warnings_only_when_something_failed() {
        assert!(result_notification(&CommandResult::Overview { failed: 0 }).is_none());
        assert!(result_notification(&CommandResult::Ok).is_none());
        let note = result_notification(&CommandResult::Overview { failed: 2 }).unwrap();
        assert!(note.message.starts_with("2 endpoint"));
    }
}
