//! Port scanner screen.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Gauge, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;

use nethawk_core::projection::project_ports;
use nethawk_core::util::{COMMON_PORTS, is_valid_host, join_ports, parse_ports};
use nethawk_core::{Command, PortResult, PortScanState, PortStatus, ScanType};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::field::{Field, FieldEvent};
use crate::widgets::{self, clamp_cursor, hint_line, placeholder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Editing {
    Host,
    Ports,
}

pub struct PortsScreen {
    state: Arc<PortScanState>,
    host: Field,
    ports: Field,
    scan_type: ScanType,
    editing: Option<Editing>,
    open_only: bool,
    cursor: usize,
    input_error: Option<String>,
    spinner: ThrobberState,
}

fn next_type(t: ScanType) -> ScanType {
    match t {
        ScanType::TcpConnect => ScanType::TcpSyn,
        ScanType::TcpSyn => ScanType::Udp,
        ScanType::Udp => ScanType::TcpFin,
        ScanType::TcpFin => ScanType::TcpNull,
        ScanType::TcpNull => ScanType::TcpConnect,
    }
}

fn status_color(status: PortStatus) -> ratatui::style::Color {
    match status {
        PortStatus::Open => theme::SUCCESS_GREEN,
        PortStatus::Filtered => theme::SIGNAL_YELLOW,
        PortStatus::Closed => theme::ERROR_RED,
        PortStatus::Unknown => theme::BORDER_GRAY,
    }
}

impl PortsScreen {
    pub fn new() -> Self {
        let common: Vec<u16> = COMMON_PORTS.iter().map(|p| p.number).collect();
        Self {
            state: Arc::new(PortScanState::default()),
            host: Field::new("Host", ""),
            ports: Field::new("Ports", join_ports(&common)),
            scan_type: ScanType::default(),
            editing: None,
            open_only: false,
            cursor: 0,
            input_error: None,
            spinner: ThrobberState::default(),
        }
    }

    /// Validate the form locally; the backend never sees a bad request.
    fn start(&mut self) -> Option<Action> {
        let host = self.host.trimmed().to_owned();
        if !is_valid_host(&host) {
            self.input_error = Some(if host.is_empty() {
                "enter a host first (e)".to_owned()
            } else {
                format!("invalid host: {host}")
            });
            return None;
        }
        let ports = match parse_ports(self.ports.trimmed()) {
            Ok(ports) if !ports.is_empty() => ports,
            Ok(_) => {
                self.input_error = Some("no ports to scan".into());
                return None;
            }
            Err(e) => {
                self.input_error = Some(e.to_string());
                return None;
            }
        };
        self.input_error = None;
        self.cursor = 0;
        Some(Action::Execute(Command::StartPortScan {
            host,
            ports,
            scan_type: self.scan_type,
        }))
    }

    fn rows(&self) -> Vec<&PortResult> {
        let view = project_ports(&self.state);
        let mut rows: Vec<&PortResult> = view
            .items()
            .iter()
            .filter(|p| !self.open_only || p.is_open())
            .collect();
        rows.sort_by_key(|p| p.number);
        rows
    }

    fn field_mut(&mut self, which: Editing) -> &mut Field {
        match which {
            Editing::Host => &mut self.host,
            Editing::Ports => &mut self.ports,
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Port scan", self.editing.is_some());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let rows = Layout::vertical([Constraint::Length(1); 3]).split(inner);

        let mut host = self.host.line(self.editing == Some(Editing::Host));
        host.push_span(Span::styled("   Type ", theme::label()));
        host.push_span(Span::styled(self.scan_type.to_string(), theme::value()));
        frame.render_widget(Paragraph::new(host), rows[0]);
        frame.render_widget(
            Paragraph::new(self.ports.line(self.editing == Some(Editing::Ports))),
            rows[1],
        );

        let s = &self.state;
        let status = if let Some(ref err) = self.input_error {
            Line::from(Span::styled(format!(" {err}"), theme::error()))
        } else if let Some(ref target) = s.target {
            let mut spans = vec![Span::styled(
                format!(
                    " {} open of {} scanned on {target}",
                    s.open_count(),
                    s.total_requested
                ),
                theme::value(),
            )];
            if let Some(took) = widgets::elapsed(s.started_at, s.finished_at) {
                spans.push(Span::styled(format!("  · {took}"), theme::key_hint()));
            }
            if let Some(ref msg) = s.last_message {
                spans.push(Span::styled(format!("  · {msg}"), theme::key_hint()));
            }
            Line::from(spans)
        } else {
            Line::from(Span::styled(" No scan yet", theme::key_hint()))
        };
        frame.render_widget(Paragraph::new(status), rows[2]);
    }
}

impl Component for PortsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(which) = self.editing {
            return Ok(match self.field_mut(which).handle_key(key) {
                FieldEvent::Submit => {
                    self.editing = None;
                    self.start()
                }
                FieldEvent::Cancel => {
                    self.editing = None;
                    None
                }
                FieldEvent::Edited | FieldEvent::Ignored => None,
            });
        }

        let len = self.rows().len();
        Ok(match key.code {
            KeyCode::Char('e') => {
                self.editing = Some(Editing::Host);
                None
            }
            KeyCode::Char('p') => {
                self.editing = Some(Editing::Ports);
                None
            }
            KeyCode::Char('t') => {
                self.scan_type = next_type(self.scan_type);
                None
            }
            KeyCode::Char('o') => {
                self.open_only = !self.open_only;
                self.cursor = 0;
                None
            }
            KeyCode::Char('s') | KeyCode::Enter => self.start(),
            KeyCode::Char('x') => Some(Action::Execute(Command::StopPortScan)),
            KeyCode::Char('j') | KeyCode::Down => {
                self.cursor = clamp_cursor(self.cursor + 1, len);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::PortsUpdated(state) => {
                self.state = Arc::clone(state);
                self.cursor = clamp_cursor(self.cursor, self.rows().len());
            }
            Action::Tick if self.state.scanning => self.spinner.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_form(frame, rows[0]);

        let pct = self.state.progress.percent();
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(theme::HAWK_AMBER).bg(theme::BG_DARK))
                .percent(pct)
                .label(format!("{pct}%")),
            rows[1],
        );

        let view = project_ports(&self.state);
        let title = if self.open_only { "Open ports" } else { "Ports" };
        let block = widgets::panel(title, self.editing.is_none());
        let visible = self.rows();
        if visible.is_empty() {
            frame.render_widget(block, rows[2]);
            placeholder::render(frame, rows[2], &view, "No results. Press e to set a host, s to scan.", &self.spinner);
        } else {
            let table = Table::new(
                visible.iter().map(|p| {
                    Row::new(vec![
                        Cell::from(p.number.to_string()),
                        Cell::from(p.protocol.as_str()),
                        Cell::from(Span::styled(
                            p.status.to_string(),
                            Style::default().fg(status_color(p.status)),
                        )),
                        Cell::from(p.service.as_str()),
                        Cell::from(p.details.as_deref().unwrap_or(p.description.as_str())),
                    ])
                    .style(theme::table_row())
                }),
                [
                    Constraint::Length(7),
                    Constraint::Length(6),
                    Constraint::Length(9),
                    Constraint::Length(14),
                    Constraint::Min(20),
                ],
            )
            .header(Row::new(["Port", "Proto", "Status", "Service", "Details"]).style(theme::table_header()))
            .block(block)
            .row_highlight_style(theme::table_selected());
            let mut table_state = TableState::default().with_selected(Some(self.cursor));
            frame.render_stateful_widget(table, rows[2], &mut table_state);
        }

        let footer = match view.error() {
            Some(err) if !view.items().is_empty() => {
                Line::from(Span::styled(format!(" ✗ {err}"), theme::error()))
            }
            _ => hint_line(self.key_hints()),
        };
        frame.render_widget(Paragraph::new(footer), rows[3]);
    }

    fn editing(&self) -> bool {
        self.editing.is_some()
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("e", "host"),
            ("p", "ports"),
            ("t", "scan type"),
            ("o", "open only"),
            ("s", "start"),
            ("x", "stop"),
        ]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(screen: &mut PortsScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_into(screen: &mut PortsScreen, open: char, text: &str) {
        press(screen, KeyCode::Char(open));
        screen
            .handle_key_event(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
            .unwrap();
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    #[test]
    fn start_without_host_is_rejected_locally() {
        let mut screen = PortsScreen::new();
        assert!(press(&mut screen, KeyCode::Char('s')).is_none());
        assert!(screen.input_error.is_some());
    }

    #[test]
    fn submitting_a_field_starts_the_scan() {
        let mut screen = PortsScreen::new();
        type_into(&mut screen, 'p', "22,80-81");
        press(&mut screen, KeyCode::Esc);
        type_into(&mut screen, 'e', "10.0.0.5");
        assert!(screen.editing());

        let action = press(&mut screen, KeyCode::Enter);
        assert!(!screen.editing());
        match action {
            Some(Action::Execute(Command::StartPortScan {
                host,
                ports,
                scan_type,
            })) => {
                assert_eq!(host, "10.0.0.5");
                assert_eq!(ports, vec![22, 80, 81]);
                assert_eq!(scan_type, ScanType::TcpConnect);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_port_list_surfaces_parse_error() {
        let mut screen = PortsScreen::new();
        type_into(&mut screen, 'e', "10.0.0.5");
        press(&mut screen, KeyCode::Esc);
        type_into(&mut screen, 'p', "22,abc");
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        assert!(screen.input_error.is_some());
    }

    #[test]
    fn scan_type_cycles() {
        let mut screen = PortsScreen::new();
        for _ in 0..5 {
            press(&mut screen, KeyCode::Char('t'));
        }
        assert_eq!(screen.scan_type, ScanType::TcpConnect);
    }
}
