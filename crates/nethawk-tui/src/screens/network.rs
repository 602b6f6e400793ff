//! Network discovery screen.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Gauge, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::ThrobberState;

use nethawk_core::projection::project_devices;
use nethawk_core::util::{is_valid_ip_range, join_ports};
use nethawk_core::{Command, Device, NetworkScanState, NetworkScanType, Vulnerability};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::field::{Field, FieldEvent};
use crate::widgets::{self, clamp_cursor, hint_line, placeholder};

pub struct NetworkScreen {
    state: Arc<NetworkScanState>,
    range: Field,
    scan_type: NetworkScanType,
    editing: bool,
    cursor: usize,
    input_error: Option<String>,
    spinner: ThrobberState,
}

fn next_type(t: NetworkScanType) -> NetworkScanType {
    match t {
        NetworkScanType::Quick => NetworkScanType::Full,
        NetworkScanType::Full => NetworkScanType::Stealth,
        NetworkScanType::Stealth => NetworkScanType::Quick,
    }
}

fn risk_color(v: Option<Vulnerability>) -> ratatui::style::Color {
    match v {
        Some(Vulnerability::High) => theme::ERROR_RED,
        Some(Vulnerability::Medium) => theme::SIGNAL_YELLOW,
        Some(Vulnerability::Low) => theme::SKY_CYAN,
        None => theme::BORDER_GRAY,
    }
}

impl NetworkScreen {
    pub fn new() -> Self {
        let state = NetworkScanState::default();
        Self {
            range: Field::new("Range", state.ip_range.clone()),
            state: Arc::new(state),
            scan_type: NetworkScanType::default(),
            editing: false,
            cursor: 0,
            input_error: None,
            spinner: ThrobberState::default(),
        }
    }

    fn start(&mut self) -> Option<Action> {
        let range = self.range.trimmed().to_owned();
        if !is_valid_ip_range(&range) {
            self.input_error = Some(format!("invalid IP range: {range}"));
            return None;
        }
        self.input_error = None;
        self.cursor = 0;
        Some(Action::Execute(Command::StartNetworkScan {
            ip_range: range,
            scan_type: self.scan_type,
        }))
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Network scan", self.editing);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let rows = Layout::vertical([Constraint::Length(1); 2]).split(inner);

        let mut first = self.range.line(self.editing);
        first.push_span(Span::styled("   Type ", theme::label()));
        first.push_span(Span::styled(self.scan_type.to_string(), theme::value()));
        frame.render_widget(Paragraph::new(first), rows[0]);

        let s = &self.state;
        let summary = if let Some(ref err) = self.input_error {
            Line::from(Span::styled(format!(" {err}"), theme::error()))
        } else {
            let mut spans = vec![
                Span::styled(format!(" {} devices", s.devices.len()), theme::value()),
                Span::styled(format!("  {} online", s.online_count()), Style::default().fg(theme::SUCCESS_GREEN)),
                Span::styled(format!("  {} offline", s.offline_count()), theme::label()),
                Span::styled(
                    format!("  {} at risk", s.vulnerable_count()),
                    Style::default().fg(theme::SIGNAL_YELLOW),
                ),
            ];
            if let Some(took) = widgets::elapsed(s.started_at, s.finished_at) {
                spans.push(Span::styled(format!("  · {took}"), theme::key_hint()));
            }
            if let Some(ref msg) = s.last_message {
                spans.push(Span::styled(format!("  · {msg}"), theme::key_hint()));
            }
            Line::from(spans)
        };
        frame.render_widget(Paragraph::new(summary), rows[1]);
    }

    fn device_row(d: &Device) -> Row<'_> {
        let status_color = if d.is_online() {
            theme::SUCCESS_GREEN
        } else {
            theme::ERROR_RED
        };
        Row::new(vec![
            Cell::from(d.ip.to_string()),
            Cell::from(d.hostname.as_str()),
            Cell::from(d.mac.as_str()),
            Cell::from(d.vendor.as_str()),
            Cell::from(d.kind.to_string()),
            Cell::from(Span::styled(d.status.to_string(), Style::default().fg(status_color))),
            Cell::from(join_ports(&d.open_ports)),
            Cell::from(Span::styled(
                d.vulnerability.map_or_else(|| "-".to_owned(), |v| v.to_string()),
                Style::default().fg(risk_color(d.vulnerability)),
            )),
        ])
        .style(theme::table_row())
    }
}

impl Component for NetworkScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            return Ok(match self.range.handle_key(key) {
                FieldEvent::Submit => {
                    self.editing = false;
                    self.start()
                }
                FieldEvent::Cancel => {
                    self.editing = false;
                    None
                }
                FieldEvent::Edited | FieldEvent::Ignored => None,
            });
        }

        let len = self.state.devices.len();
        Ok(match key.code {
            KeyCode::Char('e') => {
                self.editing = true;
                None
            }
            KeyCode::Char('t') => {
                self.scan_type = next_type(self.scan_type);
                None
            }
            KeyCode::Char('s') | KeyCode::Enter => self.start(),
            KeyCode::Char('x') => Some(Action::Execute(Command::StopNetworkScan)),
            KeyCode::Char('j') | KeyCode::Down => {
                self.cursor = clamp_cursor(self.cursor + 1, len);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Char('g') => {
                self.cursor = 0;
                None
            }
            KeyCode::Char('G') => {
                self.cursor = len.saturating_sub(1);
                None
            }
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::NetworkUpdated(state) => {
                self.state = Arc::clone(state);
                self.cursor = clamp_cursor(self.cursor, self.state.devices.len());
            }
            Action::Tick if self.state.scanning => self.spinner.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_header(frame, rows[0]);

        let progress = self.state.progress;
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(theme::HAWK_AMBER).bg(theme::BG_DARK))
                .percent(progress.percent())
                .label(format!("{}%", progress.percent())),
            rows[1],
        );

        let view = project_devices(&self.state);
        let block = widgets::panel("Devices", !self.editing);
        if view.items().is_empty() {
            frame.render_widget(block, rows[2]);
            placeholder::render(frame, rows[2], &view, "No devices found. Press s to scan.", &self.spinner);
        } else {
            let header = Row::new(["IP", "Hostname", "MAC", "Vendor", "Type", "Status", "Open ports", "Risk"])
                .style(theme::table_header());
            let table = Table::new(
                view.items().iter().map(Self::device_row),
                [
                    Constraint::Length(15),
                    Constraint::Min(12),
                    Constraint::Length(17),
                    Constraint::Min(10),
                    Constraint::Length(10),
                    Constraint::Length(8),
                    Constraint::Min(10),
                    Constraint::Length(6),
                ],
            )
            .header(header)
            .block(block)
            .row_highlight_style(theme::table_selected());
            let mut table_state = TableState::default().with_selected(Some(self.cursor));
            frame.render_stateful_widget(table, rows[2], &mut table_state);
        }

        let detail = view.items().get(self.cursor).map_or_else(Line::default, |d| {
            Line::from(vec![
                Span::styled(format!(" {} ", d.ip), theme::title_style()),
                Span::styled(format!("last seen {}", d.last_seen), theme::label()),
            ])
        });
        let detail = match view.error() {
            Some(err) if !view.items().is_empty() => Line::from(Span::styled(format!(" ✗ {err}"), theme::error())),
            _ => detail,
        };
        frame.render_widget(Paragraph::new(detail), rows[3]);
        frame.render_widget(Paragraph::new(hint_line(self.key_hints())), rows[4]);
    }

    fn editing(&self) -> bool {
        self.editing
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("e", "edit range"), ("t", "scan type"), ("s", "start"), ("x", "stop"), ("j/k", "move")]
    }
}
