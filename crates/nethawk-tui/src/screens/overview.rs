//! Overview screen: system load, traffic history, device mix, activity.
//!
//! ```text
//! ┌─ System ───────────────┐┌─ Traffic ──────────────────────────┐
//! │ CPU     ███████░░ 42%  ││  ⣀⡠⠔⠊⠉⠑⠢⣀                          │
//! │ Memory  █████████ 61%  ││                                    │
//! └────────────────────────┘└────────────────────────────────────┘
//! ┌─ Devices ──────────────┐┌─ Recent activity ──────────────────┐
//! ```

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, Gauge, GraphType, Paragraph};

use nethawk_core::{Command, OverviewState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{self, hint_line};

pub struct OverviewScreen {
    state: Arc<OverviewState>,
}

impl OverviewScreen {
    pub fn new() -> Self {
        Self {
            state: Arc::new(OverviewState::default()),
        }
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("System", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(stats) = self.state.stats else {
            let text = if self.state.loading {
                " Loading…"
            } else {
                " No statistics yet"
            };
            frame.render_widget(Paragraph::new(Span::styled(text, theme::key_hint())), inner);
            return;
        };

        let rows = Layout::vertical([Constraint::Length(1); 4]).split(inner);
        let metrics = [
            ("CPU", stats.cpu),
            ("Memory", stats.memory),
            ("Disk", stats.disk),
            ("Network", stats.network),
        ];
        for ((name, value), row) in metrics.into_iter().zip(rows.iter()) {
            let cols = Layout::horizontal([Constraint::Length(9), Constraint::Min(5)]).split(*row);
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {name}"), theme::label())),
                cols[0],
            );
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(theme::load_color(value)).bg(theme::BG_DARK))
                .ratio((value / 100.0).clamp(0.0, 1.0))
                .label(format!("{value:.1}%"));
            frame.render_widget(gauge, cols[1]);
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render_traffic(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Traffic", false);
        let traffic = &self.state.traffic;
        if traffic.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled(" No traffic data", theme::key_hint())),
                inner,
            );
            return;
        }

        let down: Vec<(f64, f64)> = traffic
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.download))
            .collect();
        let up: Vec<(f64, f64)> = traffic
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.upload))
            .collect();
        let y_max = traffic
            .iter()
            .map(|p| p.download.max(p.upload))
            .fold(1.0_f64, f64::max)
            * 1.2;
        let x_max = (traffic.len().saturating_sub(1)).max(1) as f64;

        let first = traffic.first().map_or("", |p| p.time.as_str());
        let last = traffic.last().map_or("", |p| p.time.as_str());

        let chart = Chart::new(vec![
            Dataset::default()
                .name("down")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::DOWNLOAD))
                .data(&down),
            Dataset::default()
                .name("up")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::UPLOAD))
                .data(&up),
        ])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels([first.to_owned(), last.to_owned()])
                .style(theme::key_hint()),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(["0".to_owned(), format!("{y_max:.0}")])
                .style(theme::key_hint()),
        );
        frame.render_widget(chart, area);
    }

    fn render_devices(&self, frame: &mut Frame, area: Rect) {
        let total = self.state.total_devices();
        let block = widgets::panel("Devices", false).title_bottom(Line::from(Span::styled(
            format!(" {total} total "),
            theme::key_hint(),
        )));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .state
            .devices
            .iter()
            .map(|share| {
                Line::from(vec![
                    Span::styled(format!(" {:<14}", share.name), theme::label()),
                    Span::styled(share.value.to_string(), theme::value()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_activity(&self, frame: &mut Frame, area: Rect) {
        let block = widgets::panel("Recent activity", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .state
            .activity
            .iter()
            .map(|item| {
                let color = match item.status.as_str() {
                    "success" => theme::SUCCESS_GREEN,
                    "warning" => theme::SIGNAL_YELLOW,
                    "error" => theme::ERROR_RED,
                    _ => theme::SKY_CYAN,
                };
                Line::from(vec![
                    Span::styled(format!(" {:<9}", item.time), theme::label()),
                    Span::styled("● ", Style::default().fg(color)),
                    Span::styled(item.message.clone(), theme::value()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for OverviewScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('r') => Some(Action::Execute(Command::RefreshOverview)),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::OverviewUpdated(state) = action {
            self.state = Arc::clone(state);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(6),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);
        let top = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[0]);
        let bottom = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        self.render_stats(frame, top[0]);
        self.render_traffic(frame, top[1]);
        self.render_devices(frame, bottom[0]);
        self.render_activity(frame, bottom[1]);

        let mut footer = hint_line(self.key_hints());
        if let Some(ref err) = self.state.last_error {
            footer.push_span(Span::styled(format!("✗ {err}"), theme::error()));
        } else if let Some(at) = self.state.refreshed_at {
            footer.push_span(Span::styled(
                format!("refreshed {}", at.with_timezone(&chrono::Local).format("%H:%M:%S")),
                theme::key_hint(),
            ));
        }
        frame.render_widget(Paragraph::new(footer), rows[2]);
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("r", "refresh")]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use nethawk_core::OverviewStats;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(screen: &OverviewScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| screen.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn renders_stats_once_loaded() {
        let mut screen = OverviewScreen::new();
        assert!(draw(&screen).contains("No statistics yet"));

        let state = OverviewState {
            stats: Some(OverviewStats {
                cpu: 42.0,
                memory: 61.5,
                disk: 70.0,
                network: 12.0,
            }),
            ..OverviewState::default()
        };
        screen.update(&Action::OverviewUpdated(Arc::new(state))).unwrap();

        let text = draw(&screen);
        assert!(text.contains("CPU"));
        assert!(text.contains("42.0%"));
    }

    #[test]
    fn r_requests_refresh() {
        let mut screen = OverviewScreen::new();
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('r')))
            .unwrap();
        assert!(matches!(action, Some(Action::Execute(Command::RefreshOverview))));
    }
}
