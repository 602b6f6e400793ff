//! Bandwidth monitor screen: live throughput chart plus window stats.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, Gauge, GraphType, Paragraph};
use throbber_widgets_tui::ThrobberState;

use nethawk_core::projection::project_bandwidth;
use nethawk_core::{BandwidthState, Command};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{self, hint_line, placeholder};

pub struct BandwidthScreen {
    state: Arc<BandwidthState>,
    spinner: ThrobberState,
}

/// `+12.3%` / `-4.0%` next to a current value.
fn trend_span(trend: f64) -> Span<'static> {
    let color = if trend >= 0.0 {
        theme::SUCCESS_GREEN
    } else {
        theme::ERROR_RED
    };
    Span::styled(format!(" {trend:+.1}%"), Style::default().fg(color))
}

impl BandwidthScreen {
    pub fn new() -> Self {
        Self {
            state: Arc::new(BandwidthState::default()),
            spinner: ThrobberState::default(),
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let view = project_bandwidth(&self.state);
        let block = widgets::panel("Throughput (Mbps)", true);
        let samples = view.items();
        if samples.is_empty() {
            frame.render_widget(block, area);
            placeholder::render(frame, area, &view, "Monitor idle. Press s to start.", &self.spinner);
            return;
        }

        let down: Vec<(f64, f64)> = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64, s.download))
            .collect();
        let up: Vec<(f64, f64)> = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64, s.upload))
            .collect();
        let y_max = self
            .state
            .peak_download()
            .max(self.state.peak_upload())
            .max(1.0)
            * 1.2;
        let x_max = (self.state.capacity.saturating_sub(1)).max(1) as f64;

        let chart = Chart::new(vec![
            Dataset::default()
                .name("download")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::DOWNLOAD))
                .data(&down),
            Dataset::default()
                .name("upload")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::UPLOAD))
                .data(&up),
        ])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .style(theme::key_hint()),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels([
                    "0".to_owned(),
                    format!("{:.0}", y_max / 2.0),
                    format!("{y_max:.0}"),
                ])
                .style(theme::key_hint()),
        );
        frame.render_widget(chart, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let s = &self.state;
        let block = widgets::panel("Now", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        let (down, up, ping) = s
            .current
            .as_ref()
            .map_or((0.0, 0.0, 0.0), |c| (c.download, c.upload, c.ping));
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let lines = [
            Line::from(vec![
                Span::styled(" Download ", theme::label()),
                Span::styled(format!("{down:>7.1}"), bold.fg(theme::DOWNLOAD)),
                trend_span(s.download_trend()),
            ]),
            Line::from(vec![
                Span::styled(" Upload   ", theme::label()),
                Span::styled(format!("{up:>7.1}"), bold.fg(theme::UPLOAD)),
                trend_span(s.upload_trend()),
            ]),
            Line::from(vec![
                Span::styled(" Ping     ", theme::label()),
                Span::styled(format!("{ping:>7.0} ms"), theme::value()),
            ]),
            Line::from(vec![
                Span::styled(" Average  ", theme::label()),
                Span::styled(
                    format!(
                        "{:.1} / {:.1}  {:.0} ms",
                        s.avg_download(),
                        s.avg_upload(),
                        s.avg_ping()
                    ),
                    theme::value(),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Peak     ", theme::label()),
                Span::styled(
                    format!("{:.1} / {:.1}", s.peak_download(), s.peak_upload()),
                    theme::value(),
                ),
            ]),
        ];
        for (line, row) in lines.into_iter().zip(rows.iter()) {
            frame.render_widget(Paragraph::new(line), *row);
        }

        let utilization = s.utilization();
        frame.render_widget(
            Gauge::default()
                .gauge_style(
                    Style::default()
                        .fg(theme::load_color(utilization))
                        .bg(theme::BG_DARK),
                )
                .ratio((utilization / 100.0).clamp(0.0, 1.0))
                .label(format!("link {utilization:.0}%")),
            rows[6],
        );
        if s.is_high_utilization() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " ⚠ high utilization",
                    Style::default().fg(theme::SIGNAL_YELLOW),
                )),
                rows[5],
            );
        }
    }
}

impl Component for BandwidthScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('s') => Some(Action::Execute(Command::StartBandwidth)),
            KeyCode::Char('x') => Some(Action::Execute(Command::StopBandwidth)),
            KeyCode::Char(' ') => Some(Action::Execute(if self.state.monitoring {
                Command::StopBandwidth
            } else {
                Command::StartBandwidth
            })),
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BandwidthUpdated(state) => self.state = Arc::clone(state),
            Action::Tick if self.state.monitoring => self.spinner.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Min(8), Constraint::Length(1)]).split(area);
        let cols = Layout::horizontal([Constraint::Min(30), Constraint::Length(34)]).split(rows[0]);

        self.render_chart(frame, cols[0]);
        self.render_stats(frame, cols[1]);

        let mut footer = hint_line(self.key_hints());
        let status = if self.state.monitoring {
            Span::styled("● monitoring", Style::default().fg(theme::SUCCESS_GREEN))
        } else {
            Span::styled("○ stopped", theme::key_hint())
        };
        footer.push_span(status);
        if let Some(ref err) = self.state.last_error {
            footer.push_span(Span::styled(format!("  ✗ {err}"), theme::error()));
        }
        frame.render_widget(Paragraph::new(footer), rows[1]);
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("s", "start"), ("x", "stop"), ("space", "toggle")]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn space_toggles_by_state() {
        let mut screen = BandwidthScreen::new();
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char(' ')))
            .unwrap();
        assert!(matches!(action, Some(Action::Execute(Command::StartBandwidth))));

        let monitoring = BandwidthState {
            monitoring: true,
            ..BandwidthState::default()
        };
        screen
            .update(&Action::BandwidthUpdated(Arc::new(monitoring)))
            .unwrap();
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char(' ')))
            .unwrap();
        assert!(matches!(action, Some(Action::Execute(Command::StopBandwidth))));
    }

    #[test]
    fn trend_sign_is_explicit() {
        assert_eq!(trend_span(12.34).content, " +12.3%");
        assert_eq!(trend_span(-4.0).content, " -4.0%");
    }
}
