//! Stand-ins drawn when a result set has no rows to show.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use throbber_widgets_tui::{Throbber, ThrobberState};

use nethawk_core::ResultView;

use crate::theme;

/// Draw the empty, loading or failed form of `view` inside the bordered
/// `area`. Callers draw their table instead when `view` has rows.
pub fn render<T>(
    frame: &mut Frame,
    area: Rect,
    view: &ResultView<'_, T>,
    empty: &str,
    spinner: &ThrobberState,
) {
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)])
        .split(area.inner(ratatui::layout::Margin::new(1, 1)));

    match view {
        ResultView::Loading { progress } => {
            let label = match progress {
                Some(p) if *p > 0.0 => format!(" Working… {p:.0}%"),
                _ => " Working…".to_owned(),
            };
            let throbber = Throbber::default()
                .label(label)
                .style(Style::default().fg(theme::SKY_CYAN))
                .throbber_style(Style::default().fg(theme::HAWK_AMBER));
            frame.render_stateful_widget(throbber, rows[0], &mut spinner.clone());
        }
        ResultView::Error { message, .. } => {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(" ✗ ", theme::error()),
                    Span::styled(*message, theme::error()),
                ])),
                rows[0],
            );
        }
        ResultView::Empty | ResultView::Populated { .. } => {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {empty}"), theme::key_hint())),
                rows[0],
            );
        }
    }
}
