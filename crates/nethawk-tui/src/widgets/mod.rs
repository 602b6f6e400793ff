//! Small rendering helpers shared by the screens.

pub mod field;
pub mod placeholder;

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders};

use nethawk_core::SessionState;

use crate::theme;

/// Rounded panel block, highlighted when `focused`.
pub fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        })
}

/// A `width` x `height` rect centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// `key description` pairs for a footer line.
pub fn hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (key, desc) in hints {
        spans.push(Span::styled(format!("{key} "), theme::key_hint_key()));
        spans.push(Span::styled(format!("{desc}  "), theme::key_hint()));
    }
    Line::from(spans)
}

/// Scan duration: finished minus started, or running time so far.
pub fn elapsed(started: Option<DateTime<Utc>>, finished: Option<DateTime<Utc>>) -> Option<String> {
    let started = started?;
    let end = finished.unwrap_or_else(Utc::now);
    let secs = end.signed_duration_since(started).num_seconds().max(0);
    let secs = u64::try_from(secs).unwrap_or_default();
    Some(humantime::format_duration(std::time::Duration::from_secs(secs)).to_string())
}

/// Colored dot plus state name for a profile row.
pub fn session_span(state: SessionState) -> Span<'static> {
    let (dot, color) = match state {
        SessionState::Connected => ("●", theme::SUCCESS_GREEN),
        SessionState::Connecting => ("◐", theme::SIGNAL_YELLOW),
        SessionState::Error => ("✗", theme::ERROR_RED),
        SessionState::Idle | SessionState::Disconnected => ("○", theme::BORDER_GRAY),
    };
    Span::styled(format!("{dot} {state}"), Style::default().fg(color))
}

/// Clamp a table cursor after the underlying rows changed.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn elapsed_formats_finished_scans() {
        let start = Utc::now();
        let end = start + TimeDelta::seconds(75);
        assert_eq!(elapsed(Some(start), Some(end)).as_deref(), Some("1m 15s"));
        assert_eq!(elapsed(None, Some(end)), None);
    }

    #[test]
    fn cursor_stays_in_range() {
        assert_eq!(clamp_cursor(5, 3), 2);
        assert_eq!(clamp_cursor(0, 0), 0);
        assert_eq!(clamp_cursor(1, 4), 1);
    }

    #[test]
    fn centered_rect_fits() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered(area, 60, 20);
        assert_eq!((r.x, r.y, r.width, r.height), (20, 10, 60, 20));
        let tiny = centered(Rect::new(0, 0, 10, 5), 60, 20);
        assert!(tiny.width <= 8 && tiny.height <= 3);
    }
}
