//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

use nethawk_core::{ConnectionState, NotifyLevel};

// ── Palette ───────────────────────────────────────────────────────────

pub const HAWK_AMBER: Color = Color::Rgb(255, 183, 77); // #ffb74d
pub const SKY_CYAN: Color = Color::Rgb(102, 217, 239); // #66d9ef
pub const ROSE: Color = Color::Rgb(249, 38, 114); // #f92672
pub const SIGNAL_YELLOW: Color = Color::Rgb(230, 219, 116); // #e6db74
pub const SUCCESS_GREEN: Color = Color::Rgb(166, 226, 46); // #a6e22e
pub const ERROR_RED: Color = Color::Rgb(255, 85, 85); // #ff5555

pub const DIM_WHITE: Color = Color::Rgb(200, 200, 194); // #c8c8c2
pub const BORDER_GRAY: Color = Color::Rgb(117, 113, 94); // #75715e
pub const BG_HIGHLIGHT: Color = Color::Rgb(62, 61, 50); // #3e3d32
pub const BG_DARK: Color = Color::Rgb(39, 40, 34); // #272822

/// Download series in charts.
pub const DOWNLOAD: Color = SKY_CYAN;
/// Upload series in charts.
pub const UPLOAD: Color = HAWK_AMBER;

// ── Styles ────────────────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(HAWK_AMBER).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(HAWK_AMBER)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(SKY_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(HAWK_AMBER)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(HAWK_AMBER).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(SKY_CYAN).add_modifier(Modifier::BOLD)
}

/// Label column in key/value panes.
pub fn label() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn value() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn error() -> Style {
    Style::default().fg(ERROR_RED)
}

// ── State colors ──────────────────────────────────────────────────────

pub fn notify_color(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Info => SKY_CYAN,
        NotifyLevel::Success => SUCCESS_GREEN,
        NotifyLevel::Warning => SIGNAL_YELLOW,
        NotifyLevel::Error => ERROR_RED,
    }
}

pub fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => SUCCESS_GREEN,
        ConnectionState::Connecting | ConnectionState::Reconnecting { .. } => SIGNAL_YELLOW,
        ConnectionState::Disconnected | ConnectionState::Failed => ERROR_RED,
    }
}

/// Green below 60%, yellow below 80%, red above.
pub fn load_color(percent: f64) -> Color {
    if percent >= 80.0 {
        ERROR_RED
    } else if percent >= 60.0 {
        SIGNAL_YELLOW
    } else {
        SUCCESS_GREEN
    }
}
