//! Single-line text input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::theme;

/// What a key did to a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Edited,
    Submit,
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    masked: bool,
}

impl Field {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            masked: false,
        }
    }

    /// Renders bullets instead of the value.
    pub fn masked(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FieldEvent {
        match key.code {
            KeyCode::Enter => FieldEvent::Submit,
            KeyCode::Esc => FieldEvent::Cancel,
            KeyCode::Backspace => {
                self.value.pop();
                FieldEvent::Edited
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                FieldEvent::Edited
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                FieldEvent::Edited
            }
            _ => FieldEvent::Ignored,
        }
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    pub fn line(&self, editing: bool) -> Line<'_> {
        let shown = if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };
        let value_style = if editing {
            Style::default()
                .fg(theme::HAWK_AMBER)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            theme::value()
        };
        let mut spans = vec![
            Span::styled(format!(" {:<10}", self.label), theme::label()),
            Span::styled(shown, value_style),
        ];
        if editing {
            spans.push(Span::styled("▏", Style::default().fg(theme::HAWK_AMBER)));
        }
        Line::from(spans)
    }
}

/// Modal one-field prompt centered over the whole frame.
pub fn render_prompt(frame: &mut Frame, title: &str, note: &str, field: &Field) {
    let area = super::centered(frame.area(), 56, 6);
    frame.render_widget(Clear, area);
    let block = super::panel(title, true).style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {note}"), theme::label())),
        rows[0],
    );
    frame.render_widget(Paragraph::new(field.line(true)), rows[2]);
    frame.render_widget(
        Paragraph::new(super::hint_line(&[("Enter", "confirm"), ("Esc", "cancel")])),
        rows[3],
    );
}
