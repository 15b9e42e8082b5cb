//! Status bar widget.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

/// A key hint for the status bar.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar widget displayed at the bottom of the screen.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    right_text: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            right_text: None,
            theme,
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let bar_style = self.theme.status_bar();
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), bar_style);

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Style::default().bg(self.theme.primary).fg(self.theme.base),
            ),
            Span::styled(" ", bar_style),
        ];

        for hint in &self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), self.theme.key_hint()));
            spans.push(Span::styled(format!(" {} ", hint.label), bar_style));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        if let Some(text) = self.right_text {
            let text_width = text.width() as u16;
            if text_width < area.width {
                let x = area.x + area.width - text_width - 1;
                buf.set_string(x, area.y, text, bar_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_status_bar_renders_mode_and_hints() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new("CHAT", &theme)
            .hints(vec![KeyHint::new("Enter", "Send")])
            .right("ready")
            .render(area, &mut buf);

        let text = buffer_to_string(&buf);
        assert!(text.starts_with(" CHAT"));
        assert!(text.contains("Enter"));
        assert!(text.contains("Send"));
        assert!(text.trim_end().ends_with("ready"));
    }
}
