//! Full-width input bar widget.
//!
//! Always visible at the bottom of the screen for text entry.
//! Supports multi-line input with Ctrl+J for newlines.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;
use crate::ui::widgets::TextInputState;

/// Full-width input bar for text entry.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    focused: bool,
    placeholder: Option<&'a str>,
    waiting_for: Option<&'a str>,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            focused: false,
            placeholder: None,
            waiting_for: None,
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Hint shown while the input is empty.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Replace the input with a waiting indicator for the named responder.
    #[must_use]
    pub fn waiting(mut self, responder: Option<&'a str>) -> Self {
        self.waiting_for = responder;
        self
    }

    /// Build Lines for multi-line input display.
    /// Returns the lines to display and which line index contains the cursor.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize) {
        let content = self.input.content();
        let cursor_pos = self.input.cursor();
        let text_style = Style::default().fg(self.theme.text);
        let prompt_style = Style::default().fg(self.theme.primary);

        if content.is_empty() {
            let mut spans = vec![Span::styled("> ", prompt_style)];
            if self.focused {
                spans.push(Span::styled("█", text_style));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(
                    placeholder.to_string(),
                    Style::default().fg(self.theme.muted),
                ));
            }
            return (vec![Line::from(spans)], 0);
        }

        let text_lines: Vec<&str> = content.split('\n').collect();

        // Locate the cursor line and column
        let mut char_count = 0;
        let mut cursor_line = 0;
        let mut cursor_col = 0;
        for (line_idx, line) in text_lines.iter().enumerate() {
            let line_len = line.chars().count();
            cursor_line = line_idx;
            if cursor_pos <= char_count + line_len {
                cursor_col = cursor_pos - char_count;
                break;
            }
            // +1 for the newline character
            char_count += line_len + 1;
        }

        let mut lines = Vec::with_capacity(text_lines.len());
        for (line_idx, line_text) in text_lines.iter().enumerate() {
            let prefix = if line_idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(prefix, prompt_style)];

            if self.focused && line_idx == cursor_line {
                let chars: Vec<char> = line_text.chars().collect();
                let split = cursor_col.min(chars.len());
                let before: String = chars[..split].iter().collect();
                let after: String = chars[split..].iter().collect();
                spans.push(Span::styled(before, text_style));
                spans.push(Span::styled("█", text_style));
                spans.push(Span::styled(after, text_style));
            } else {
                spans.push(Span::styled((*line_text).to_string(), text_style));
            }
            lines.push(Line::from(spans));
        }

        (lines, cursor_line)
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner_height = area.height.saturating_sub(2) as usize;

        let paragraph = if let Some(responder) = self.waiting_for {
            let display = format!("● Waiting for {responder}... (Esc to cancel)");
            Paragraph::new(display)
                .block(block)
                .style(Style::default().fg(self.theme.muted))
        } else {
            let (lines, cursor_line) = self.build_input_lines();

            // Keep the cursor line visible
            let scroll_offset = if lines.len() <= inner_height {
                0
            } else {
                cursor_line.saturating_sub(inner_height.saturating_sub(1))
            };

            Paragraph::new(lines)
                .block(block)
                .scroll((scroll_offset as u16, 0))
        };

        paragraph.render(area, buf);
    }
}
