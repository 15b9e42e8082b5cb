//! Transcript widget.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use chrono::{DateTime, Local, TimeZone, Utc};
use parley_engine::{Message, MessageStatus, Sender};

use crate::text::wrap_text;
use crate::theme::Theme;

/// Glyph appended to the message that is still receiving fragments.
pub const STREAMING_CURSOR: &str = "▋";

/// Indent applied to message bodies under their role label.
const BODY_INDENT: &str = "  ";

/// Scrollable view of the message log.
///
/// ```text
/// ┌ Conversation ────────────────────────┐
/// │ You 14:02                            │
/// │   hi                                 │
/// │                                      │
/// │ Assistant 14:02                      │
/// │   This is a simulated streaming ▋    │
/// └──────────────────────────────────────┘
/// ```
pub struct TranscriptWidget<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    cursor_visible: bool,
    scroll_back: usize,
}

impl<'a> TranscriptWidget<'a> {
    /// Create a transcript over the given messages.
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            cursor_visible: true,
            scroll_back: 0,
        }
    }

    /// Blink phase of the streaming cursor.
    #[must_use]
    pub fn cursor_visible(mut self, visible: bool) -> Self {
        self.cursor_visible = visible;
        self
    }

    /// Lines scrolled up from the bottom; 0 follows the newest output.
    #[must_use]
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    fn block(&self) -> Block<'static> {
        Block::default()
            .title(" Conversation ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false))
            .style(Style::default().bg(self.theme.base))
    }

    /// Largest scroll offset that still shows content when rendered in `area`.
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner = self.block().inner(area);
        if inner.width == 0 {
            return 0;
        }
        transcript_lines(self.messages, self.theme, inner.width as usize, true)
            .len()
            .saturating_sub(inner.height as usize)
    }

    fn render_empty(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let y = area.y + area.height.saturating_sub(2) / 2;
        let lines = vec![
            Line::from(Span::styled(
                "Start a conversation with the assistant",
                Style::default().fg(self.theme.subtext),
            )),
            Line::from(Span::styled(
                "Type below and press Enter",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let height = area.height.min(2).min(area.y + area.height - y);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(Rect::new(area.x, y, area.width, height), buf);
    }
}

/// Wall-clock `HH:MM` for a message timestamp in the given zone.
fn clock_label<Tz: TimeZone>(at: &DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(zone).format("%H:%M").to_string()
}

/// Lay out the transcript as display lines for the given width.
pub fn transcript_lines(
    messages: &[Message],
    theme: &Theme,
    width: usize,
    cursor_visible: bool,
) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(BODY_INDENT.len()).max(1);
    let mut lines = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }

        let (label, color) = match message.sender {
            Sender::User => ("You", theme.user),
            Sender::Agent => ("Assistant", theme.agent),
        };
        lines.push(Line::from(vec![
            Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", clock_label(&message.created_at, &Local)),
                Style::default().fg(theme.muted),
            ),
        ]));

        let body_style = Style::default().fg(theme.text);
        let mut body: Vec<Line<'static>> = if message.content.is_empty() {
            Vec::new()
        } else {
            wrap_text(&message.content, body_width)
                .into_iter()
                .map(|l| Line::from(vec![Span::raw(BODY_INDENT), Span::styled(l, body_style)]))
                .collect()
        };

        match &message.status {
            MessageStatus::Streaming => {
                let cursor = if cursor_visible { STREAMING_CURSOR } else { " " };
                let cursor = Span::styled(cursor, Style::default().fg(theme.agent));
                match body.last_mut() {
                    Some(last) => last.spans.push(cursor),
                    None => body.push(Line::from(vec![Span::raw(BODY_INDENT), cursor])),
                }
            }
            MessageStatus::Done => {}
            MessageStatus::Cancelled => body.push(Line::from(vec![
                Span::raw(BODY_INDENT),
                Span::styled(
                    "(cancelled)",
                    Style::default()
                        .fg(theme.muted)
                        .add_modifier(Modifier::ITALIC),
                ),
            ])),
            MessageStatus::Failed { reason } => body.push(Line::from(vec![
                Span::raw(BODY_INDENT),
                Span::styled(
                    format!("[x] Response failed: {reason}"),
                    Style::default().fg(theme.error),
                ),
            ])),
        }

        lines.extend(body);
    }

    lines
}

impl Widget for TranscriptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        if self.messages.is_empty() {
            self.render_empty(inner, buf);
            return;
        }

        let lines = transcript_lines(
            self.messages,
            self.theme,
            inner.width as usize,
            self.cursor_visible,
        );

        // Anchor to the bottom, then step back by the scroll offset.
        let height = inner.height as usize;
        let max_scroll = lines.len().saturating_sub(height);
        let start = max_scroll - self.scroll_back.min(max_scroll);
        let visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(height).collect();

        Paragraph::new(visible).render(inner, buf);
    }
}
