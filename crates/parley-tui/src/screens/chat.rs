//! The chat screen: header, transcript, input bar and status bar.

use super::Screen;
use crate::app::App;
use crate::conversation::{input_placeholder, TranscriptWidget};
use crate::ui::{chat_layout, KeyHint, StatusBar};
use crate::widgets::InputBar;
use parley_engine::ResponseMode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Tallest the input bar grows before scrolling its content.
const MAX_INPUT_LINES: u16 = 6;

/// Main conversation screen.
pub struct ChatScreen;

/// Shorten a responder name to `max` cells, marking the cut with `…`.
fn fit_responder_name(name: &str, max: usize) -> String {
    if name.width() <= max {
        return name.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut fitted = String::new();
    let mut used = 0;
    for ch in name.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w >= max {
            break;
        }
        fitted.push(ch);
        used += w;
    }
    fitted.push('…');
    fitted
}

/// Header and status-bar labels for an in-flight request.
///
/// A complete-mode request has nothing to show until it resolves.
fn busy_labels(mode: ResponseMode) -> (&'static str, &'static str) {
    match mode {
        ResponseMode::Stream => ("● streaming", "STREAMING"),
        ResponseMode::Complete => ("● waiting", "WAITING"),
    }
}

impl ChatScreen {
    #[allow(clippy::cast_possible_truncation)]
    fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let theme = &app.theme;
        buf.set_style(area, theme.normal());

        let (status, color) = if app.conversation.is_busy() {
            (busy_labels(app.conversation.options().mode).0, theme.agent)
        } else {
            ("● ready", theme.muted)
        };
        let status_width = status.width() as u16 + 1;

        let responder = fit_responder_name(
            app.conversation.responder_name(),
            (area.width.saturating_sub(status_width + 10)) as usize,
        );
        let left = Line::from(vec![
            Span::styled(" parley ", theme.title()),
            Span::styled(responder, Style::default().fg(theme.subtext)),
        ]);
        buf.set_line(area.x, area.y, &left, area.width);

        if status_width < area.width {
            buf.set_string(
                area.x + area.width - status_width,
                area.y,
                status,
                Style::default().fg(color).bg(theme.base),
            );
        }
    }
}

impl Screen for ChatScreen {
    #[allow(clippy::cast_possible_truncation)]
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let theme = &app.theme;
        let busy = app.conversation.is_busy();
        let input_enabled = app.input_enabled();

        let layout = chat_layout(area, app.input.line_count() as u16, MAX_INPUT_LINES);

        Self::render_header(app, layout.header, buf);

        let transcript = TranscriptWidget::new(app.conversation.messages(), theme)
            .cursor_visible(app.cursor_visible())
            .scroll_back(app.scroll_back);
        app.max_scroll.set(transcript.max_scroll(layout.transcript));
        transcript.render(layout.transcript, buf);

        let placeholder = input_placeholder(busy, app.conversation.options().busy_policy);
        let waiting = (!input_enabled).then(|| app.conversation.responder_name());
        InputBar::new(&app.input, theme)
            .focused(input_enabled)
            .placeholder(placeholder)
            .waiting(waiting)
            .render(layout.input, buf);

        let (mode, hints) = if busy {
            (
                busy_labels(app.conversation.options().mode).1,
                vec![KeyHint::new("Esc", "Cancel"), KeyHint::new("PgUp", "Scroll")],
            )
        } else {
            (
                "CHAT",
                vec![
                    KeyHint::new("Enter", "Send"),
                    KeyHint::new("^J", "Newline"),
                    KeyHint::new("Esc", "Quit"),
                    KeyHint::new("F1", "Help"),
                ],
            )
        };
        let count = format!("{} messages", app.conversation.messages().len());
        let right = app.notification.as_deref().unwrap_or(count.as_str());
        StatusBar::new(mode, theme)
            .hints(hints)
            .right(right)
            .render(layout.status, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use crate::test_utils::{
        create_test_app, create_test_app_with, render_screen_to_string,
        render_screen_to_string_sized,
    };
    use async_trait::async_trait;
    use parley_engine::{
        ChunkCallback, Config, Responder, Response, SimulatedResponder, StreamHandle,
    };
    use std::sync::Arc;

    /// Simulated output under a long display name.
    struct NamedResponder;

    #[async_trait]
    impl Responder for NamedResponder {
        async fn complete(&self, prompt: &str) -> Response {
            SimulatedResponder::default().complete(prompt).await
        }

        fn stream(&self, prompt: &str, on_chunk: ChunkCallback) -> StreamHandle {
            SimulatedResponder::default().stream(prompt, on_chunk)
        }

        fn name(&self) -> &str {
            "a-responder-with-a-very-long-name"
        }
    }

    #[test]
    fn test_chat_screen_empty_state() {
        let app = create_test_app();
        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("parley"));
        assert!(text.contains("simulated"));
        assert!(text.contains("● ready"));
        assert!(text.contains("Start a conversation with the assistant"));
        assert!(text.contains("Type a message"));
        assert!(text.contains("CHAT"));
        assert!(text.contains("0 messages"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_screen_while_streaming() {
        let mut app = create_test_app();
        for c in "hi".chars() {
            app.handle_action(Action::Insert(c));
        }
        app.handle_action(Action::Submit);

        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("● streaming"));
        assert!(text.contains("You"));
        assert!(text.contains("Assistant"));
        assert!(text.contains("● Waiting for simulated... (Esc to cancel)"));
        assert!(text.contains("STREAMING"));

        app.conversation.wait_idle().await;
        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("● ready"));
        assert!(text.contains("This is a simulated streaming response"));
        assert!(text.contains("2 messages"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_mode_shows_waiting() {
        let mut config = Config::default();
        config.responder.mode = ResponseMode::Complete;
        let mut app = create_test_app_with(&config);
        for c in "hi".chars() {
            app.handle_action(Action::Insert(c));
        }
        app.handle_action(Action::Submit);

        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("● waiting"));
        assert!(text.contains("WAITING"));
        assert!(!text.contains("streaming"));
        assert!(!text.contains("STREAMING"));
    }

    #[test]
    fn test_fit_responder_name() {
        assert_eq!(fit_responder_name("simulated", 20), "simulated");
        assert_eq!(fit_responder_name("simulated", 9), "simulated");
        assert_eq!(fit_responder_name("simulated", 5), "simu…");
        assert_eq!(fit_responder_name("模拟助手", 5), "模拟…");
        assert_eq!(fit_responder_name("simulated", 1), "…");
        assert_eq!(fit_responder_name("simulated", 0), "");
    }

    #[test]
    fn test_long_responder_name_keeps_status_visible() {
        let app = App::from_config(&Config::default(), Arc::new(NamedResponder));
        let text = render_screen_to_string_sized(&ChatScreen, &app, 40, 10);
        let header = text.lines().next().unwrap();
        assert!(header.contains("a-responder-with-a-ve…"));
        assert!(header.ends_with("● ready"));
    }

    #[test]
    fn test_notification_replaces_message_count() {
        let mut app = create_test_app();
        app.set_notification("Saved".to_string());
        let text = render_screen_to_string(&ChatScreen, &app);
        assert!(text.contains("Saved"));
        assert!(!text.contains("0 messages"));
    }

    #[test]
    fn test_chat_screen_small_terminal() {
        let app = create_test_app();
        render_screen_to_string_sized(&ChatScreen, &app, 20, 6);
        render_screen_to_string_sized(&ChatScreen, &app, 5, 3);
    }
}
