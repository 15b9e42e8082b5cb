//! Application state and update logic for the parley TUI.

use std::cell::Cell;
use std::sync::Arc;

use parley_engine::{
    BusyPolicy, Config, Conversation, ConversationError, ConversationOptions, Responder,
};
use tracing::{debug, warn};

use crate::event::Action;
use crate::theme::Theme;
use crate::ui::widgets::TextInputState;

/// Lines moved by a PageUp/PageDown.
const PAGE_SCROLL: usize = 10;

/// Lines moved by a mouse wheel step.
const WHEEL_SCROLL: usize = 3;

/// Ticks a notification stays visible (~3 seconds at 4 Hz).
const NOTIFICATION_TICKS: usize = 12;

/// The current screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Chat,
    QuitConfirm,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Current screen.
    pub screen: Screen,

    /// The chat session.
    pub conversation: Conversation,

    /// Prompt being composed.
    pub input: TextInputState,

    /// Color scheme.
    pub theme: Theme,

    /// Tick counter for animations.
    pub tick: usize,

    /// Transcript lines scrolled up from the bottom.
    pub scroll_back: usize,

    /// Largest useful `scroll_back`, updated by the last render.
    pub(crate) max_scroll: Cell<usize>,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,
}

impl App {
    /// Create an app around an existing conversation.
    pub fn new(conversation: Conversation, theme: Theme) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            screen: Screen::Chat,
            conversation,
            input: TextInputState::new(),
            theme,
            tick: 0,
            scroll_back: 0,
            max_scroll: Cell::new(0),
            notification: None,
            notification_ttl: 0,
        }
    }

    /// Create an app from configuration and a shared responder.
    pub fn from_config(config: &Config, responder: Arc<dyn Responder>) -> Self {
        let conversation = Conversation::new(responder, ConversationOptions::from(config));
        Self::new(conversation, Theme::for_name(config.ui.theme))
    }

    /// Whether the input bar accepts edits and submissions.
    pub fn input_enabled(&self) -> bool {
        !self.conversation.is_busy()
            || self.conversation.options().busy_policy == BusyPolicy::CancelPrevious
    }

    /// Whether the streaming cursor is in its visible blink phase.
    pub fn cursor_visible(&self) -> bool {
        self.tick % 2 == 0
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.screen {
            Screen::Chat => self.handle_chat_action(action),
            Screen::QuitConfirm => self.handle_quit_confirm_action(action),
        }
    }

    fn handle_chat_action(&mut self, action: Action) {
        match action {
            Action::Back => {
                if self.conversation.is_busy() {
                    self.conversation.cancel();
                } else {
                    self.screen = Screen::QuitConfirm;
                }
            }
            Action::Submit => self.submit_input(),
            Action::Insert('?') if self.input.is_empty() => self.show_help = true,
            Action::PageUp => self.scroll_up(PAGE_SCROLL),
            Action::PageDown => self.scroll_down(PAGE_SCROLL),
            Action::ScrollUp => self.scroll_up(WHEEL_SCROLL),
            Action::ScrollDown => self.scroll_down(WHEEL_SCROLL),
            _ if self.input_enabled() => self.handle_edit_action(action),
            _ => {}
        }
    }

    fn handle_edit_action(&mut self, action: Action) {
        match action {
            Action::Insert(c) => self.input.insert(c),
            Action::NewLine => self.input.insert('\n'),
            Action::Backspace => self.input.backspace(),
            Action::Delete => self.input.delete(),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::Up => self.input.history_prev(),
            Action::Down => self.input.history_next(),
            _ => {}
        }
    }

    fn handle_quit_confirm_action(&mut self, action: Action) {
        match action {
            Action::Submit | Action::Insert('y' | 'Y') => self.should_quit = true,
            Action::Back | Action::Insert('n' | 'N') => self.screen = Screen::Chat,
            _ => {}
        }
    }

    /// Insert pasted text at the cursor.
    ///
    /// Line endings are normalized to `\n`; pastes while input is disabled
    /// or outside the chat screen are dropped.
    pub fn paste(&mut self, text: &str) {
        if self.show_help || self.screen != Screen::Chat || !self.input_enabled() {
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.input.insert_str(&text);
    }

    /// Submit the composed prompt to the conversation.
    ///
    /// Rejected prompts stay in the input bar and raise a notification.
    pub fn submit_input(&mut self) {
        if !self.input_enabled() {
            self.set_notification("A response is still in progress".to_string());
            return;
        }

        let prompt = self.input.submit();
        match self.conversation.submit(&prompt) {
            Ok(message_id) => {
                debug!(%message_id, "submitted from input bar");
                self.scroll_back = 0;
            }
            Err(ConversationError::EmptyPrompt) => {}
            Err(e) => {
                warn!(error = %e, "submit rejected");
                self.input.restore(prompt);
                self.set_notification(e.to_string());
            }
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = (self.scroll_back + lines).min(self.max_scroll.get());
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Set a temporary notification message.
    pub fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Apply pending responder output and advance time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.conversation.pump();

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_app_with};
    use parley_engine::{MessageStatus, ResponseMode, Sender};

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Insert(c));
        }
    }

    #[test]
    fn test_screen_enum() {
        assert_eq!(Screen::default(), Screen::Chat);
        assert_ne!(Screen::Chat, Screen::QuitConfirm);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_streams_into_transcript() {
        let mut app = create_test_app();
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);

        assert!(app.input.is_empty());
        assert!(app.conversation.is_busy());
        assert!(!app.input_enabled());
        assert_eq!(app.conversation.messages().len(), 2);

        app.conversation.wait_idle().await;
        let reply = &app.conversation.messages()[1];
        assert_eq!(reply.sender, Sender::Agent);
        assert_eq!(reply.status, MessageStatus::Done);
        assert!(reply.content.contains("\"hi\""));
        assert!(app.input_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_disabled_while_busy() {
        let mut app = create_test_app();
        type_text(&mut app, "first");
        app.handle_action(Action::Submit);

        type_text(&mut app, "ignored");
        app.paste("also ignored");
        assert!(app.input.is_empty());

        app.submit_input();
        assert_eq!(
            app.notification.as_deref(),
            Some("A response is still in progress")
        );
        assert_eq!(app.conversation.messages().len(), 2);
    }

    #[test]
    fn test_paste_inserts_at_cursor() {
        let mut app = create_test_app();
        type_text(&mut app, "ab");
        app.handle_action(Action::Left);
        app.paste("x\ry");
        assert_eq!(app.input.content(), "ax\nyb");

        app.show_help = true;
        app.paste("dropped");
        assert_eq!(app.input.content(), "ax\nyb");
    }

    #[tokio::test(start_paused = true)]
    async fn test_esc_cancels_then_opens_quit_confirm() {
        let mut app = create_test_app();
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);

        app.handle_action(Action::Back);
        assert!(!app.conversation.is_busy());
        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(
            app.conversation.messages()[1].status,
            MessageStatus::Cancelled
        );

        app.handle_action(Action::Back);
        assert_eq!(app.screen, Screen::QuitConfirm);
    }

    #[test]
    fn test_quit_confirm() {
        let mut app = create_test_app();
        app.screen = Screen::QuitConfirm;
        app.handle_action(Action::Insert('n'));
        assert_eq!(app.screen, Screen::Chat);
        assert!(!app.should_quit);

        app.screen = Screen::QuitConfirm;
        app.handle_action(Action::Insert('y'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_immediately() {
        let mut app = create_test_app();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_toggle_and_close() {
        let mut app = create_test_app();
        app.handle_action(Action::Help);
        assert!(app.show_help);

        app.handle_action(Action::Insert('x'));
        assert!(!app.show_help);
        assert!(app.input.is_empty());

        app.handle_action(Action::Insert('?'));
        assert!(app.show_help);
        app.handle_action(Action::Help);
        assert!(!app.show_help);

        type_text(&mut app, "why?");
        assert_eq!(app.input.content(), "why?");
        assert!(!app.show_help);
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut app = create_test_app();
        type_text(&mut app, "   ");
        app.handle_action(Action::Submit);
        assert!(app.conversation.messages().is_empty());
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_newline_and_history() {
        let mut app = create_test_app();
        type_text(&mut app, "a");
        app.handle_action(Action::NewLine);
        type_text(&mut app, "b");
        assert_eq!(app.input.content(), "a\nb");
        assert_eq!(app.input.line_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_recall_after_submit() {
        let mut app = create_test_app();
        type_text(&mut app, "again");
        app.handle_action(Action::Submit);
        app.conversation.wait_idle().await;

        app.handle_action(Action::Up);
        assert_eq!(app.input.content(), "again");
        app.handle_action(Action::Down);
        assert!(app.input.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_previous_policy_keeps_input_enabled() {
        let mut config = Config::default();
        config.busy_policy = BusyPolicy::CancelPrevious;
        let mut app = create_test_app_with(&config);

        type_text(&mut app, "first");
        app.handle_action(Action::Submit);
        assert!(app.input_enabled());

        type_text(&mut app, "second");
        app.handle_action(Action::Submit);

        let messages = app.conversation.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].status, MessageStatus::Cancelled);
        assert!(messages[3].is_streaming());

        app.conversation.wait_idle().await;
        assert!(app.conversation.messages()[3]
            .content
            .contains("\"second\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_mode_resolves_whole_response() {
        let mut config = Config::default();
        config.responder.mode = ResponseMode::Complete;
        let mut app = create_test_app_with(&config);

        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);
        assert!(app.conversation.messages()[1].content.is_empty());

        app.conversation.wait_idle().await;
        assert!(app.conversation.messages()[1]
            .content
            .starts_with("This is a simulated response"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_pumps_events_and_expires_notification() {
        let mut app = create_test_app();
        app.set_notification("hello".to_string());
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit);

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        for _ in 0..NOTIFICATION_TICKS {
            app.tick();
        }

        assert!(app.notification.is_none());
        assert!(!app.conversation.is_busy());
        assert_eq!(
            app.conversation.messages()[1].status,
            MessageStatus::Done
        );
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut app = create_test_app();
        app.max_scroll.set(5);
        app.handle_action(Action::PageUp);
        assert_eq!(app.scroll_back, 5);
        app.handle_action(Action::ScrollDown);
        assert_eq!(app.scroll_back, 2);
        app.handle_action(Action::PageDown);
        assert_eq!(app.scroll_back, 0);
    }
}
