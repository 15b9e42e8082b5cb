//! Event handling for the parley TUI.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent,
};
use parley_engine::MIN_TICK_RATE_MS;
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
    /// Text pasted with bracketed paste enabled.
    Paste(String),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    ///
    /// Rates below [`MIN_TICK_RATE_MS`] are raised to it.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking, so it gets its own thread
        std::thread::spawn(move || {
            let tick_rate = tick_interval(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            CrosstermEvent::Key(key) => Some(Event::Key(key)),
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, blocking until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Poll timeout for the event thread.
///
/// A zero timeout would turn the thread into a busy loop of ticks.
fn tick_interval(tick_rate_ms: u64) -> Duration {
    Duration::from_millis(tick_rate_ms.max(MIN_TICK_RATE_MS))
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Submit,
    Back,
    NewLine,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    PageUp,
    PageDown,
    ScrollUp,
    ScrollDown,
    None,
}

/// Convert a key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('j') => Action::NewLine,
            KeyCode::Char('s') | KeyCode::Enter => Action::Submit,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => Action::NewLine,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Back,
        KeyCode::F(1) => Action::Help,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_tick_interval_has_floor() {
        assert_eq!(tick_interval(0), Duration::from_millis(MIN_TICK_RATE_MS));
        assert_eq!(tick_interval(1), Duration::from_millis(MIN_TICK_RATE_MS));
        assert_eq!(tick_interval(250), Duration::from_millis(250));
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn test_submit_keys() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(ctrl(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(ctrl(KeyCode::Char('s'))), Action::Submit);
    }

    #[test]
    fn test_newline_keys() {
        assert_eq!(key_to_action(ctrl(KeyCode::Char('j'))), Action::NewLine);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
            Action::NewLine
        );
    }

    #[test]
    fn test_quit_and_back() {
        assert_eq!(key_to_action(ctrl(KeyCode::Char('c'))), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Back);
    }

    #[test]
    fn test_characters_are_inserted() {
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Insert('q'));
        assert_eq!(key_to_action(key(KeyCode::Char('?'))), Action::Insert('?'));
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Action::Insert('A')
        );
    }

    #[test]
    fn test_unbound_control_keys() {
        assert_eq!(key_to_action(ctrl(KeyCode::Char('x'))), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Tab)), Action::None);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::Help);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::PageDown);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Up);
    }
}
