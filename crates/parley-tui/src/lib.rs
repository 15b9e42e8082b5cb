//! parley-tui: Terminal chat interface for parley
//!
//! This crate provides the TUI layer for parley, including:
//! - The chat screen (transcript, input bar, status bar)
//! - Help and quit overlays
//! - Headless mode for testing and automation

mod app;
mod conversation;
mod event;
pub mod headless;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
mod ui;
mod widgets;

pub use app::{App, Screen};
pub use event::{key_to_action, Action, Event, EventHandler};
pub use parley_engine;
pub use theme::Theme;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parley_engine::{Config, Responder};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// What woke the event loop.
enum LoopEvent {
    Terminal(Event),
    Conversation,
    Closed,
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    config: &Config,
    responder: Arc<dyn Responder>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::from_config(config, responder);
    let mut events = EventHandler::new(config.ui.tick_rate_ms);
    info!(
        responder = app.conversation.responder_name(),
        tick_rate_ms = config.ui.tick_rate_ms,
        "tui started"
    );

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::draw(app, area, frame.buffer_mut());
        })?;

        if app.should_quit {
            break;
        }

        // Responder output wakes the loop directly so fragments render
        // without waiting for the next tick.
        let busy = app.conversation.is_busy();
        let woke = tokio::select! {
            event = events.next() => event.map_or(LoopEvent::Closed, LoopEvent::Terminal),
            _ = app.conversation.next_event(), if busy => LoopEvent::Conversation,
        };

        match woke {
            LoopEvent::Terminal(event) => handle_event(app, event),
            LoopEvent::Conversation => {}
            LoopEvent::Closed => break,
        }
    }

    Ok(())
}

fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => {
            if key.kind != KeyEventKind::Press {
                return;
            }
            app.handle_action(key_to_action(key));
            app.conversation.pump();
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => app.handle_action(Action::ScrollUp),
            MouseEventKind::ScrollDown => app.handle_action(Action::ScrollDown),
            _ => {}
        },
        Event::Paste(text) => app.paste(&text),
        Event::Tick => app.tick(),
        Event::Resize(_, _) => {
            // Terminal will handle resize automatically
        }
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut app = create_test_app();
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_event(&mut app, Event::Key(release));
        assert!(app.input.is_empty());

        handle_event(
            &mut app,
            Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
        );
        assert_eq!(app.input.content(), "a");
    }

    #[test]
    fn test_paste_event_fills_input() {
        let mut app = create_test_app();
        handle_event(&mut app, Event::Paste("line one\r\nline two".to_string()));
        assert_eq!(app.input.content(), "line one\nline two");
        assert_eq!(app.input.line_count(), 2);
    }

    #[test]
    fn test_tick_event_advances_app() {
        let mut app = create_test_app();
        handle_event(&mut app, Event::Tick);
        assert_eq!(app.tick, 1);
    }
}
