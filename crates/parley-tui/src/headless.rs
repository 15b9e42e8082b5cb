//! Headless mode for the parley TUI.
//!
//! Runs the app against a `TestBackend` instead of a real terminal,
//! enabling end-to-end testing and automation. Actions are sent via a
//! channel and the rendered screen is published after every draw.

use crate::app::{App, Screen};
use crate::event::Action;
use crate::screens;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Current screen being displayed.
    pub screen: Screen,
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Whether a response is in flight.
    pub busy: bool,
    /// Number of messages in the transcript.
    pub message_count: usize,
}

/// Handle to control a headless TUI instance.
///
/// Use this to send actions and observe state changes.
pub struct HeadlessHandle {
    action_tx: mpsc::UnboundedSender<Action>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an action to the TUI.
    ///
    /// Returns `true` if the action was sent successfully.
    pub fn send_action(&self, action: Action) -> bool {
        self.action_tx.send(action).is_ok()
    }

    /// Type text into the input bar, one character at a time.
    pub fn send_text(&self, text: &str) -> bool {
        text.chars().all(|c| {
            let action = if c == '\n' {
                Action::NewLine
            } else {
                Action::Insert(c)
            };
            self.send_action(action)
        })
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the TUI task ended
                _ => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Wait for a specific screen to be displayed.
    pub async fn wait_for_screen(
        &mut self,
        screen: Screen,
        timeout: Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen == screen, timeout).await
    }

    /// Wait until no response is in flight.
    pub async fn wait_for_idle(&mut self, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| !s.busy, timeout).await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50, // Faster tick rate for testing
        }
    }
}

/// What woke the headless loop.
enum Step {
    Action(Action),
    Tick,
    Redraw,
    Closed,
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background
/// task. The task ends when the app quits or the handle is dropped.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(app, HeadlessConfig::default());
///
/// handle.send_text("hi");
/// handle.send_action(Action::Submit);
/// let state = handle.wait_for_text("simulated", Duration::from_secs(1)).await;
///
/// handle.send_action(Action::Quit);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    app: App,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(app, config, action_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    let handle = HeadlessHandle {
        action_tx,
        state_rx,
    };

    (handle, task)
}

async fn run_headless_loop(
    mut app: App,
    config: HeadlessConfig,
    mut action_rx: mpsc::UnboundedReceiver<Action>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    let tick_duration = Duration::from_millis(config.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::draw(&app, area, frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState {
            screen: app.screen,
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            busy: app.conversation.is_busy(),
            message_count: app.conversation.messages().len(),
        });

        if app.should_quit {
            break;
        }

        let busy = app.conversation.is_busy();
        let step = tokio::select! {
            action = action_rx.recv() => action.map_or(Step::Closed, Step::Action),
            _ = app.conversation.next_event(), if busy => Step::Redraw,
            () = tokio::time::sleep(tick_duration) => Step::Tick,
        };

        match step {
            Step::Action(action) => app.handle_action(action),
            Step::Tick => app.tick(),
            Step::Redraw => {}
            Step::Closed => break,
        }
    }

    Ok(())
}

/// Convert a terminal buffer to a string representation.
///
/// Trailing whitespace on each row is trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
