//! Test utilities for parley-tui rendering and integration tests.
//!
//! Helpers for building apps backed by a fast simulated responder and for
//! turning rendered buffers into plain text for assertions.

use std::sync::Arc;
use std::time::Duration;

use crate::app::App;
use crate::screens::{self, Screen as ScreenTrait};
use async_trait::async_trait;
use parley_engine::{
    stream_channel, ChunkCallback, Config, Responder, Response, SimulatedResponder, StreamHandle,
};
use ratatui::{buffer::Buffer, layout::Rect};

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Fragment delay used by test responders.
pub const TEST_CHUNK_DELAY: Duration = Duration::from_millis(5);

/// A simulated responder with short delays.
pub fn fast_responder() -> Arc<SimulatedResponder> {
    Arc::new(SimulatedResponder::with_delays(
        TEST_CHUNK_DELAY,
        Duration::from_millis(20),
    ))
}

/// Responder whose every request fails.
pub struct FailingResponder;

/// Reason reported by [`FailingResponder`].
pub const FAILURE_REASON: &str = "backend unavailable";

#[async_trait]
impl Responder for FailingResponder {
    async fn complete(&self, _prompt: &str) -> Response {
        Response::error(FAILURE_REASON)
    }

    fn stream(&self, _prompt: &str, on_chunk: ChunkCallback) -> StreamHandle {
        let (driver, handle) = stream_channel(on_chunk);
        driver.start();
        driver.fail(FAILURE_REASON);
        handle
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Create a test app with the default configuration.
pub fn create_test_app() -> App {
    create_test_app_with(&Config::default())
}

/// Create a test app with the given configuration and a fast responder.
pub fn create_test_app_with(config: &Config) -> App {
    App::from_config(config, fast_responder())
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    render_screen_to_string_sized(screen, app, TEST_WIDTH, TEST_HEIGHT)
}

/// Draw the app's current screen and overlays, as the event loop does.
pub fn draw_app_to_string(app: &App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screens::draw(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

/// Render a screen with custom dimensions and return it as a string.
pub fn render_screen_to_string_sized<S: ScreenTrait>(
    screen: &S,
    app: &App,
    width: u16,
    height: u16,
) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Screen;

    #[test]
    fn test_create_test_app() {
        let app = create_test_app();
        assert_eq!(app.screen, Screen::Chat);
        assert!(app.conversation.messages().is_empty());
        assert_eq!(app.conversation.responder_name(), "simulated");
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        let result = buffer_to_string(&buffer);
        assert_eq!(result, "Hello\nWorld\n");
    }
}
