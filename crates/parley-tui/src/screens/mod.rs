//! Screen definitions for the parley TUI.

pub mod chat;
pub mod quit;

use crate::app::{self, App};
use crate::theme::Theme;
use crate::ui::centered_fixed;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the current screen plus any overlays.
pub fn draw(app: &App, area: Rect, buf: &mut Buffer) {
    match app.screen {
        app::Screen::Chat => chat::ChatScreen.render(app, area, buf),
        app::Screen::QuitConfirm => quit::QuitConfirmScreen.render(app, area, buf),
    }

    if app.show_help {
        render_help_overlay(&app.theme, area, buf);
    }
}

/// Render the help overlay.
pub fn render_help_overlay(theme: &Theme, area: Rect, buf: &mut Buffer) {
    let help_text = r"
  Chat
    Enter / Ctrl+S    Send message
    Ctrl+J            New line
    Up / Down         Input history
    PgUp / PgDn       Scroll transcript
    Esc               Cancel response / quit
    Ctrl+C            Quit immediately
    ? / F1            Toggle this help

  [Press any key to close]
";

    let width = 50.min(area.width.saturating_sub(4));
    let height = 15.min(area.height.saturating_sub(4));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
        .style(theme.normal());

    Paragraph::new(help_text)
        .block(block)
        .style(theme.normal())
        .render(overlay_area, buf);
}
