//! Quit confirmation overlay.

use super::chat::ChatScreen;
use super::Screen;
use crate::app::App;
use crate::ui::centered_fixed;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Confirmation dialog drawn over the chat screen.
pub struct QuitConfirmScreen;

impl Screen for QuitConfirmScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ChatScreen.render(app, area, buf);

        let theme = &app.theme;
        let dialog = centered_fixed(36, 5, area);
        Clear.render(dialog, buf);

        let block = Block::default()
            .title(" Quit ")
            .title_style(Style::default().fg(theme.warning))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning))
            .style(theme.normal());

        let lines = vec![
            Line::from("Quit parley?"),
            Line::from(vec![
                Span::styled(" y ", theme.key_hint()),
                Span::raw(" Yes   "),
                Span::styled(" n ", theme.key_hint()),
                Span::raw(" No"),
            ]),
        ];

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .style(theme.normal())
            .render(dialog, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, render_screen_to_string};

    #[test]
    fn test_quit_dialog_renders() {
        let app = create_test_app();
        let text = render_screen_to_string(&QuitConfirmScreen, &app);
        assert!(text.contains("Quit parley?"));
        assert!(text.contains(" y  Yes"));
        assert!(text.contains(" n  No"));
        // Chat screen stays visible underneath
        assert!(text.contains("Conversation"));
    }
}
