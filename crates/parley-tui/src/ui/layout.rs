//! Layout helpers for the parley TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Regions of the chat screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub header: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Split the screen into header, transcript, input bar and status bar.
///
/// The input bar grows with multi-line input up to `max_input_lines`.
pub fn chat_layout(area: Rect, input_lines: u16, max_input_lines: u16) -> ChatLayout {
    let input_height = input_lines.clamp(1, max_input_lines.max(1)) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(area);
    ChatLayout {
        header: chunks[0],
        transcript: chunks[1],
        input: chunks[2],
        status: chunks[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_fixed(40, 10, area);
        assert_eq!(rect, Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn test_centered_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_fixed(40, 10, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 5);
    }

    #[test]
    fn test_chat_layout_fills_area() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = chat_layout(area, 1, 6);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.transcript.height, 19);
        assert_eq!(layout.status.y, 23);
    }

    #[test]
    fn test_chat_layout_caps_input_height() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = chat_layout(area, 20, 6);
        assert_eq!(layout.input.height, 8);
    }
}
