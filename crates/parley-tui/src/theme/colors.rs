//! Catppuccin color palettes for the chat UI.

use parley_engine::ThemeName;
use ratatui::style::{Color, Modifier, Style};

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,

    // Semantic
    pub warning: Color,
    pub error: Color,

    // Sender attribution
    pub user: Color,
    pub agent: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Theme matching a configured name.
    pub fn for_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::mocha(),
            ThemeName::Light => Self::latte(),
        }
    }

    /// Catppuccin Mocha theme (default dark theme).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            primary: Color::Rgb(180, 190, 254), // #b4befe (lavender)

            warning: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
            error: Color::Rgb(243, 139, 168),   // #f38ba8 (red)

            user: Color::Rgb(250, 179, 135),  // #fab387 (peach)
            agent: Color::Rgb(148, 226, 213), // #94e2d5 (teal)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe
        }
    }

    /// Catppuccin Latte theme (light theme).
    pub fn latte() -> Self {
        Self {
            base: Color::Rgb(239, 241, 245),    // #eff1f5
            surface: Color::Rgb(230, 233, 239), // #e6e9ef

            text: Color::Rgb(76, 79, 105),    // #4c4f69
            subtext: Color::Rgb(92, 95, 119), // #5c5f77
            muted: Color::Rgb(140, 143, 161), // #8c8fa1

            primary: Color::Rgb(114, 135, 253), // #7287fd

            warning: Color::Rgb(223, 142, 29), // #df8e1d
            error: Color::Rgb(210, 15, 57),    // #d20f39

            user: Color::Rgb(254, 100, 11),  // #fe640b
            agent: Color::Rgb(23, 146, 153), // #179299

            border: Color::Rgb(188, 192, 204),         // #bcc0cc
            border_focused: Color::Rgb(114, 135, 253), // #7287fd
        }
    }

    /// Default text on the base background.
    pub fn normal(&self) -> Style {
        Style::default().fg(self.text).bg(self.base)
    }

    /// Block titles.
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Key caps in hint rows.
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.base)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Status bar background.
    pub fn status_bar(&self) -> Style {
        Style::default().fg(self.subtext).bg(self.surface)
    }

    /// Border style by focus.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mocha_theme_creates() {
        let theme = Theme::mocha();
        assert!(matches!(theme.base, Color::Rgb(30, 30, 46)));
    }

    #[test]
    fn test_latte_theme_creates() {
        let theme = Theme::latte();
        assert!(matches!(theme.base, Color::Rgb(239, 241, 245)));
    }

    #[test]
    fn test_for_name() {
        assert!(matches!(
            Theme::for_name(ThemeName::Dark).base,
            Color::Rgb(30, 30, 46)
        ));
        assert!(matches!(
            Theme::for_name(ThemeName::Light).base,
            Color::Rgb(239, 241, 245)
        ));
    }

    #[test]
    fn test_sender_colors_differ() {
        let theme = Theme::default();
        assert_ne!(theme.user, theme.agent);
    }
}
