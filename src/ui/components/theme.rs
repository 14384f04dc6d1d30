//! Colour palettes for the search box, suggestion panel, and leaderboard.
//!
//! Design principles:
//! - Muted surfaces, accents used sparingly for focus and selection
//! - High contrast where it matters (query text, highlighted suggestion)
//! - Error and success states readable on both dark and light backgrounds

use ratatui::style::{Color, Modifier, Style};

/// Tokyo-Night derived base colours used by the dark palette.
pub mod colors {
    use ratatui::style::Color;

    /// Elevated surface - panels, popups
    pub const BG_SURFACE: Color = Color::Rgb(36, 40, 59); // #24283b

    /// Subtle surface - highlighted rows
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5

    /// Lightened from #565f89 to stay legible as hint text
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7

    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    pub const STATUS_SUCCESS: Color = Color::Rgb(158, 206, 106); // #9ece6a

    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e

    pub const STATUS_WARNING: Color = Color::Rgb(224, 175, 104); // #e0af68
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub surface: Color,
    pub highlight: Color,
    pub hint: Color,
    pub border: Color,
    pub success: Color,
    pub error: Color,
    pub bar: Color,
}

impl ThemePalette {
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),     // Rich blue
            accent_alt: Color::Rgb(124, 93, 198), // Purple
            bg: Color::Rgb(250, 250, 252),        // Off-white
            fg: Color::Rgb(36, 41, 46),           // Near-black
            surface: Color::Rgb(240, 241, 245),   // Light gray
            highlight: Color::Rgb(221, 231, 252), // Pale blue
            hint: Color::Rgb(125, 134, 144),      // Medium gray
            border: Color::Rgb(216, 222, 228),    // Border gray
            success: Color::Rgb(45, 138, 72),     // Forest green
            error: Color::Rgb(200, 55, 70),       // Brick red
            bar: Color::Rgb(207, 107, 44),        // Warm orange
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: Color::Rgb(26, 27, 38),
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            highlight: colors::BG_HIGHLIGHT,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            success: colors::STATUS_SUCCESS,
            error: colors::STATUS_ERROR,
            bar: colors::STATUS_WARNING,
        }
    }

    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Highlighted suggestion row: bold, with both colours set so it reads
    /// on any terminal background.
    pub fn selected_style(self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn success_style(self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn bar_style(self) -> Style {
        Style::default().fg(self.bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_style_sets_both_colours() {
        for palette in [ThemePalette::dark(), ThemePalette::light()] {
            let style = palette.selected_style();
            assert!(style.fg.is_some());
            assert!(style.bg.is_some());
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn themes_differ() {
        assert_ne!(ThemePalette::dark().bg, ThemePalette::light().bg);
        assert_ne!(
            ThemePalette::dark().selected_style().bg,
            ThemePalette::light().selected_style().bg
        );
    }
}
