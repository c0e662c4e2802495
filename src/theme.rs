//! Theme colors, with optional overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;
use crate::labels::ExpiryStatus;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,           // Active borders, highlights
    pub fresh: Color,            // Fresh status badge, success messages
    pub expiring: Color,         // Expiring soon badge, warnings
    pub expired: Color,          // Expired badge, errors
    pub text: Color,             // Primary text
    pub text_dim: Color,         // Hints, secondary text
    pub bg_selected: Color,      // Selection background
    pub inactive: Color,         // Inactive borders
    pub header: Color,           // Table headers
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired palette
        Self {
            accent: Color::Rgb(250, 179, 135),
            fresh: Color::Rgb(166, 218, 149),
            expiring: Color::Rgb(249, 226, 175),
            expired: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied
    pub fn load(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            (&config.accent, &mut theme.accent, "accent"),
            (&config.fresh, &mut theme.fresh, "fresh"),
            (&config.expiring, &mut theme.expiring, "expiring"),
            (&config.expired, &mut theme.expired, "expired"),
            (&config.text, &mut theme.text, "text"),
        ];

        for (value, slot, key) in overrides {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring invalid theme color {} = {:?}", key, value),
            }
        }

        theme
    }

    pub fn status_color(&self, status: ExpiryStatus) -> Color {
        match status {
            ExpiryStatus::Fresh => self.fresh,
            ExpiryStatus::ExpiringSoon => self.expiring,
            ExpiryStatus::Expired => self.expired,
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#GGGGGG"), None);
        assert_eq!(Theme::parse_hex_color("#ёё"), None);
    }

    #[test]
    fn test_load_applies_valid_overrides_only() {
        let config = ThemeConfig {
            accent: Some("#000000".to_string()),
            expired: Some("not-a-color".to_string()),
            ..Default::default()
        };

        let theme = Theme::load(&config);
        let defaults = Theme::default();
        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.expired, defaults.expired);
        assert_eq!(theme.status_color(ExpiryStatus::Fresh), defaults.fresh);
    }
}
