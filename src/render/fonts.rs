use crate::config::FontConfig;
use crate::logging::get_logger;
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{
    FONT_5X8, FONT_6X10, FONT_6X12, FONT_6X13_BOLD, FONT_7X13, FONT_7X13_BOLD, FONT_9X18,
    FONT_9X18_BOLD, FONT_10X20,
};

/// The five text sizes used on the dashboard
#[derive(Clone, Copy)]
pub struct FontSet {
    /// Headline prices
    pub xlarge: &'static MonoFont<'static>,
    /// Min/max prices, tomorrow max
    pub large: &'static MonoFont<'static>,
    /// Title, clock, box labels
    pub medium: &'static MonoFont<'static>,
    /// Hour labels, unit suffixes
    pub small: &'static MonoFont<'static>,
    /// Gridline labels
    pub tiny: &'static MonoFont<'static>,
}

impl FontSet {
    pub fn bold() -> Self {
        Self {
            xlarge: &FONT_10X20,
            large: &FONT_9X18_BOLD,
            medium: &FONT_7X13_BOLD,
            small: &FONT_6X13_BOLD,
            tiny: &FONT_5X8,
        }
    }

    pub fn regular() -> Self {
        Self {
            xlarge: &FONT_10X20,
            large: &FONT_9X18,
            medium: &FONT_7X13,
            small: &FONT_6X12,
            tiny: &FONT_5X8,
        }
    }

    pub fn compact() -> Self {
        Self {
            xlarge: &FONT_9X18_BOLD,
            large: &FONT_7X13_BOLD,
            medium: &FONT_6X13_BOLD,
            small: &FONT_6X10,
            tiny: &FONT_5X8,
        }
    }

    /// Resolve the configured style; unknown names fall back to `bold`
    pub fn from_config(config: &FontConfig) -> Self {
        match config.style.trim().to_ascii_lowercase().as_str() {
            "bold" => Self::bold(),
            "regular" => Self::regular(),
            "compact" => Self::compact(),
            other => {
                get_logger("render").warn(&format!(
                    "Unknown font style '{}', using built-in bold fonts",
                    other
                ));
                Self::bold()
            }
        }
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::bold()
    }
}

/// Pixel width of `text` set in `font`
pub fn text_width(font: &MonoFont<'_>, text: &str) -> i32 {
    let advance = font.character_size.width + font.character_spacing;
    i32::try_from(text.chars().count() as u32 * advance).unwrap_or(i32::MAX)
}

/// Glyph cell height of `font`
pub fn text_height(font: &MonoFont<'_>) -> i32 {
    i32::try_from(font.character_size.height).unwrap_or(i32::MAX)
}
