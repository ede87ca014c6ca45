//! Configuration for text measurement and SVG output

use serde::{Deserialize, Deserializer};

use crate::geometry::Color;

/// Configuration options for SVG output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SvgConfig {
    /// Colour filled behind the whole diagram; `"none"` in TOML disables it
    #[serde(deserialize_with = "background")]
    pub background: Option<Color>,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    pub font_family: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            background: Some(Color::WHITE),
            pretty_print: true,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }
}

fn background<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Color>, D::Error> {
    let value = String::deserialize(deserializer)?;
    if value == "none" {
        return Ok(None);
    }
    Color::try_from(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Label font and the fixed metrics used to measure it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextConfig {
    pub font_size: f64,
    /// Advance of one character at `font_size`
    pub char_width: f64,
    /// Height of one line at `font_size`
    pub line_height: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            char_width: 10.0,
            line_height: 20.0,
        }
    }
}
