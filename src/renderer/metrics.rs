//! Deterministic text measurement

use crate::geometry::Size;

use super::command::StyledText;
use super::config::TextConfig;

/// Measures text as a grid of fixed-size character cells
///
/// Every character has the same advance and every line the same height,
/// both scaled linearly from the configured base font size.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedMetrics {
    base_font_size: f64,
    char_width: f64,
    line_height: f64,
}

impl FixedMetrics {
    pub fn new(config: &TextConfig) -> Self {
        Self {
            base_font_size: config.font_size,
            char_width: config.char_width,
            line_height: config.line_height,
        }
    }

    fn scale(&self, font_size: f64) -> f64 {
        if self.base_font_size > 0.0 {
            font_size / self.base_font_size
        } else {
            1.0
        }
    }

    pub fn line_height(&self, font_size: f64) -> f64 {
        self.line_height * self.scale(font_size)
    }

    /// Width of a single line of text
    pub fn line_width(&self, line: &str, font_size: f64) -> f64 {
        line.chars().count() as f64 * self.char_width * self.scale(font_size)
    }

    pub fn measure(&self, text: &StyledText) -> Size {
        let lines: Vec<&str> = text.text.lines().collect();
        let widest = lines
            .iter()
            .map(|line| self.line_width(line, text.font_size))
            .fold(0.0, f64::max);
        Size::new(widest, lines.len() as f64 * self.line_height(text.font_size))
    }
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self::new(&TextConfig::default())
    }
}
