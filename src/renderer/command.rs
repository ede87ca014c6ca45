//! Draw commands and the backend traits that consume them

use crate::geometry::{Color, Point, Rectangle, Size};

/// Horizontal alignment of each text line inside its measured box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Text plus the attributes a backend needs to measure and draw it
#[derive(Debug, Clone, PartialEq)]
pub struct StyledText {
    pub text: String,
    pub font_size: f64,
    pub color: Color,
    pub alignment: TextAlignment,
}

impl StyledText {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
            color: Color::BLACK,
            alignment: TextAlignment::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Paint used when the current path is stroked or filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub line_width: f64,
    pub stroke_color: Color,
    pub fill_color: Color,
}

impl PathStyle {
    pub fn stroke(line_width: f64, color: Color) -> Self {
        Self {
            line_width,
            stroke_color: color,
            fill_color: Color::CLEAR,
        }
    }

    pub fn fill(color: Color) -> Self {
        Self {
            line_width: 0.0,
            stroke_color: Color::CLEAR,
            fill_color: color,
        }
    }
}

/// One drawing step
///
/// `AddRect`, `Move` and `AddLine` build up the current path; the three
/// path-painting commands paint it and start a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetFill(Color),
    /// Fill rectangles with the colour from the last `SetFill`
    Fill(Vec<Rectangle>),
    AddRect(Rectangle),
    Move(Point),
    AddLine(Point),
    /// Draw text with its measured box's top-left corner at `point`
    DrawText { text: StyledText, point: Point },
    StrokePath(PathStyle),
    FillPath(PathStyle),
    FillAndStrokePath(PathStyle),
}

/// A rendering backend
pub trait Graphics {
    type Drawing: Drawing;

    /// Size of the box `text` occupies when drawn
    fn measure(&self, text: &StyledText) -> Size;

    fn make_drawing(&self, size: Size) -> Self::Drawing;
}

/// A canvas of fixed size that turns a command list into an image
pub trait Drawing {
    type Image;

    fn draw(self, commands: &[DrawCommand]) -> Self::Image;
}
