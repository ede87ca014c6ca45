//! SVG backend: replays draw commands as SVG elements

use crate::geometry::{Color, Point, Size};

use super::command::{DrawCommand, Drawing, Graphics, PathStyle, StyledText, TextAlignment};
use super::config::{SvgConfig, TextConfig};
use super::metrics::FixedMetrics;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            elements: vec![],
            indent: 1,
        }
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add a filled rectangle element
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: Color) {
        self.elements.push(format!(
            r#"{}<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            x,
            y,
            w,
            h,
            paint("fill", fill)
        ));
    }

    /// Add a path element painted with `fill` and an optional stroke
    pub fn add_path(&mut self, d: &str, fill: Color, stroke: Option<(Color, f64)>) {
        let stroke_attrs = match stroke {
            Some((color, width)) => format!(r#"{} stroke-width="{}""#, paint("stroke", color), width),
            None => String::new(),
        };
        self.elements.push(format!(
            r#"{}<path d="{}"{}{}/>"#,
            self.indent_str(),
            d,
            paint("fill", fill),
            stroke_attrs
        ));
    }

    /// Add a single line of text
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAlignment, style: &StyledText) {
        let anchor_str = match anchor {
            TextAlignment::Left => "start",
            TextAlignment::Center => "middle",
            TextAlignment::Right => "end",
        };

        self.elements.push(format!(
            r#"{}<text x="{}" y="{}" text-anchor="{}" dominant-baseline="middle" font-family="{}" font-size="{}"{}>{}</text>"#,
            self.indent_str(),
            x,
            y,
            anchor_str,
            escape_xml(&self.config.font_family),
            style.font_size,
            paint("fill", style.color),
            escape_xml(text)
        ));
    }

    /// Build the final SVG string
    pub fn build(self, size: Size) -> String {
        let nl = self.newline();

        let mut svg = String::new();
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push_str(nl);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            size.width, size.height, size.width, size.height
        ));
        svg.push_str(nl);

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Paint attribute for `color`; fully transparent paints as `none`
fn paint(attr: &str, color: Color) -> String {
    if color.a <= 0.0 {
        return format!(r#" {}="none""#, attr);
    }
    let mut out = format!(r#" {}="{}""#, attr, color.to_rgb_hex());
    if color.a < 1.0 {
        let [.., alpha] = color.to_bytes();
        out.push_str(&format!(
            r#" {}-opacity="{:.3}""#,
            attr,
            f64::from(alpha) / 255.0
        ));
    }
    out
}

/// SVG `Graphics` backend with fixed text metrics
#[derive(Debug, Clone, Default)]
pub struct SvgGraphics {
    config: SvgConfig,
    metrics: FixedMetrics,
}

impl SvgGraphics {
    pub fn new(config: SvgConfig, text: &TextConfig) -> Self {
        Self {
            config,
            metrics: FixedMetrics::new(text),
        }
    }
}

impl Graphics for SvgGraphics {
    type Drawing = SvgDrawing;

    fn measure(&self, text: &StyledText) -> Size {
        self.metrics.measure(text)
    }

    fn make_drawing(&self, size: Size) -> SvgDrawing {
        SvgDrawing {
            size,
            metrics: self.metrics.clone(),
            builder: SvgBuilder::new(self.config.clone()),
            fill: Color::BLACK,
            path: String::new(),
        }
    }
}

/// One SVG document being drawn
pub struct SvgDrawing {
    size: Size,
    metrics: FixedMetrics,
    builder: SvgBuilder,
    fill: Color,
    /// Path data accumulated since the last paint
    path: String,
}

impl SvgDrawing {
    fn push_path(&mut self, op: char, point: Point) {
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        self.path
            .push_str(&format!("{}{} {}", op, point.x, point.y));
    }

    fn paint_path(&mut self, fill: Color, stroke: Option<(Color, f64)>) {
        let d = std::mem::take(&mut self.path);
        if !d.is_empty() {
            self.builder.add_path(&d, fill, stroke);
        }
    }

    fn draw_text(&mut self, text: &StyledText, point: Point) {
        let size = self.metrics.measure(text);
        let line_height = self.metrics.line_height(text.font_size);
        let x = match text.alignment {
            TextAlignment::Left => point.x,
            TextAlignment::Center => point.x + size.width / 2.0,
            TextAlignment::Right => point.x + size.width,
        };
        for (i, line) in text.text.lines().enumerate() {
            let y = point.y + line_height * (i as f64 + 0.5);
            self.builder.add_text(line, x, y, text.alignment, text);
        }
    }

    fn apply(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::SetFill(color) => self.fill = *color,
            DrawCommand::Fill(rects) => {
                for rect in rects {
                    self.builder
                        .add_rect(rect.min_x(), rect.min_y(), rect.size.width, rect.size.height, self.fill);
                }
            }
            DrawCommand::AddRect(rect) => {
                self.push_path('M', rect.origin);
                self.path.push_str(&format!(
                    " h{} v{} h{} Z",
                    rect.size.width, rect.size.height, -rect.size.width
                ));
            }
            DrawCommand::Move(point) => self.push_path('M', *point),
            DrawCommand::AddLine(point) => self.push_path('L', *point),
            DrawCommand::DrawText { text, point } => self.draw_text(text, *point),
            DrawCommand::StrokePath(PathStyle {
                line_width,
                stroke_color,
                ..
            }) => self.paint_path(Color::CLEAR, Some((*stroke_color, *line_width))),
            DrawCommand::FillPath(style) => self.paint_path(style.fill_color, None),
            DrawCommand::FillAndStrokePath(style) => {
                self.paint_path(style.fill_color, Some((style.stroke_color, style.line_width)))
            }
        }
    }
}

impl Drawing for SvgDrawing {
    type Image = String;

    fn draw(mut self, commands: &[DrawCommand]) -> String {
        for command in commands {
            self.apply(command);
        }
        self.builder.build(self.size)
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;

    fn draw(commands: &[DrawCommand]) -> String {
        let graphics = SvgGraphics::new(SvgConfig::default().with_pretty_print(false), &TextConfig::default());
        graphics.make_drawing(Size::new(100.0, 50.0)).draw(commands)
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_paint() {
        assert_eq!(paint("fill", Color::RED), r##" fill="#ff0000""##);
        assert_eq!(paint("stroke", Color::CLEAR), r#" stroke="none""#);
        assert_eq!(
            paint("fill", Color::rgba(0.0, 0.0, 1.0, 0.5)),
            r##" fill="#0000ff" fill-opacity="0.502""##
        );
    }

    #[test]
    fn test_document_size() {
        let svg = draw(&[]);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="100" height="50" viewBox="0 0 100 50""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_fill_uses_last_set_fill() {
        let svg = draw(&[
            DrawCommand::SetFill(Color::WHITE),
            DrawCommand::Fill(vec![Rectangle::from_xywh(0.0, 0.0, 100.0, 50.0)]),
        ]);
        assert!(svg.contains(r##"<rect x="0" y="0" width="100" height="50" fill="#ffffff"/>"##));
    }

    #[test]
    fn test_stroked_polyline() {
        let svg = draw(&[
            DrawCommand::Move(Point::new(10.0, 10.0)),
            DrawCommand::AddLine(Point::new(40.0, 10.0)),
            DrawCommand::AddLine(Point::new(40.0, 30.0)),
            DrawCommand::StrokePath(PathStyle::stroke(2.0, Color::BLACK)),
        ]);
        assert!(svg.contains(
            r##"<path d="M10 10 L40 10 L40 30" fill="none" stroke="#000000" stroke-width="2"/>"##
        ));
    }

    #[test]
    fn test_rect_path_filled_and_stroked() {
        let svg = draw(&[
            DrawCommand::AddRect(Rectangle::from_xywh(5.0, 5.0, 20.0, 10.0)),
            DrawCommand::FillAndStrokePath(PathStyle {
                line_width: 1.0,
                stroke_color: Color::BLACK,
                fill_color: Color::YELLOW,
            }),
        ]);
        assert!(svg.contains(
            r##"<path d="M5 5 h20 v10 h-20 Z" fill="#ffff00" stroke="#000000" stroke-width="1"/>"##
        ));
    }

    #[test]
    fn test_paint_without_path_is_skipped() {
        let svg = draw(&[DrawCommand::StrokePath(PathStyle::stroke(1.0, Color::BLACK))]);
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_centered_text() {
        let svg = draw(&[DrawCommand::DrawText {
            text: StyledText::new("a<b", 16.0).with_color(Color::BLUE),
            point: Point::new(50.0, 50.0),
        }]);
        assert!(svg.contains(r#"x="65" y="60" text-anchor="middle""#));
        assert!(svg.contains(r##"fill="#0000ff">a&lt;b</text>"##));
    }

    #[test]
    fn test_multiline_text() {
        let svg = draw(&[DrawCommand::DrawText {
            text: StyledText::new("one\ntwo", 16.0).with_alignment(TextAlignment::Left),
            point: Point::new(0.0, 0.0),
        }]);
        assert!(svg.contains(r#"x="0" y="10" text-anchor="start""#));
        assert!(svg.contains(r#"x="0" y="30" text-anchor="start""#));
    }
}
