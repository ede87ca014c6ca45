//! Geometry and colour value types shared by the parser, layout and renderer

use std::fmt;

use serde::Deserialize;

/// A 2D point in diagram coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle
///
/// `intersects` and `contains` compare closed intervals, so rectangles that
/// only touch along an edge still intersect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub origin: Point,
    pub size: Size,
}

impl Rectangle {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    /// Whether `other` lies entirely within this rectangle
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.min_x() <= other.min_x()
            && other.max_x() <= self.max_x()
            && self.min_y() <= other.min_y()
            && other.max_y() <= self.max_y()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.min_x() <= point.x
            && point.x <= self.max_x()
            && self.min_y() <= point.y
            && point.y <= self.max_y()
    }

    /// Shrink by `d` on every side; a negative `d` grows the rectangle.
    pub fn inset_by(&self, d: f64) -> Rectangle {
        Rectangle::from_xywh(
            self.origin.x + d,
            self.origin.y + d,
            self.size.width - 2.0 * d,
            self.size.height - 2.0 * d,
        )
    }

    pub fn offset_by(&self, dx: f64, dy: f64) -> Rectangle {
        Rectangle::from_xywh(
            self.origin.x + dx,
            self.origin.y + dy,
            self.size.width,
            self.size.height,
        )
    }
}

/// RGBA colour with components normalised to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::rgba(1.0, 1.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgba(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgba(1.0, 0.0, 1.0, 1.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Look up one of the fixed colour names
    pub fn named(name: &str) -> Option<Color> {
        match name {
            "clear" => Some(Self::CLEAR),
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::YELLOW),
            "cyan" => Some(Self::CYAN),
            "magenta" => Some(Self::MAGENTA),
            _ => None,
        }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    ///
    /// Alpha defaults to fully opaque.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channels: Vec<u8> = match digits.len() {
            3 | 4 => digits
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                .collect::<Option<_>>()?,
            6 | 8 => (0..digits.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
                .collect::<Option<_>>()?,
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(0xFF);
        Some(Color::rgba(
            f64::from(channels[0]) / 255.0,
            f64::from(channels[1]) / 255.0,
            f64::from(channels[2]) / 255.0,
            f64::from(alpha) / 255.0,
        ))
    }

    /// Channels quantised to bytes, in `[r, g, b, a]` order
    pub fn to_bytes(&self) -> [u8; 4] {
        let quantise = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            quantise(self.r),
            quantise(self.g),
            quantise(self.b),
            quantise(self.a),
        ]
    }

    /// `#rrggbb` without the alpha channel, for SVG paint attributes
    pub fn to_rgb_hex(&self) -> String {
        let [r, g, b, _] = self.to_bytes();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Prints as `#RRGGBBAA`
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_bytes();
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::named(&value)
            .or_else(|| Color::from_hex(&value))
            .ok_or_else(|| format!("invalid colour '{}'", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_is_symmetric() {
        let rects = [
            Rectangle::from_xywh(0.0, 0.0, 10.0, 10.0),
            Rectangle::from_xywh(10.0, 0.0, 5.0, 5.0),
            Rectangle::from_xywh(11.0, 11.0, 1.0, 1.0),
            Rectangle::from_xywh(-5.0, 3.0, 30.0, 2.0),
            Rectangle::from_xywh(2.0, 2.0, 0.0, 0.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(a.intersects(b), b.intersects(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = Rectangle::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::from_xywh(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&b.offset_by(0.5, 0.0)));
    }

    #[test]
    fn test_contains_is_closed() {
        let outer = Rectangle::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Rectangle::from_xywh(5.0, 5.0, 5.0, 5.0)));
        assert!(!outer.contains(&Rectangle::from_xywh(5.0, 5.0, 5.1, 5.0)));
        assert!(outer.contains_point(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_inset_by_negative_grows() {
        let r = Rectangle::from_xywh(10.0, 10.0, 20.0, 10.0).inset_by(-4.0);
        assert_eq!(r, Rectangle::from_xywh(6.0, 6.0, 28.0, 18.0));
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("#f00"), Some(Color::RED));
        assert_eq!(Color::from_hex("#f00f"), Some(Color::RED));
        assert_eq!(Color::from_hex("#00000000"), Some(Color::CLEAR));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#ggg"), None);
    }

    #[test]
    fn test_display_round_trips_hex() {
        let color = Color::from_hex("#FF90F4").unwrap();
        assert_eq!(color.to_string(), "#FF90F4FF");
        assert_eq!(Color::from_hex(&color.to_string()), Some(color));
        assert_eq!(color.to_rgb_hex(), "#ff90f4");
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::named("magenta"), Some(Color::MAGENTA));
        assert_eq!(Color::named("purple"), None);
        assert_eq!(Color::try_from("#fff".to_string()), Ok(Color::WHITE));
    }
}
