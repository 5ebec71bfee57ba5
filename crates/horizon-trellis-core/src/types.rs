//! Basic value types carried by reflective properties.
//!
//! Geometry is integral (widget coordinates are whole pixels); colors are
//! 8-bit RGBA so that hex round-trips are exact.

use std::fmt;
use std::str::FromStr;

/// A point in widget coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Return this point moved by `(dx, dy)`.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size has zero or negative area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Clamp each dimension into `[min, max]`.
    pub fn bounded_to(self, min: Size, max: Size) -> Size {
        Size::new(
            self.width.max(min.width).min(max.width.max(min.width)),
            self.height.max(min.height).min(max.height.max(min.height)),
        )
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self::new(width, height)
    }
}

/// A rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size components.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Create a rectangle from a point and a size.
    #[inline]
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }

    pub fn top(&self) -> i32 {
        self.origin.y
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// The y coordinate just below the rectangle.
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height
    }

    /// Check if a point lies inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.left() + self.width()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color: '{}'", self.0)
    }
}

impl std::error::Error for ColorParseError {}

impl Color {
    pub const BLACK: Self = Self::from_rgb8(0, 0, 0);
    pub const WHITE: Self = Self::from_rgb8(255, 255, 255);
    pub const TRANSPARENT: Self = Self::from_rgba8(0, 0, 0, 0);
    pub const YELLOW: Self = Self::from_rgb8(255, 255, 0);

    /// Create a color from 8-bit RGBA components.
    #[inline]
    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit RGB components.
    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    /// Create a color from a hex string (e.g., "#FF0000" or "#FF000080").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let len = hex.len();

        if (len != 6 && len != 8) || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if len == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()?
        } else {
            255
        };

        Some(Self::from_rgba8(r, g, b, a))
    }

    /// Hex form: `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Style-sheet form: hex when opaque, `rgba(r, g, b, alpha)` otherwise.
    pub fn to_css(self) -> String {
        if self.a == 255 {
            self.to_hex()
        } else {
            let alpha = (self.alpha_f() * 1000.0).round() / 1000.0;
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }

    /// Alpha as a fraction in `[0, 1]`.
    pub fn alpha_f(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Return a new color with modified alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::from_rgba8(self.r, self.g, self.b, a)
    }

    /// Linear interpolation between two colors.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self::from_rgba8(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parse `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    ///
    /// In `rgba`, an alpha containing a decimal point is a fraction, otherwise
    /// it is an 8-bit value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            return Color::from_hex(trimmed).ok_or_else(err);
        }

        let (body, has_alpha) = if let Some(rest) = trimmed.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = trimmed.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(err());
        };
        let body = body.strip_suffix(')').ok_or_else(err)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return Err(err());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
        let (r, g, b) = (channel(parts[0])?, channel(parts[1])?, channel(parts[2])?);
        let a = match parts.get(3) {
            None => 255,
            Some(alpha) if alpha.contains('.') => {
                let fraction: f64 = alpha.parse().map_err(|_| err())?;
                (fraction.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            Some(alpha) => channel(alpha)?,
        };
        Ok(Color::from_rgba8(r, g, b, a))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A font descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub family: String,
    pub point_size: i32,
    /// CSS-style weight, 100..=900.
    pub weight: u16,
    pub italic: bool,
}

impl Font {
    pub const WEIGHT_NORMAL: u16 = 400;
    pub const WEIGHT_BOLD: u16 = 700;

    /// Create a normal-weight font.
    pub fn new(family: impl Into<String>, point_size: i32) -> Self {
        Self {
            family: family.into(),
            point_size,
            weight: Self::WEIGHT_NORMAL,
            italic: false,
        }
    }

    /// Return this font with a different weight (clamped to 100..=900).
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight.clamp(100, 900);
        self
    }

    /// Return this font in italics.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= Self::WEIGHT_BOLD
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Segoe UI", 9)
    }
}

/// A reference to an icon or pixmap resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Icon {
    source: String,
}

impl Icon {
    /// Create an icon from a resource path or theme name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_null(&self) -> bool {
        self.source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_forms() {
        let opaque = Color::from_hex("#2196F3").unwrap();
        assert_eq!(opaque, Color::from_rgb8(0x21, 0x96, 0xF3));
        assert_eq!(opaque.to_hex(), "#2196F3");

        let translucent = Color::from_hex("#00000040").unwrap();
        assert_eq!(translucent.a, 0x40);
        assert_eq!(translucent.to_hex(), "#00000040");

        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#GG0000").is_none());
    }

    #[test]
    fn test_color_parse_functional() {
        let c: Color = "rgba(52, 152, 219, 0.1)".parse().unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (52, 152, 219, 26));

        let c: Color = "rgba(0, 0, 0, 80)".parse().unwrap();
        assert_eq!(c.a, 80);

        let c: Color = "rgb(1, 2, 3)".parse().unwrap();
        assert_eq!(c, Color::from_rgb8(1, 2, 3));

        assert!("blue-ish".parse::<Color>().is_err());
        assert!("rgb(1, 2)".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_css_and_lerp() {
        assert_eq!(Color::from_rgb8(231, 76, 60).to_css(), "#E74C3C");
        assert_eq!(
            Color::from_rgba8(0, 0, 0, 0).to_css(),
            "rgba(0, 0, 0, 0)"
        );
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(mid, Color::from_rgb8(128, 128, 128));
    }

    #[test]
    fn test_size_bounded_and_rect_contains() {
        let size = Size::new(500, 5).bounded_to(Size::new(10, 10), Size::new(100, 100));
        assert_eq!(size, Size::new(100, 10));

        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains(Point::new(10, 29)));
        assert!(!rect.contains(Point::new(30, 10)));
        assert_eq!(rect.bottom(), 30);
    }

    #[test]
    fn test_font_weight_clamped() {
        let font = Font::new("Arial", 12).with_weight(1200);
        assert_eq!(font.weight, 900);
        assert!(font.is_bold());
    }
}
