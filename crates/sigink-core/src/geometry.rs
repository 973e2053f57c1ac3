//! Geometry primitives: points, colors, stroke segments and bounding rectangles.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// A point on the drawing surface, in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other` (`t = 0` is `self`).
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self::new(p.x as f32, p.y as f32)
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x as f64, p.y as f64)
    }
}

/// Serializable ink color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Pack as `0xAARRGGBB`.
    pub fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpack from `0xAARRGGBB`.
    pub fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// One straight segment of ink, the atomic unit of a captured signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub start: Point,
    pub end: Point,
    /// Line width in surface pixels; expected to be positive.
    pub width: f32,
    pub color: Rgba,
}

impl Stroke {
    pub fn new(start: Point, end: Point, width: f32, color: Rgba) -> Self {
        Self {
            start,
            end,
            width,
            color,
        }
    }

    /// Get the length of the segment.
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Get the midpoint of the segment.
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Direction of the segment in degrees, in `[0, 360)`, measured from the positive x-axis.
    pub fn angle(&self) -> f32 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let degrees = dy.atan2(dx).to_degrees();
        if degrees < 0.0 { degrees + 360.0 } else { degrees }
    }

    /// Cheap proximity test between two segments.
    ///
    /// This is NOT exact segment intersection: two strokes "intersect" when
    /// their midpoints are closer than a quarter of their combined length.
    pub fn intersects(&self, other: &Stroke) -> bool {
        let distance = self.midpoint().distance(other.midpoint());
        distance < (self.length() + other.length()) / 4.0
    }

    /// Same stroke with both endpoints mapped through `affine` and the width scaled by `width_scale`.
    pub fn transformed(&self, affine: kurbo::Affine, width_scale: f32) -> Stroke {
        Stroke {
            start: (affine * kurbo::Point::from(self.start)).into(),
            end: (affine * kurbo::Point::from(self.end)).into(),
            width: self.width * width_scale,
            color: self.color,
        }
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.start, self.end)
    }
}

/// Axis-aligned bounding rectangle of a stroke sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right, self.bottom)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// True when the rectangle has positive extent and lies in the non-negative quadrant.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0 && self.left >= 0.0 && self.top >= 0.0
    }
}

impl From<Bounds> for kurbo::Rect {
    fn from(b: Bounds) -> Self {
        kurbo::Rect::new(b.left as f64, b.top as f64, b.right as f64, b.bottom as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> Stroke {
        Stroke::new(Point::new(x0, y0), Point::new(x1, y1), 2.0, Rgba::black())
    }

    #[test]
    fn test_length_and_midpoint() {
        let s = seg(0.0, 0.0, 3.0, 4.0);
        assert!((s.length() - 5.0).abs() < EPS);
        let mid = s.midpoint();
        assert!((mid.x - 1.5).abs() < EPS);
        assert!((mid.y - 2.0).abs() < EPS);
    }

    #[test]
    fn test_angle_is_normalized() {
        assert!(seg(0.0, 0.0, 10.0, 0.0).angle().abs() < EPS);
        assert!((seg(0.0, 0.0, 0.0, 10.0).angle() - 90.0).abs() < EPS);
        assert!((seg(0.0, 0.0, -10.0, 0.0).angle() - 180.0).abs() < EPS);
        // atan2 gives -90 here; it must come back as 270
        assert!((seg(0.0, 0.0, 0.0, -10.0).angle() - 270.0).abs() < EPS);
    }

    #[test]
    fn test_intersects_is_a_proximity_heuristic() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        // Parallel and close: "intersects" although the segments never touch.
        let b = seg(0.0, 2.0, 10.0, 2.0);
        assert!(a.intersects(&b));
        // Far away.
        let c = seg(100.0, 100.0, 110.0, 100.0);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_bounds_measurements() {
        let b = Bounds::new(10.0, 20.0, 30.0, 60.0);
        assert!((b.width() - 20.0).abs() < EPS);
        assert!((b.height() - 40.0).abs() < EPS);
        assert!((b.area() - 800.0).abs() < EPS);
        assert_eq!(b.center(), Point::new(20.0, 40.0));
        assert_eq!(b.top_left(), Point::new(10.0, 20.0));
        assert_eq!(b.bottom_right(), Point::new(30.0, 60.0));
        assert!(b.contains(Point::new(10.0, 60.0)));
        assert!(!b.contains(Point::new(9.9, 30.0)));
        assert!(b.is_valid());
    }

    #[test]
    fn test_inverted_bounds_clamp_to_zero() {
        let b = Bounds::new(30.0, 20.0, 10.0, 10.0);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert!(!b.is_valid());
        assert!(!Bounds::new(-1.0, 0.0, 10.0, 10.0).is_valid());
    }

    #[test]
    fn test_argb_packing() {
        let c = Rgba::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_argb(), 0x7812_3456);
        assert_eq!(Rgba::from_argb(0x7812_3456), c);
    }

    #[test]
    fn test_peniko_color_conversion() {
        let c = Rgba::new(10, 20, 30, 255);
        let color: Color = c.into();
        assert_eq!(Rgba::from(color), c);
    }
}
