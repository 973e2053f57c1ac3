//! CPU raster buffer backed by an RGBA8 image.

use crate::renderer::{Rasterizer, RenderError, RenderResult};
use image::RgbaImage;
use kurbo::{Line, Point, Rect, Vec2};
use peniko::Color;
use sigink_core::{RenderCache, Rgba};

/// RGBA8 pixel buffer, straight (non-premultiplied) alpha.
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    image: RgbaImage,
}

impl RasterBuffer {
    /// Transparent buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color of one pixel. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Rgba::new(r, g, b, a)
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Hand the pixels to a [`sigink_core::SignatureState`] render cache.
    pub fn into_cache(self) -> RenderCache {
        RenderCache {
            width: self.image.width(),
            height: self.image.height(),
            rgba: self.image.into_raw(),
        }
    }

    /// Encode RGBA pixel data to PNG bytes.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            writer
                .write_image_data(self.image.as_raw())
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            writer.finish().map_err(|e| RenderError::Encode(e.to_string()))?;
        }
        log::debug!(
            "encoded {}x{} signature as {} PNG bytes",
            self.width(),
            self.height(),
            png_data.len()
        );
        Ok(png_data)
    }

    /// Source-over blend of `color` onto one pixel.
    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let dst = self.image.get_pixel(x, y).0;
        let src_a = color.a as f32 / 255.0;
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let blend = |src: u8, dst: u8| {
            let src_f = src as f32 / 255.0;
            let dst_f = dst as f32 / 255.0;
            ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        self.image.put_pixel(
            x,
            y,
            image::Rgba([
                blend(color.r, dst[0]),
                blend(color.g, dst[1]),
                blend(color.b, dst[2]),
                (out_a * 255.0).round() as u8,
            ]),
        );
    }

    /// Pixel index range whose centers fall inside `[min, max)` along one axis.
    fn span(min: f64, max: f64, limit: u32) -> std::ops::Range<u32> {
        let start = (min - 0.5).ceil().max(0.0);
        let end = (max - 0.5).ceil().clamp(0.0, limit as f64);
        if start >= end {
            return 0..0;
        }
        start as u32..end as u32
    }
}

/// Distance from a point to a line segment.
fn point_to_segment_dist(point: Point, line: Line) -> f64 {
    let seg = line.p1 - line.p0;
    let pv = point - line.p0;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = line.p0 + seg * t;
    (point - proj).hypot()
}

impl Rasterizer for RasterBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let color = Rgba::from(color);
        let rect = rect.abs();
        for y in Self::span(rect.y0, rect.y1, self.height()) {
            for x in Self::span(rect.x0, rect.x1, self.width()) {
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn draw_round_line(&mut self, line: Line, width: f64, color: Color) {
        let color = Rgba::from(color);
        // Keep hairlines visible.
        let radius = (width / 2.0).max(0.5);
        let reach = Vec2::new(radius, radius);
        let min = Point::new(line.p0.x.min(line.p1.x), line.p0.y.min(line.p1.y)) - reach;
        let max = Point::new(line.p0.x.max(line.p1.x), line.p0.y.max(line.p1.y)) + reach;

        for y in Self::span(min.y, max.y + 1.0, self.height()) {
            for x in Self::span(min.x, max.x + 1.0, self.width()) {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if point_to_segment_dist(center, line) <= radius {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buffer = RasterBuffer::new(2, 2);
        assert_eq!(buffer.pixel(1, 1), Rgba::transparent());
        assert_eq!(buffer.as_raw().len(), 16);
    }

    #[test]
    fn test_fill_rect_clips_to_buffer() {
        let mut buffer = RasterBuffer::new(4, 4);
        buffer.fill_rect(Rect::new(-10.0, 2.0, 100.0, 3.0), Color::BLACK);
        assert_eq!(buffer.pixel(0, 2), Rgba::black());
        assert_eq!(buffer.pixel(3, 2), Rgba::black());
        assert_eq!(buffer.pixel(0, 1), Rgba::transparent());
        assert_eq!(buffer.pixel(0, 3), Rgba::transparent());
    }

    #[test]
    fn test_half_transparent_blend() {
        let mut buffer = RasterBuffer::new(1, 1);
        let full = Rect::new(0.0, 0.0, 1.0, 1.0);
        buffer.fill_rect(full, Color::WHITE);
        buffer.fill_rect(full, Rgba::new(0, 0, 0, 128).into());
        let px = buffer.pixel(0, 0);
        assert_eq!(px.a, 255);
        assert!((126..=128).contains(&px.r), "got {px:?}");
    }

    #[test]
    fn test_hairline_still_covers_pixels() {
        let mut buffer = RasterBuffer::new(10, 10);
        buffer.draw_round_line(Line::new((0.0, 5.5), (10.0, 5.5)), 0.1, Color::BLACK);
        assert_eq!(buffer.pixel(5, 5), Rgba::black());
        assert_eq!(buffer.pixel(5, 3), Rgba::transparent());
    }

    #[test]
    fn test_segment_distance() {
        let line = Line::new((0.0, 0.0), (10.0, 0.0));
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), line) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), line) - 5.0).abs() < 1e-9);
        let dot = Line::new((2.0, 2.0), (2.0, 2.0));
        assert!((point_to_segment_dist(Point::new(5.0, 6.0), dot) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_encode_png_signature() {
        let mut buffer = RasterBuffer::new(8, 8);
        buffer.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::WHITE);
        let bytes = buffer.encode_png().unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_into_cache_keeps_pixels() {
        let mut buffer = RasterBuffer::new(3, 2);
        buffer.fill_rect(Rect::new(0.0, 0.0, 3.0, 2.0), Color::BLACK);
        let cache = buffer.into_cache();
        assert_eq!((cache.width, cache.height), (3, 2));
        assert_eq!(&cache.rgba[..4], &[0, 0, 0, 255]);
    }
}
