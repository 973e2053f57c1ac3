//! Rasterizer abstraction and the signature drawing pass.

use kurbo::{Line, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use sigink_core::export::{ExportOptions, GeometryError, export_strokes};
use sigink_core::{SignatureState, Stroke};
use thiserror::Error;

use crate::raster::RasterBuffer;

/// Default spacing between grid lines, in pixels.
pub const DEFAULT_GRID_SPACING: f32 = 20.0;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("Invalid grid spacing: {0}")]
    InvalidGridSpacing(f32),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Guide grid drawn over the ink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Distance between lines, in pixels.
    pub spacing: f32,
    /// Line thickness, in pixels.
    pub line_width: f32,
    /// Packed `0xAARRGGBB` so the spec stays serializable.
    pub color: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_GRID_SPACING,
            line_width: 1.0,
            color: 0xFFDD_DDDD,
        }
    }
}

impl GridSpec {
    pub fn new(spacing: f32, color: Color) -> Self {
        Self {
            spacing,
            color: sigink_core::Rgba::from(color).to_argb(),
            ..Self::default()
        }
    }

    pub fn color(&self) -> Color {
        sigink_core::Rgba::from_argb(self.color).into()
    }
}

/// Drawing surface the signature is written into.
///
/// Coordinates are in pixels with the origin at the top-left corner.
pub trait Rasterizer {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Blend `color` over every pixel whose center lies in `rect`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Blend a line with round caps.
    fn draw_round_line(&mut self, line: Line, width: f64, color: Color);
}

/// Draw background, strokes (in order), then the optional grid.
pub fn render_into<R: Rasterizer + ?Sized>(
    surface: &mut R,
    strokes: &[Stroke],
    background: Color,
    grid: Option<&GridSpec>,
) -> RenderResult<()> {
    let (width, height) = surface.size();
    if let Some(grid) = grid {
        check_grid_spacing(grid.spacing, width.max(height))?;
    }
    let (width, height) = (width as f64, height as f64);

    surface.fill_rect(Rect::new(0.0, 0.0, width, height), background);

    for stroke in strokes {
        surface.draw_round_line(stroke.as_kurbo(), stroke.width as f64, stroke.color.into());
    }

    if let Some(grid) = grid {
        render_grid_lines(surface, grid, width, height);
    }
    Ok(())
}

/// Spacing must be positive and place at most one line per pixel along the longer axis.
fn check_grid_spacing(spacing: f32, extent: u32) -> RenderResult<()> {
    if !(spacing > 0.0) || (extent as f64 / spacing as f64).floor() > extent as f64 {
        log::warn!("rejecting grid spacing {spacing} for a {extent}px extent");
        return Err(RenderError::InvalidGridSpacing(spacing));
    }
    Ok(())
}

/// Number of lines at `0, spacing, 2 * spacing, ...` that are `<= extent`.
fn line_count(spacing: f64, extent: f64) -> u64 {
    (extent / spacing).floor() as u64 + 1
}

fn render_grid_lines<R: Rasterizer + ?Sized>(surface: &mut R, grid: &GridSpec, width: f64, height: f64) {
    let spacing = grid.spacing as f64;
    let thickness = grid.line_width.max(0.0) as f64;
    let color = grid.color();

    for i in 0..line_count(spacing, height) {
        let y = i as f64 * spacing;
        surface.fill_rect(Rect::new(0.0, y, width, y + thickness), color);
    }

    for i in 0..line_count(spacing, width) {
        let x = i as f64 * spacing;
        surface.fill_rect(Rect::new(x, 0.0, x + thickness, height), color);
    }
}

/// Render `strokes` into a new `width` x `height` buffer.
///
/// Non-positive dimensions are an error, never clamped.
pub fn render_signature(
    width: i32,
    height: i32,
    strokes: &[Stroke],
    background: Color,
    grid: Option<&GridSpec>,
) -> RenderResult<RasterBuffer> {
    if width <= 0 || height <= 0 {
        log::warn!("refusing to render a {width}x{height} signature");
        return Err(RenderError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }

    let mut buffer = RasterBuffer::new(width as u32, height as u32);
    render_into(&mut buffer, strokes, background, grid)?;
    Ok(buffer)
}

/// Scale `strokes` into the export target, then render them at that size.
pub fn render_scaled(
    strokes: &[Stroke],
    options: &ExportOptions,
    background: Color,
    grid: Option<&GridSpec>,
) -> RenderResult<RasterBuffer> {
    let scaled = export_strokes(strokes, options)?;
    let width = options.width.ceil() as f64;
    let height = options.height.ceil() as f64;
    if width > i32::MAX as f64 || height > i32::MAX as f64 {
        log::warn!("refusing to render a {width}x{height} export");
        return Err(RenderError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }
    render_signature(width as i32, height as i32, &scaled, background, grid)
}

/// Re-render the current strokes and store the result as the state's render cache.
pub fn refresh_cache(
    state: &mut SignatureState,
    width: i32,
    height: i32,
    background: Color,
    grid: Option<&GridSpec>,
) -> RenderResult<()> {
    let buffer = render_signature(width, height, state.strokes(), background, grid)?;
    state.update_render_cache(buffer.into_cache());
    Ok(())
}
