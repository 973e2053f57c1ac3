//! Scaling a stroke sequence into a target pixel rectangle for export.

use crate::analysis::calculate_bounds;
use crate::geometry::Stroke;
use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },
    #[error("Padding {padding} leaves no room in a {width}x{height} target")]
    InvalidPadding { padding: f32, width: f32, height: f32 },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Export target description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub width: f32,
    pub height: f32,
    /// Use one scale factor for both axes.
    pub maintain_aspect: bool,
    /// Center the scaled content in the target.
    pub center: bool,
    /// Empty margin kept on every side.
    #[serde(default)]
    pub padding: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 200.0,
            maintain_aspect: true,
            center: true,
            padding: 0.0,
        }
    }
}

impl ExportOptions {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_aspect(mut self, maintain_aspect: bool) -> Self {
        self.maintain_aspect = maintain_aspect;
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Reject non-positive targets and oversized padding.
    pub fn validate(&self) -> GeometryResult<()> {
        check_target(self.width, self.height)?;
        if !(self.padding >= 0.0)
            || self.padding * 2.0 >= self.width
            || self.padding * 2.0 >= self.height
        {
            return Err(GeometryError::InvalidPadding {
                padding: self.padding,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

fn check_target(width: f32, height: f32) -> GeometryResult<()> {
    if !(width > 0.0 && height > 0.0) {
        log::warn!("rejecting export target {width}x{height}");
        return Err(GeometryError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Map `strokes` from their natural bounds into a `target_width` x `target_height` rectangle.
///
/// A non-positive or NaN target is an error. Empty input, or input whose
/// bounds have no width or no height, is returned unchanged. Stroke widths
/// are scaled by the smaller axis factor.
pub fn scale_strokes(
    strokes: &[Stroke],
    target_width: f32,
    target_height: f32,
    maintain_aspect: bool,
    center: bool,
) -> GeometryResult<Vec<Stroke>> {
    check_target(target_width, target_height)?;
    let Some(bounds) = calculate_bounds(strokes) else {
        return Ok(strokes.to_vec());
    };
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Ok(strokes.to_vec());
    }

    let mut scale_x = target_width / bounds.width();
    let mut scale_y = target_height / bounds.height();
    if maintain_aspect {
        let uniform = scale_x.min(scale_y);
        scale_x = uniform;
        scale_y = uniform;
    }

    let offset = if center {
        Vec2::new(
            ((target_width - bounds.width() * scale_x) / 2.0) as f64,
            ((target_height - bounds.height() * scale_y) / 2.0) as f64,
        )
    } else {
        Vec2::ZERO
    };

    let origin = bounds.top_left();
    let affine = Affine::translate(offset)
        * Affine::scale_non_uniform(scale_x as f64, scale_y as f64)
        * Affine::translate(Vec2::new(-origin.x as f64, -origin.y as f64));
    let width_scale = scale_x.min(scale_y);

    Ok(strokes
        .iter()
        .map(|stroke| stroke.transformed(affine, width_scale))
        .collect())
}

/// Scale strokes into an export target, honoring its padding.
pub fn export_strokes(strokes: &[Stroke], options: &ExportOptions) -> GeometryResult<Vec<Stroke>> {
    options.validate()?;

    let pad = options.padding;
    let scaled = scale_strokes(
        strokes,
        options.width - pad * 2.0,
        options.height - pad * 2.0,
        options.maintain_aspect,
        options.center,
    )?;
    if pad == 0.0 {
        return Ok(scaled);
    }

    let shift = Affine::translate(Vec2::new(pad as f64, pad as f64));
    Ok(scaled.iter().map(|s| s.transformed(shift, 1.0)).collect())
}
