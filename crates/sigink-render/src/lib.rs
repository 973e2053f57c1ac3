//! SigInk Render Library
//!
//! Rasterizer abstraction and a CPU implementation for SigInk signatures.
//! Buffers can be stored as a state's render cache or encoded as PNG.

mod raster;
mod renderer;

pub use raster::RasterBuffer;
pub use renderer::{
    DEFAULT_GRID_SPACING, GridSpec, Rasterizer, RenderError, RenderResult, refresh_cache, render_into,
    render_scaled, render_signature,
};
