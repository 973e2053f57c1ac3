//! SigInk Core Library
//!
//! Stroke history, geometry analysis, export scaling and persistence for
//! hand-signature capture.

pub mod analysis;
pub mod capture;
pub mod export;
pub mod geometry;
pub mod persist;
pub mod state;

pub use analysis::{Metadata, ValidationThresholds};
pub use capture::{PenStyle, StrokeCapture};
pub use export::{ExportOptions, GeometryError, GeometryResult};
pub use geometry::{Bounds, Point, Rgba, Stroke};
pub use persist::{Bundle, MemoryBundle, PersistError, SavedSignature};
pub use state::{RenderCache, SignatureMode, SignatureState, StateChange, MAX_UNDO_HISTORY};
