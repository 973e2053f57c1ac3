//! Saving and restoring signature state for state-restoration hosts.
//!
//! The saved form is numbers only: each stroke flattens to six floats and the
//! mode to its ordinal. The render cache is never part of it.

mod memory;

pub use memory::MemoryBundle;

use crate::geometry::{Point, Rgba, Stroke};
use crate::state::{SignatureMode, SignatureState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current version of [`SavedSignature`].
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Unsupported save format version: {0}")]
    UnsupportedVersion(u32),
    #[error("Unknown signature mode ordinal: {0}")]
    UnknownMode(u8),
    #[error("Malformed saved signature: {0}")]
    Malformed(String),
    #[error("Non-finite value in saved path {index}")]
    NonFinite { index: usize },
    #[error("Saved signature not found: {0}")]
    NotFound(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bundle error: {0}")]
    Lock(String),
}

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Persisted subset of [`SignatureState`]: strokes and mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSignature {
    pub version: u32,
    /// `[start.x, start.y, end.x, end.y, width, argb]` per stroke.
    pub paths: Vec<[f64; 6]>,
    /// [`SignatureMode`] ordinal.
    pub mode: u8,
}

impl SavedSignature {
    /// Serialize to JSON.
    pub fn to_json(&self) -> PersistResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> PersistResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Read the nested-number form handed over by a host.
    pub fn from_value(value: serde_json::Value) -> PersistResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PersistError::Malformed("expected an object".to_string()))?;

        let version = object
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| PersistError::Malformed("missing 'version'".to_string()))?;
        let version = u32::try_from(version)
            .map_err(|_| PersistError::Malformed(format!("version {version} out of range")))?;

        let mode = object
            .get("mode")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| PersistError::Malformed("missing 'mode'".to_string()))?;
        let mode =
            u8::try_from(mode).map_err(|_| PersistError::Malformed(format!("mode {mode} out of range")))?;

        let raw_paths = object
            .get("paths")
            .and_then(|v| v.as_array())
            .ok_or_else(|| PersistError::Malformed("missing 'paths' array".to_string()))?;

        let mut paths = Vec::with_capacity(raw_paths.len());
        for (index, raw) in raw_paths.iter().enumerate() {
            let values = raw
                .as_array()
                .ok_or_else(|| PersistError::Malformed(format!("path {index} is not an array")))?;
            if values.len() != 6 {
                return Err(PersistError::Malformed(format!(
                    "path {index} has {} values, expected 6",
                    values.len()
                )));
            }
            let mut path = [0.0; 6];
            for (slot, v) in path.iter_mut().zip(values) {
                *slot = v
                    .as_f64()
                    .ok_or_else(|| PersistError::Malformed(format!("path {index} holds a non-number")))?;
            }
            paths.push(path);
        }

        Ok(Self { version, paths, mode })
    }
}

/// Flatten the persisted part of `state`.
pub fn save(state: &SignatureState) -> SavedSignature {
    let paths = state
        .strokes()
        .iter()
        .map(|s| {
            [
                s.start.x as f64,
                s.start.y as f64,
                s.end.x as f64,
                s.end.y as f64,
                s.width as f64,
                s.color.to_argb() as f64,
            ]
        })
        .collect();

    SavedSignature {
        version: SAVE_FORMAT_VERSION,
        paths,
        mode: state.mode().to_ordinal(),
    }
}

/// Rebuild a state from its saved form.
///
/// The mode comes straight from the saved ordinal, even when it disagrees with
/// the stroke count; a restored `Completed` state has no render cache until the
/// host renders again.
pub fn restore(saved: &SavedSignature) -> PersistResult<SignatureState> {
    if saved.version != SAVE_FORMAT_VERSION {
        log::warn!("refusing to restore save format version {}", saved.version);
        return Err(PersistError::UnsupportedVersion(saved.version));
    }
    let mode = SignatureMode::from_ordinal(saved.mode).ok_or(PersistError::UnknownMode(saved.mode))?;

    let strokes = saved
        .paths
        .iter()
        .enumerate()
        .map(|(index, path)| decode_path(index, path))
        .collect::<PersistResult<Vec<_>>>()?;

    log::debug!("restored {} strokes in mode {:?}", strokes.len(), mode);
    Ok(SignatureState::from_parts(strokes, mode))
}

fn decode_path(index: usize, path: &[f64; 6]) -> PersistResult<Stroke> {
    if path.iter().any(|v| !v.is_finite()) {
        return Err(PersistError::NonFinite { index });
    }
    let argb = path[5];
    if argb.fract() != 0.0 || argb < 0.0 || argb > u32::MAX as f64 {
        return Err(PersistError::Malformed(format!(
            "path {index} has an invalid color value {argb}"
        )));
    }

    Ok(Stroke::new(
        Point::new(path[0] as f32, path[1] as f32),
        Point::new(path[2] as f32, path[3] as f32),
        path[4] as f32,
        Rgba::from_argb(argb as u32),
    ))
}

/// Key-value store a host uses to keep saved signatures across restarts.
pub trait Bundle: Send + Sync {
    /// Store a saved signature under `key`, replacing any previous one.
    fn put(&self, key: &str, saved: SavedSignature) -> PersistResult<()>;

    /// Fetch the saved signature under `key`.
    fn get(&self, key: &str) -> PersistResult<SavedSignature>;

    /// Remove the entry under `key`.
    fn remove(&self, key: &str) -> PersistResult<()>;

    /// Check if an entry exists.
    fn contains(&self, key: &str) -> PersistResult<bool>;
}

/// Save `state` into `bundle` under `key`.
pub fn save_to(bundle: &dyn Bundle, key: &str, state: &SignatureState) -> PersistResult<()> {
    bundle.put(key, save(state))
}

/// Restore the state saved under `key`.
pub fn restore_from(bundle: &dyn Bundle, key: &str) -> PersistResult<SignatureState> {
    let saved = bundle.get(key)?;
    restore(&saved).inspect_err(|e| log::warn!("failed to restore '{key}': {e}"))
}
