//! In-memory bundle implementation.

use super::{Bundle, PersistError, PersistResult, SavedSignature};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory bundle for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryBundle {
    entries: RwLock<HashMap<String, SavedSignature>>,
}

impl MemoryBundle {
    /// Create a new empty bundle.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Bundle for MemoryBundle {
    fn put(&self, key: &str, saved: SavedSignature) -> PersistResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PersistError::Lock(format!("Lock error: {}", e)))?;
        entries.insert(key.to_string(), saved);
        Ok(())
    }

    fn get(&self, key: &str) -> PersistResult<SavedSignature> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PersistError::Lock(format!("Lock error: {}", e)))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| PersistError::NotFound(key.to_string()))
    }

    fn remove(&self, key: &str) -> PersistResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PersistError::Lock(format!("Lock error: {}", e)))?;
        entries.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> PersistResult<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PersistError::Lock(format!("Lock error: {}", e)))?;
        Ok(entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rgba, Stroke};
    use crate::persist::{restore_from, save_to};
    use crate::state::SignatureState;

    #[test]
    fn test_save_and_restore() {
        let bundle = MemoryBundle::new();
        let mut state = SignatureState::new();
        state.add_stroke(Stroke::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0), 2.0, Rgba::black()));

        save_to(&bundle, "signature", &state).unwrap();
        let restored = restore_from(&bundle, "signature").unwrap();
        assert_eq!(restored.strokes(), state.strokes());
        assert_eq!(restored.mode(), state.mode());
    }

    #[test]
    fn test_not_found() {
        let bundle = MemoryBundle::new();
        let result = restore_from(&bundle, "missing");
        assert!(matches!(result, Err(PersistError::NotFound(_))));
    }

    #[test]
    fn test_contains_and_remove() {
        let bundle = MemoryBundle::new();
        let state = SignatureState::new();

        assert!(!bundle.contains("signature").unwrap());
        save_to(&bundle, "signature", &state).unwrap();
        assert!(bundle.contains("signature").unwrap());
        bundle.remove("signature").unwrap();
        assert!(!bundle.contains("signature").unwrap());
    }
}
