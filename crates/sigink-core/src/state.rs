//! Signature state: the live stroke sequence plus its undo/redo history.

use crate::geometry::Stroke;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Capture lifecycle of a signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMode {
    /// Nothing drawn.
    #[default]
    Idle = 0,
    /// Strokes were added since the last render.
    Drawing = 1,
    /// The render cache matches a non-empty stroke sequence.
    Completed = 2,
}

impl SignatureMode {
    /// Ordinal used by the persisted form.
    pub fn to_ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(SignatureMode::Idle),
            1 => Some(SignatureMode::Drawing),
            2 => Some(SignatureMode::Completed),
            _ => None,
        }
    }
}

/// Last rasterized image of the stroke sequence.
///
/// Always regenerable from the strokes, so it is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderCache {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, row-major).
    pub rgba: Vec<u8>,
}

impl fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCache")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Notification emitted after a mutating call changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    StrokeAdded { mode: SignatureMode },
    Cleared { mode: SignatureMode },
    Undone { mode: SignatureMode },
    Redone { mode: SignatureMode },
    RenderCacheUpdated { mode: SignatureMode },
}

impl StateChange {
    /// Mode after the change.
    pub fn mode(&self) -> SignatureMode {
        match *self {
            StateChange::StrokeAdded { mode }
            | StateChange::Cleared { mode }
            | StateChange::Undone { mode }
            | StateChange::Redone { mode }
            | StateChange::RenderCacheUpdated { mode } => mode,
        }
    }
}

/// Callback registered with [`SignatureState::subscribe`].
pub type ChangeListener = Box<dyn FnMut(&StateChange) + Send>;

/// The stroke sequence being captured, with bounded undo history.
///
/// Undo and redo store whole copies of the stroke list, not diffs.
#[derive(Default)]
pub struct SignatureState {
    /// Strokes in drawing order.
    strokes: Vec<Stroke>,
    /// Undo history, oldest first.
    undo_stack: VecDeque<Vec<Stroke>>,
    /// Redo history, most recent last.
    redo_stack: Vec<Vec<Stroke>>,
    mode: SignatureMode,
    render_cache: Option<RenderCache>,
    listeners: Vec<ChangeListener>,
}

impl fmt::Debug for SignatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureState")
            .field("strokes", &self.strokes.len())
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("mode", &self.mode)
            .field("render_cache", &self.render_cache)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Clone for SignatureState {
    /// Clones the data; listeners stay with the original.
    fn clone(&self) -> Self {
        Self {
            strokes: self.strokes.clone(),
            undo_stack: self.undo_stack.clone(),
            redo_stack: self.redo_stack.clone(),
            mode: self.mode,
            render_cache: self.render_cache.clone(),
            listeners: Vec::new(),
        }
    }
}

impl SignatureState {
    /// Create an empty, idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from persisted parts: no history, no render cache.
    pub(crate) fn from_parts(strokes: Vec<Stroke>, mode: SignatureMode) -> Self {
        Self {
            strokes,
            mode,
            ..Self::default()
        }
    }

    /// Register a callback invoked after every effective mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&StateChange) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    pub fn render_cache(&self) -> Option<&RenderCache> {
        self.render_cache.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo snapshots, oldest first.
    pub fn undo_history(&self) -> impl Iterator<Item = &[Stroke]> {
        self.undo_stack.iter().map(Vec::as_slice)
    }

    /// Redo snapshots, oldest first.
    pub fn redo_history(&self) -> impl Iterator<Item = &[Stroke]> {
        self.redo_stack.iter().map(Vec::as_slice)
    }

    /// Append a stroke. Any redo history is discarded.
    pub fn add_stroke(&mut self, stroke: Stroke) {
        let snapshot = self.strokes.clone();
        self.push_undo(snapshot);
        self.strokes.push(stroke);
        self.redo_stack.clear();
        self.mode = SignatureMode::Drawing;
        log::trace!("stroke added, {} total", self.strokes.len());
        self.notify(StateChange::StrokeAdded { mode: self.mode });
    }

    /// Remove every stroke and drop the render cache.
    ///
    /// A non-empty sequence is kept on the undo stack so the clear can be undone.
    pub fn clear(&mut self) {
        if !self.strokes.is_empty() {
            let snapshot = std::mem::take(&mut self.strokes);
            self.push_undo(snapshot);
        }
        self.render_cache = None;
        self.redo_stack.clear();
        self.mode = SignatureMode::Idle;
        log::debug!("signature cleared");
        self.notify(StateChange::Cleared { mode: self.mode });
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.strokes, snapshot);
        self.redo_stack.push(current);
        self.mode = Self::mode_for(&self.strokes);
        log::debug!(
            "undo: {} strokes, {} undo / {} redo left",
            self.strokes.len(),
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        self.notify(StateChange::Undone { mode: self.mode });
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.strokes, snapshot);
        self.push_undo(current);
        self.mode = Self::mode_for(&self.strokes);
        log::debug!(
            "redo: {} strokes, {} undo / {} redo left",
            self.strokes.len(),
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        self.notify(StateChange::Redone { mode: self.mode });
        true
    }

    /// Store a freshly rendered image of the current strokes.
    pub fn update_render_cache(&mut self, cache: RenderCache) {
        self.render_cache = Some(cache);
        if !self.strokes.is_empty() {
            self.mode = SignatureMode::Completed;
        }
        self.notify(StateChange::RenderCacheUpdated { mode: self.mode });
    }

    /// Push a snapshot, evicting the oldest one past [`MAX_UNDO_HISTORY`].
    fn push_undo(&mut self, snapshot: Vec<Stroke>) {
        self.undo_stack.push_back(snapshot);
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.pop_front();
            log::debug!("undo history full, dropped oldest snapshot");
        }
    }

    fn mode_for(strokes: &[Stroke]) -> SignatureMode {
        if strokes.is_empty() {
            SignatureMode::Idle
        } else {
            SignatureMode::Drawing
        }
    }

    fn notify(&mut self, change: StateChange) {
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}
