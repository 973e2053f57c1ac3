//! Turning pointer drags into stroke segments.

use crate::geometry::{Point, Rgba, Stroke};
use crate::state::SignatureState;
use serde::{Deserialize, Serialize};

/// Pen used for newly captured strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenStyle {
    pub color: Rgba,
    pub width: f32,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: Rgba::black(),
            width: 3.0,
        }
    }
}

/// Tracks one drag gesture at a time and emits a segment per pointer move.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    pub pen: PenStyle,
    /// Moves shorter than this (in pixels) are ignored.
    pub min_distance: f32,
    last_point: Option<Point>,
}

impl StrokeCapture {
    pub fn new(pen: PenStyle) -> Self {
        Self {
            pen,
            min_distance: 0.0,
            last_point: None,
        }
    }

    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.last_point.is_some()
    }

    /// Pointer went down.
    pub fn begin(&mut self, point: Point) {
        self.last_point = Some(point);
    }

    /// Pointer moved; returns the segment from the previous position, if any.
    pub fn move_to(&mut self, point: Point) -> Option<Stroke> {
        let last = self.last_point?;
        let distance = last.distance(point);
        if distance == 0.0 || distance < self.min_distance {
            return None;
        }
        self.last_point = Some(point);
        log::trace!("captured segment {:?} -> {:?}", last, point);
        Some(Stroke::new(last, point, self.pen.width, self.pen.color))
    }

    /// Pointer went up.
    pub fn end(&mut self) {
        self.last_point = None;
    }

    /// Gesture aborted by the host; nothing more is emitted for it.
    pub fn cancel(&mut self) {
        if self.last_point.take().is_some() {
            log::debug!("stroke capture cancelled");
        }
    }

    /// [`move_to`](Self::move_to) and append the segment to `state`.
    pub fn feed(&mut self, state: &mut SignatureState, point: Point) -> bool {
        match self.move_to(point) {
            Some(stroke) => {
                state.add_stroke(stroke);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_emits_connected_segments() {
        let mut capture = StrokeCapture::new(PenStyle {
            color: Rgba::new(0, 0, 128, 255),
            width: 2.5,
        });
        capture.begin(Point::new(0.0, 0.0));
        let a = capture.move_to(Point::new(5.0, 0.0)).unwrap();
        let b = capture.move_to(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(a.end, b.start);
        assert_eq!(a.width, 2.5);
        assert_eq!(b.color, Rgba::new(0, 0, 128, 255));
    }

    #[test]
    fn test_move_without_begin_is_ignored() {
        let mut capture = StrokeCapture::default();
        assert!(capture.move_to(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_min_distance_filters_jitter() {
        let mut capture = StrokeCapture::default().with_min_distance(2.0);
        capture.begin(Point::new(0.0, 0.0));
        assert!(capture.move_to(Point::new(1.0, 0.0)).is_none());
        assert!(capture.move_to(Point::new(0.0, 0.0)).is_none());
        let s = capture.move_to(Point::new(3.0, 0.0)).unwrap();
        assert_eq!(s.start, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_cancel_stops_the_gesture() {
        let mut state = SignatureState::new();
        let mut capture = StrokeCapture::default();
        capture.begin(Point::new(0.0, 0.0));
        assert!(capture.feed(&mut state, Point::new(10.0, 0.0)));
        capture.cancel();
        assert!(!capture.is_active());
        assert!(!capture.feed(&mut state, Point::new(20.0, 0.0)));
        assert_eq!(state.len(), 1);
    }
}
