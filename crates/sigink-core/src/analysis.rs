//! Measurements over a stroke sequence: bounds, length, complexity and validity.
//!
//! Everything here is a pure function of the strokes. The complexity score
//! and the validity check are heuristics for UI feedback ("sign a bit more"),
//! not a signature-verification measure.

use crate::geometry::{Bounds, Point, Stroke};
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Upper bound of the complexity score.
pub const MAX_COMPLEXITY: u32 = 100;

/// Cap of the stroke-count component of the complexity score.
const PATH_SCORE_CAP: u32 = 40;
/// Cap of the total-length component of the complexity score.
const LENGTH_SCORE_CAP: u32 = 30;
/// Cap of the covered-area component of the complexity score.
const AREA_SCORE_CAP: u32 = 30;

/// Minimum thresholds a signature has to meet to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    pub min_paths: usize,
    pub min_length: f32,
    pub min_complexity: u32,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_paths: 3,
            min_length: 50.0,
            min_complexity: 10,
        }
    }
}

/// Derived snapshot describing a stroke sequence at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub path_count: usize,
    pub total_length: f32,
    pub bounds: Option<Bounds>,
    pub complexity: u32,
    /// Capture time, milliseconds since the UNIX epoch.
    pub timestamp_ms: u64,
}

/// Bounding box of all stroke endpoints, padded by half the widest stroke.
///
/// Returns `None` for an empty sequence. `left` and `top` are clamped at zero.
pub fn calculate_bounds(strokes: &[Stroke]) -> Option<Bounds> {
    if strokes.is_empty() {
        return None;
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut max_width: f32 = 0.0;

    for stroke in strokes {
        for point in [stroke.start, stroke.end] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        max_width = max_width.max(stroke.width);
    }

    let pad = max_width / 2.0;
    Some(Bounds::new(
        (min_x - pad).max(0.0),
        (min_y - pad).max(0.0),
        max_x + pad,
        max_y + pad,
    ))
}

/// Sum of the Euclidean length of every stroke.
pub fn total_length(strokes: &[Stroke]) -> f32 {
    strokes.iter().map(Stroke::length).sum()
}

/// Heuristic complexity score in `0..=100`.
///
/// Sum of three capped parts: stroke count (`2` per stroke, max 40), total
/// length (`1` per 100px, max 30) and covered area (`1` per 10 000px², max 30).
pub fn complexity(strokes: &[Stroke]) -> u32 {
    let count = u32::try_from(strokes.len()).unwrap_or(u32::MAX);
    let path_score = count.saturating_mul(2).min(PATH_SCORE_CAP);
    let length_score = ((total_length(strokes) / 100.0) as u32).min(LENGTH_SCORE_CAP);
    let area_score = calculate_bounds(strokes)
        .map(|b| ((b.area() / 10_000.0) as u32).min(AREA_SCORE_CAP))
        .unwrap_or(0);

    (path_score + length_score + area_score).min(MAX_COMPLEXITY)
}

/// True when all three thresholds pass.
pub fn is_valid(strokes: &[Stroke], min_paths: usize, min_length: f32, min_complexity: u32) -> bool {
    strokes.len() >= min_paths
        && total_length(strokes) >= min_length
        && complexity(strokes) >= min_complexity
}

/// [`is_valid`] with the thresholds bundled in a struct.
pub fn is_valid_with(strokes: &[Stroke], thresholds: &ValidationThresholds) -> bool {
    is_valid(
        strokes,
        thresholds.min_paths,
        thresholds.min_length,
        thresholds.min_complexity,
    )
}

/// Compute every metric at once, stamped with the current time.
pub fn metadata(strokes: &[Stroke]) -> Metadata {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Metadata {
        path_count: strokes.len(),
        total_length: total_length(strokes),
        bounds: calculate_bounds(strokes),
        complexity: complexity(strokes),
        timestamp_ms,
    }
}

/// Simple linear smoothing.
///
/// Each endpoint moves towards the average of itself and the matching
/// endpoints of its neighbours, by `factor` (clamped to `0..=1`). Sequences
/// of fewer than three strokes come back unchanged.
pub fn smooth(strokes: &[Stroke], factor: f32) -> Vec<Stroke> {
    if strokes.len() < 3 {
        return strokes.to_vec();
    }
    let factor = factor.clamp(0.0, 1.0);

    let average = |points: &[Point]| -> Point {
        let n = points.len() as f32;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    };

    strokes
        .iter()
        .enumerate()
        .map(|(i, stroke)| {
            let prev = i.checked_sub(1).map(|j| &strokes[j]);
            let next = strokes.get(i + 1);

            let mut starts = vec![stroke.start];
            let mut ends = vec![stroke.end];
            for neighbour in [prev, next].into_iter().flatten() {
                starts.push(neighbour.start);
                ends.push(neighbour.end);
            }

            Stroke {
                start: stroke.start.lerp(average(&starts), factor),
                end: stroke.end.lerp(average(&ends), factor),
                ..*stroke
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rgba;

    const EPS: f32 = 1e-4;

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32, width: f32) -> Stroke {
        Stroke::new(Point::new(x0, y0), Point::new(x1, y1), width, Rgba::black())
    }

    #[test]
    fn test_bounds_empty() {
        assert!(calculate_bounds(&[]).is_none());
    }

    #[test]
    fn test_bounds_pads_and_clamps() {
        let bounds = calculate_bounds(&[seg(0.0, 0.0, 10.0, 0.0, 2.0)]).unwrap();
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 11.0, 1.0));
    }

    #[test]
    fn test_bounds_uses_widest_stroke() {
        let bounds = calculate_bounds(&[
            seg(20.0, 20.0, 40.0, 20.0, 2.0),
            seg(40.0, 20.0, 40.0, 60.0, 6.0),
        ])
        .unwrap();
        assert_eq!(bounds, Bounds::new(17.0, 17.0, 43.0, 63.0));
    }

    #[test]
    fn test_bounds_contain_every_endpoint() {
        let strokes = vec![
            seg(5.0, 80.0, 120.0, 3.0, 1.0),
            seg(120.0, 3.0, 60.0, 200.0, 4.0),
            seg(60.0, 200.0, 0.0, 0.0, 2.5),
        ];
        let bounds = calculate_bounds(&strokes).unwrap();
        for s in &strokes {
            assert!(bounds.contains(s.start));
            assert!(bounds.contains(s.end));
        }
    }

    #[test]
    fn test_total_length() {
        let strokes = [seg(0.0, 0.0, 3.0, 4.0, 1.0), seg(3.0, 4.0, 3.0, 14.0, 1.0)];
        assert!((total_length(&strokes) - 15.0).abs() < EPS);
        assert_eq!(total_length(&[]), 0.0);
    }

    #[test]
    fn test_complexity_components() {
        assert_eq!(complexity(&[]), 0);

        // 1 stroke: path 2, length 200/100 = 2, area (201*1)/10000 = 0
        let one = [seg(0.0, 10.0, 200.0, 10.0, 1.0)];
        assert_eq!(complexity(&one), 4);
    }

    #[test]
    fn test_complexity_is_capped() {
        // 30 long strokes over a large area saturate every component
        let strokes: Vec<Stroke> = (0..30)
            .map(|i| {
                let y = i as f32 * 20.0;
                seg(0.0, y, 1000.0, y + 20.0, 2.0)
            })
            .collect();
        assert_eq!(complexity(&strokes), MAX_COMPLEXITY);
    }

    #[test]
    fn test_complexity_never_decreases_when_adding() {
        let mut strokes = Vec::new();
        let mut last = complexity(&strokes);
        for i in 0..25 {
            let x = (i * 37 % 300) as f32;
            let y = (i * 53 % 150) as f32;
            strokes.push(seg(x, y, x + 40.0, y + 15.0, 3.0));
            let current = complexity(&strokes);
            assert!(current >= last, "complexity dropped from {last} to {current}");
            last = current;
        }
    }

    #[test]
    fn test_is_valid_requires_all_thresholds() {
        let strokes = [
            seg(0.0, 0.0, 100.0, 0.0, 2.0),
            seg(100.0, 0.0, 100.0, 100.0, 2.0),
            seg(100.0, 100.0, 0.0, 100.0, 2.0),
        ];
        assert!(is_valid(&strokes, 3, 250.0, 5));
        assert!(!is_valid(&strokes, 4, 250.0, 5));
        assert!(!is_valid(&strokes, 3, 301.0, 5));
        assert!(!is_valid(&strokes, 3, 250.0, 99));
        assert!(!is_valid_with(&[], &ValidationThresholds::default()));
        assert!(is_valid_with(&strokes, &ValidationThresholds::default()));
    }

    #[test]
    fn test_metadata_bundles_metrics() {
        let strokes = [seg(0.0, 0.0, 30.0, 40.0, 2.0)];
        let meta = metadata(&strokes);
        assert_eq!(meta.path_count, 1);
        assert!((meta.total_length - 50.0).abs() < EPS);
        assert_eq!(meta.bounds, calculate_bounds(&strokes));
        assert_eq!(meta.complexity, complexity(&strokes));
        assert!(meta.timestamp_ms > 0);
    }

    #[test]
    fn test_smooth_short_sequences_untouched() {
        let strokes = vec![seg(0.0, 0.0, 10.0, 0.0, 1.0), seg(10.0, 0.0, 10.0, 10.0, 1.0)];
        assert_eq!(smooth(&strokes, 0.5), strokes);
    }

    #[test]
    fn test_smooth_pulls_outliers_in() {
        let strokes = vec![
            seg(0.0, 0.0, 10.0, 0.0, 1.0),
            seg(10.0, 0.0, 20.0, 30.0, 1.0),
            seg(20.0, 0.0, 30.0, 0.0, 1.0),
        ];
        let smoothed = smooth(&strokes, 1.0);
        // middle end is averaged with its neighbours' ends: (0 + 30 + 0) / 3
        assert!((smoothed[1].end.y - 10.0).abs() < EPS);
        assert_eq!(smoothed[1].width, 1.0);

        let untouched = smooth(&strokes, 0.0);
        assert_eq!(untouched, strokes);
    }
}
