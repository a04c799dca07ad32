//! The stroke model: one continuous press-move-release gesture.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, classify_direction};

/// A completed stroke: an ordered point sequence plus its direction tag.
///
/// Invariant: a stroke always has at least 2 points. Single-point gestures
/// (taps) are not strokes and are dropped at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    /// Sample points in device-local canvas coordinates, in time order.
    pub points: Vec<Point>,
    /// Coarse direction, computed once when the stroke is finalized.
    pub direction: Direction,
}

impl Stroke {
    /// Finalize a point sequence into a stroke.
    ///
    /// Returns `None` if the gesture has fewer than 2 points.
    pub fn finish(points: Vec<Point>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let direction = classify_direction(&points);
        Some(Self { points, direction })
    }

    /// First sample point.
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Last sample point.
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
