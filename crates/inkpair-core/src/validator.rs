//! Guided-mode stroke validation.
//!
//! Decides whether one freshly completed user stroke plausibly matches the
//! Nth expected stroke of a reference glyph, by comparing stroke endpoints
//! against the reference path's endpoints rescaled into canvas coordinates.

use crate::geometry::distance;
use crate::glyph::{ApproxEndpoints, PathEndpoints, REFERENCE_SIZE, ReferenceGlyph};
use crate::stroke::Stroke;

/// Outcome of validating one stroke against the expected reference stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Endpoints land within the threshold of the reference stroke's.
    Accepted,
    /// Endpoints miss, or the reference path is unparsable (fail closed).
    Rejected,
    /// The user has already drawn every expected stroke; the excess stroke
    /// is ignored rather than judged.
    ExtraStroke,
}

/// Endpoint-distance validator.
///
/// The endpoint reader is a strategy so a full bezier evaluator can replace
/// the approximate one without changing the accept/reject contract.
pub struct StrokeValidator<E = ApproxEndpoints> {
    /// Side length of the user's (square) canvas, in pixels.
    canvas_size: f64,
    /// Maximum pixel distance between matching endpoints.
    threshold: f64,
    endpoints: E,
}

impl StrokeValidator<ApproxEndpoints> {
    pub const DEFAULT_CANVAS_SIZE: f64 = 300.0;
    pub const DEFAULT_THRESHOLD: f64 = 60.0;

    pub fn new(canvas_size: f64, threshold: f64) -> Self {
        Self {
            canvas_size,
            threshold,
            endpoints: ApproxEndpoints,
        }
    }
}

impl Default for StrokeValidator<ApproxEndpoints> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CANVAS_SIZE, Self::DEFAULT_THRESHOLD)
    }
}

impl<E: PathEndpoints> StrokeValidator<E> {
    pub fn with_endpoints(canvas_size: f64, threshold: f64, endpoints: E) -> Self {
        Self {
            canvas_size,
            threshold,
            endpoints,
        }
    }

    /// Validate `stroke` against reference stroke `index` of `glyph`.
    ///
    /// Pure decision function: the caller advances or resets its own state
    /// based on the verdict.
    pub fn check(&self, stroke: &Stroke, glyph: &ReferenceGlyph, index: usize) -> Verdict {
        if stroke.len() < 2 {
            return Verdict::Rejected;
        }
        let Some(reference) = glyph.strokes.get(index) else {
            return Verdict::ExtraStroke;
        };
        let Some((ref_start, ref_end)) = self.endpoints.endpoints(&reference.path) else {
            return Verdict::Rejected;
        };

        let scale = self.canvas_size / REFERENCE_SIZE;
        let start_dist = distance(stroke.start(), (ref_start.to_vec2() * scale).to_point());
        let end_dist = distance(stroke.end(), (ref_end.to_vec2() * scale).to_point());

        if start_dist < self.threshold && end_dist < self.threshold {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::ReferenceStroke;
    use kurbo::Point;

    fn glyph_with_paths(paths: &[&str]) -> ReferenceGlyph {
        ReferenceGlyph {
            glyph: '二',
            strokes: paths
                .iter()
                .enumerate()
                .map(|(i, d)| ReferenceStroke {
                    id: format!("s{}", i + 1),
                    path: (*d).to_string(),
                    kind: String::new(),
                })
                .collect(),
        }
    }

    // Reference stroke from (10,50) to (100,50) in 109-space; on a 300 px
    // canvas that rescales to roughly (27.5,137.6) -> (275.2,137.6).
    const FLAT: &str = "M10,50 L100,50";

    #[test]
    fn test_accepts_matching_endpoints() {
        let validator = StrokeValidator::default();
        let glyph = glyph_with_paths(&[FLAT]);
        let stroke =
            Stroke::finish(vec![Point::new(28.0, 138.0), Point::new(275.0, 138.0)]).unwrap();
        assert_eq!(validator.check(&stroke, &glyph, 0), Verdict::Accepted);
    }

    #[test]
    fn test_threshold_boundary() {
        let validator = StrokeValidator::new(300.0, 60.0);
        let glyph = glyph_with_paths(&[FLAT]);
        let scale = 300.0 / REFERENCE_SIZE;
        let start = Point::new(10.0 * scale, 50.0 * scale);
        let end = Point::new(100.0 * scale, 50.0 * scale);

        // Just inside: both endpoints 59 px off.
        let stroke =
            Stroke::finish(vec![Point::new(start.x + 59.0, start.y), Point::new(end.x + 59.0, end.y)])
                .unwrap();
        assert_eq!(validator.check(&stroke, &glyph, 0), Verdict::Accepted);

        // Just outside: start endpoint 61 px off flips the verdict.
        let stroke =
            Stroke::finish(vec![Point::new(start.x + 61.0, start.y), Point::new(end.x, end.y)])
                .unwrap();
        assert_eq!(validator.check(&stroke, &glyph, 0), Verdict::Rejected);

        // Moving only the end past the threshold also rejects.
        let stroke =
            Stroke::finish(vec![Point::new(start.x, start.y), Point::new(end.x, end.y + 61.0)])
                .unwrap();
        assert_eq!(validator.check(&stroke, &glyph, 0), Verdict::Rejected);
    }

    #[test]
    fn test_unparsable_path_fails_closed() {
        let validator = StrokeValidator::default();
        let glyph = glyph_with_paths(&["not a path"]);
        let stroke = Stroke::finish(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        assert_eq!(validator.check(&stroke, &glyph, 0), Verdict::Rejected);
    }

    #[test]
    fn test_extra_stroke_ignored() {
        let validator = StrokeValidator::default();
        let glyph = glyph_with_paths(&[FLAT]);
        let stroke = Stroke::finish(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]).unwrap();
        assert_eq!(validator.check(&stroke, &glyph, 1), Verdict::ExtraStroke);
    }
}
