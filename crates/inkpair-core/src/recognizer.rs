//! Freeform character recognition.
//!
//! A deliberately crude heuristic classifier: ranks pattern-database
//! candidates by stroke count with fixed confidence weights. Not a trained
//! model: its value is being deterministic, fast, and available when no
//! reference glyph can be fetched.

use serde::{Deserialize, Serialize};

use crate::patterns::{Complexity, by_stroke_count, near_stroke_count};
use crate::stroke::Stroke;

/// Confidence at which callers commit to the top candidate.
pub const ACCEPT_THRESHOLD: f64 = 0.5;
/// Confidence at which the match is considered unambiguous.
pub const CONFIDENT_THRESHOLD: f64 = 0.7;

/// Maximum number of ranked guesses returned.
const MAX_RESULTS: usize = 3;

/// Confidence assigned to weak fallback guesses (exact-count match only,
/// reached when the tolerant filter finds nothing).
const FALLBACK_CONFIDENCE: f64 = 0.3;

const BASE_CONFIDENCE: f64 = 0.5;
const EXACT_COUNT_BONUS: f64 = 0.3;
const HINT_BONUS: f64 = 0.2;
const SIMPLE_BONUS: f64 = 0.1;

/// One ranked character guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub glyph: char,
    /// Heuristic score in [0, 1]; not a calibrated probability.
    pub confidence: f64,
}

/// Rank up to 3 character guesses for a completed set of strokes.
///
/// `hint` is the caller's expected character, if it has one (e.g. the lesson
/// knows which character was prompted); a matching candidate gets a fixed
/// ranking bonus. Deterministic: ties keep pattern-table order.
pub fn recognize(strokes: &[Stroke], hint: Option<char>) -> Vec<RecognitionResult> {
    if strokes.is_empty() {
        return Vec::new();
    }
    let count = strokes.len();

    let candidates: Vec<_> = near_stroke_count(count).collect();
    if candidates.is_empty() {
        // Weak default guesses: exact count only, fixed low confidence.
        return by_stroke_count(count)
            .take(MAX_RESULTS)
            .map(|p| RecognitionResult {
                glyph: p.glyph,
                confidence: FALLBACK_CONFIDENCE,
            })
            .collect();
    }

    let mut results: Vec<RecognitionResult> = candidates
        .into_iter()
        .map(|p| {
            let mut confidence = BASE_CONFIDENCE;
            if p.stroke_count == count {
                confidence += EXACT_COUNT_BONUS;
            }
            if hint == Some(p.glyph) {
                confidence += HINT_BONUS;
            }
            if p.complexity == Complexity::Simple {
                confidence += SIMPLE_BONUS;
            }
            RecognitionResult {
                glyph: p.glyph,
                confidence: confidence.min(1.0),
            }
        })
        .collect();

    // Stable sort keeps table order among equal confidences.
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    results.truncate(MAX_RESULTS);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn strokes(n: usize) -> Vec<Stroke> {
        (0..n)
            .map(|i| {
                let y = i as f64 * 20.0;
                Stroke::finish(vec![Point::new(0.0, y), Point::new(50.0, y)]).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(recognize(&[], None).is_empty());
    }

    #[test]
    fn test_exact_match_scores_high() {
        let results = recognize(&strokes(1), None);
        let top = results.iter().find(|r| r.glyph == '一').unwrap();
        // 0.5 base + 0.3 exact + 0.1 simple.
        assert!(top.confidence >= 0.8);
    }

    #[test]
    fn test_hint_bonus() {
        // '你' (7 strokes, complex) scores 0.5 at 8 observed strokes, so the
        // hinted 0.7 stays under the clamp and the full bonus is visible.
        let without = recognize(&strokes(8), None);
        let with = recognize(&strokes(8), Some('你'));
        let base = without.iter().find(|r| r.glyph == '你').unwrap();
        let boosted = with.iter().find(|r| r.glyph == '你').unwrap();
        assert!((boosted.confidence - base.confidence - 0.2).abs() < 1e-9);
        // The exact-count candidate still outranks the hinted near match,
        // but the hint lifts '你' past its unhinted peers.
        assert_eq!(with[0].glyph, '学');
        assert_eq!(with[1].glyph, '你');
    }

    #[test]
    fn test_confidence_clamped() {
        // Exact + hint + simple would be 1.1 unclamped.
        let results = recognize(&strokes(1), Some('一'));
        assert!((results[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_three() {
        let results = recognize(&strokes(3), None);
        assert!(results.len() <= 3);
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_deterministic() {
        let input = strokes(4);
        let a = recognize(&input, Some('木'));
        let b = recognize(&input, Some('木'));
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_candidates_for_absurd_count() {
        // Nothing in the table is within ±1 of 40 strokes, and nothing
        // matches exactly either: empty result, not an error.
        let results = recognize(&strokes(40), None);
        assert!(results.is_empty());
    }
}
