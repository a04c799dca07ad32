//! Static database of known character stroke patterns.
//!
//! This is the coarse lookup table the freeform recognizer runs against when
//! no reference glyph is available. Entries are loaded once at compile time
//! and never mutated.

use serde::{Deserialize, Serialize};

use crate::geometry::Direction;

/// How intricate a character's shape is.
///
/// Simple shapes are statistically more likely to be what a novice actually
/// drew, so the recognizer nudges ranking toward them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// One reference entry: a character with its expected stroke count.
#[derive(Debug, Clone, Copy)]
pub struct CharacterPattern {
    pub glyph: char,
    pub stroke_count: usize,
    pub complexity: Complexity,
    /// Expected per-stroke directions, where the canonical order is known.
    pub expected_directions: Option<&'static [Direction]>,
}

use Complexity::{Complex, Medium, Simple};
use Direction::{DiagonalLeft, DiagonalRight, Horizontal, Vertical};

const fn pat(
    glyph: char,
    stroke_count: usize,
    complexity: Complexity,
    expected_directions: Option<&'static [Direction]>,
) -> CharacterPattern {
    CharacterPattern {
        glyph,
        stroke_count,
        complexity,
        expected_directions,
    }
}

/// Known characters, ordered by stroke count. Tie order inside a stroke
/// count is the tie order of recognizer output.
pub static PATTERNS: &[CharacterPattern] = &[
    pat('一', 1, Simple, Some(&[Horizontal])),
    pat('二', 2, Simple, Some(&[Horizontal, Horizontal])),
    pat('十', 2, Simple, Some(&[Horizontal, Vertical])),
    pat('人', 2, Simple, Some(&[DiagonalLeft, DiagonalRight])),
    pat('八', 2, Simple, Some(&[DiagonalLeft, DiagonalRight])),
    pat('三', 3, Simple, Some(&[Horizontal, Horizontal, Horizontal])),
    pat('口', 3, Simple, None),
    pat('大', 3, Simple, None),
    pat('山', 3, Simple, None),
    pat('上', 3, Simple, None),
    pat('下', 3, Simple, None),
    pat('中', 4, Medium, None),
    pat('木', 4, Medium, None),
    pat('水', 4, Medium, None),
    pat('火', 4, Medium, None),
    pat('日', 4, Medium, None),
    pat('月', 4, Medium, None),
    pat('田', 5, Medium, None),
    pat('目', 5, Medium, None),
    pat('白', 5, Medium, None),
    pat('写', 5, Medium, None),
    pat('字', 6, Medium, None),
    pat('好', 6, Medium, None),
    pat('我', 7, Complex, None),
    pat('你', 7, Complex, None),
    pat('学', 8, Complex, None),
    pat('语', 9, Complex, None),
    pat('谢', 12, Complex, None),
];

/// Entries whose stroke count matches exactly.
pub fn by_stroke_count(count: usize) -> impl Iterator<Item = &'static CharacterPattern> {
    PATTERNS.iter().filter(move |p| p.stroke_count == count)
}

/// Entries whose stroke count is within ±1 of the observed count, tolerating
/// minor segmentation noise (a split or merged gesture).
pub fn near_stroke_count(count: usize) -> impl Iterator<Item = &'static CharacterPattern> {
    PATTERNS
        .iter()
        .filter(move |p| p.stroke_count.abs_diff(count) <= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stroke_entry_exists() {
        let singles: Vec<_> = by_stroke_count(1).collect();
        assert_eq!(singles.len(), 1);
        assert_eq!(singles[0].glyph, '一');
    }

    #[test]
    fn test_near_includes_neighbors() {
        let glyphs: Vec<char> = near_stroke_count(2).map(|p| p.glyph).collect();
        assert!(glyphs.contains(&'一')); // 1 stroke
        assert!(glyphs.contains(&'十')); // 2 strokes
        assert!(glyphs.contains(&'口')); // 3 strokes
        assert!(!glyphs.contains(&'中')); // 4 strokes
    }

    #[test]
    fn test_table_sorted_by_stroke_count() {
        for pair in PATTERNS.windows(2) {
            assert!(pair[0].stroke_count <= pair[1].stroke_count);
        }
    }
}
