//! Point distance and stroke direction classification.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Coarse direction of a stroke, derived from its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalRight,
    DiagonalLeft,
    Curve,
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Classify a stroke's direction from its first and last points only.
///
/// The interior of the path is deliberately ignored: endpoint angle is cheap
/// and sufficient to disambiguate the small set of reference directions in
/// the pattern database. Anything that does not fall cleanly into one of the
/// four angular buckets is tagged `Curve`.
pub fn classify_direction(points: &[Point]) -> Direction {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Direction::Curve;
    };
    if points.len() < 2 {
        return Direction::Curve;
    }

    let dx = last.x - first.x;
    let dy = last.y - first.y;
    let angle = dy.atan2(dx).to_degrees();

    if angle.abs() < 30.0 || angle.abs() > 150.0 {
        Direction::Horizontal
    } else if (angle - 90.0).abs() < 30.0 || (angle + 90.0).abs() < 30.0 {
        Direction::Vertical
    } else if angle > 0.0 && angle < 90.0 {
        Direction::DiagonalRight
    } else if angle > -90.0 && angle < 0.0 {
        Direction::DiagonalLeft
    } else {
        Direction::Curve
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let d = distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_horizontal() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert_eq!(classify_direction(&points), Direction::Horizontal);
        // Right-to-left is still horizontal.
        let points = vec![Point::new(10.0, 1.0), Point::new(0.0, 0.0)];
        assert_eq!(classify_direction(&points), Direction::Horizontal);
    }

    #[test]
    fn test_vertical() {
        let points = vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0)];
        assert_eq!(classify_direction(&points), Direction::Vertical);
        let points = vec![Point::new(0.0, 10.0), Point::new(1.0, 0.0)];
        assert_eq!(classify_direction(&points), Direction::Vertical);
    }

    #[test]
    fn test_diagonals() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert_eq!(classify_direction(&points), Direction::DiagonalRight);
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, -10.0)];
        assert_eq!(classify_direction(&points), Direction::DiagonalLeft);
    }

    #[test]
    fn test_interior_points_ignored() {
        // Wild interior, flat endpoints: still classified by the endpoints.
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 80.0),
            Point::new(7.0, -80.0),
            Point::new(10.0, 0.0),
        ];
        assert_eq!(classify_direction(&points), Direction::Horizontal);
    }

    #[test]
    fn test_degenerate() {
        assert_eq!(classify_direction(&[]), Direction::Curve);
        assert_eq!(classify_direction(&[Point::new(1.0, 1.0)]), Direction::Curve);
    }

    #[test]
    fn test_pure() {
        let points = vec![Point::new(0.0, 0.0), Point::new(7.0, 3.0)];
        assert_eq!(classify_direction(&points), classify_direction(&points));
    }
}
