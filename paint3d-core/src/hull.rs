//! Convex hull of projected points (Graham scan).
//!
//! Used to draw a simplified outline around a mesh's on-screen footprint.

use std::cmp::Ordering;

use crate::math::{cross2, Point2};

/// Convex boundary of `points`, counter-clockwise in a y-up frame, starting
/// from the lowest point (ties: lowest x).
///
/// Duplicates and points on hull edges are dropped. When fewer than three
/// distinct points remain, or all of them are collinear, the distinct points
/// are returned ordered along the line from the anchor.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let Some(anchor) = points.iter().copied().min_by(|a, b| {
        a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
    }) else {
        return Vec::new();
    };

    let mut rest: Vec<Point2> = points.iter().copied().filter(|p| *p != anchor).collect();
    rest.sort_by(|a, b| polar_order(&anchor, a, b));
    rest.dedup();

    if rest.iter().all(|p| cross2(&anchor, &rest[0], p) == 0.0) {
        // 1 or 2 distinct points, or a line. `rest` is sorted by distance
        // along the line already.
        let mut line = Vec::with_capacity(rest.len() + 1);
        line.push(anchor);
        line.extend(rest);
        return line;
    }

    let mut stack: Vec<Point2> = Vec::with_capacity(rest.len() + 1);
    stack.push(anchor);
    for p in rest {
        while stack.len() >= 2 && cross2(&stack[stack.len() - 2], &stack[stack.len() - 1], &p) <= 0.0 {
            stack.pop();
        }
        stack.push(p);
    }
    stack
}

/// Polar angle about `anchor`, ties nearer first. Every point sits at or
/// above the anchor so the sign of the cross product alone orders the
/// angles. The sign is exact (see [`cross2`]), which keeps this a total
/// order for nearly collinear input.
fn polar_order(anchor: &Point2, a: &Point2, b: &Point2) -> Ordering {
    let turn = cross2(anchor, a, b);
    if turn > 0.0 {
        Ordering::Less
    } else if turn < 0.0 {
        Ordering::Greater
    } else {
        distance_sq(anchor, a).total_cmp(&distance_sq(anchor, b))
    }
}

fn distance_sq(from: &Point2, to: &Point2) -> f64 {
    let dx = to.x as f64 - from.x as f64;
    let dy = to.y as f64 - from.y as f64;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f32, f32)]) -> Vec<Point2> {
        raw.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn is_counter_clockwise(hull: &[Point2]) -> bool {
        let n = hull.len();
        (0..n).all(|i| cross2(&hull[i], &hull[(i + 1) % n], &hull[(i + 2) % n]) > 0.0)
    }

    #[test]
    fn test_interior_and_duplicate_points_excluded() {
        let hull = convex_hull(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (1.0, 2.0), (1.0, 1.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0)]));
        assert!(is_counter_clockwise(&hull));
    }

    #[test]
    fn test_square_with_edge_points() {
        let hull = convex_hull(&pts(&[
            (1.0, 1.0),
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 2.0),
            (0.0, 2.0),
            (2.0, 1.0),
            (0.0, 1.0),
            (1.0, 2.0),
            (0.5, 0.5),
        ]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]));
    }

    #[test]
    fn test_anchor_tie_breaks_on_x() {
        let hull = convex_hull(&pts(&[(3.0, 0.0), (1.0, 0.0), (2.0, 3.0)]));
        assert_eq!(hull[0], Point2::new(1.0, 0.0));
        assert_eq!(hull.len(), 3);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());

        let one = pts(&[(4.0, 2.0)]);
        assert_eq!(convex_hull(&one), one);

        let repeated = pts(&[(4.0, 2.0), (4.0, 2.0), (4.0, 2.0)]);
        assert_eq!(convex_hull(&repeated), one);

        let two = pts(&[(3.0, 3.0), (1.0, 1.0)]);
        assert_eq!(convex_hull(&two), pts(&[(1.0, 1.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_collinear_points_return_the_line() {
        let hull = convex_hull(&pts(&[(2.0, 2.0), (0.0, 0.0), (3.0, 3.0), (1.0, 1.0), (1.0, 1.0)]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_nearly_collinear_points() {
        // Points on a line whose f32 coordinates are only almost collinear
        let mut input: Vec<Point2> = (0..200)
            .map(|i| {
                let t = i as f32 * 0.37;
                Point2::new(100.0 + 3.1 * t, 200.0 + 1.7 * t)
            })
            .collect();
        let off_line = Point2::new(50.0, 500.0);
        input.push(off_line);
        let far_end = input[199];

        let hull = convex_hull(&input);
        assert_eq!(hull[0], Point2::new(100.0, 200.0));
        assert!(hull.contains(&far_end));
        assert!(hull.contains(&off_line));
        assert!(is_counter_clockwise(&hull));

        // Nothing lies outside any hull edge
        let n = hull.len();
        for p in &input {
            for i in 0..n {
                assert!(cross2(&hull[i], &hull[(i + 1) % n], p) >= 0.0);
            }
        }
    }

    #[test]
    fn test_hull_is_pure() {
        let input = pts(&[(0.0, 0.0), (5.0, 1.0), (4.0, 4.0), (1.0, 3.0), (2.0, 2.0)]);
        let first = convex_hull(&input);
        let second = convex_hull(&input);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert!(is_counter_clockwise(&first));
    }
}
