//! Point-in-polygon containment by ray casting, used for picking.
//!
//! A horizontal ray is cast from the query point toward +x and the edge
//! crossings are counted; an odd count means inside.
//!
//! Boundary rule (half-open): an edge is crossed when one endpoint has
//! `y <= py` and the other `y > py`, and only crossings strictly to the
//! right of the point count. As a result a point exactly on the boundary is
//! inside when the polygon's interior lies toward +x and +y from it: left
//! and bottom edges (in y-up terms, "bottom" meaning smaller y) are inside,
//! right and top edges are outside. Two polygons sharing an edge therefore
//! never both claim a point on it.

use crate::math::Point2;
use crate::pipeline::ShadedTriangle;

/// Whether `point` lies inside the closed polygon `polygon`.
///
/// Polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = &polygon[polygon.len() - 1];
    for current in polygon {
        let straddles = (current.y <= point.y) != (previous.y <= point.y);
        if straddles {
            let t = (point.y - current.y) / (previous.y - current.y);
            let x = current.x + t * (previous.x - current.x);
            if point.x < x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Whether `point` falls inside a projected triangle
pub fn point_in_triangle(point: &Point2, triangle: &ShadedTriangle) -> bool {
    point_in_polygon(point, &triangle.screen_points())
}
