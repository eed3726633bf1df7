// UTILS

use bevy::math::DVec2;
use spade::Point2;

use crate::config::GEOMETRY_EPSILON;
use crate::systems::city::Polygon;

/// Axis-aligned bounding box of a polygon
/// # Returns `Some((min, max))`, or `None` for an empty polygon.
pub fn bounding_box(polygon: &[DVec2]) -> Option<(DVec2, DVec2)> {
    let first = *polygon.first()?;
    let bounds = polygon
        .iter()
        .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    Some(bounds)
}

/// Computes the signed area of a polygon
/// # Returns the polygon's area, positive for counter-clockwise winding. Returns 0.0 for fewer than 3 vertices.
pub fn polygon_area(polygon: &[DVec2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let n = polygon.len();
    let mut area = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].perp_dot(polygon[j]);
    }

    area / 2.0
}

/// Calculates the centroid of a polygon
/// Returns `DVec2::ZERO` for degenerate polygons.
pub fn polygon_centroid(polygon: &[DVec2], area: f64) -> DVec2 {
    if polygon.len() < 3 || area == 0.0 {
        return DVec2::ZERO;
    }

    let n = polygon.len();
    let mut centroid = DVec2::ZERO;

    for i in 0..n {
        let j = (i + 1) % n;
        let p = polygon[i].perp_dot(polygon[j]);
        centroid += (polygon[i] + polygon[j]) * p;
    }

    centroid / (6.0 * area)
}

/// Calculates the circumcenter of a triangle given by three points.
/// Falls back to the triangle centroid if the points are collinear.
pub fn calculate_circumcenter(p1: Point2<f64>, p2: Point2<f64>, p3: Point2<f64>) -> DVec2 {
    let (ax, ay) = (p1.x, p1.y);
    let (bx, by) = (p2.x, p2.y);
    let (cx, cy) = (p3.x, p3.y);

    // d = 2 * det | 1 x1 y1 |
    //             | 1 x2 y2 |
    //             | 1 x3 y3 |
    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    let centroid = DVec2::new((ax + bx + cx) / 3.0, (ay + by + cy) / 3.0);

    if d.abs() < f64::EPSILON {
        return centroid;
    }

    let ux = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;
    let uy = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;

    DVec2::new(ux, uy)
}

/// Calculates shortest distance from a point to a line segment
pub fn point_to_segment_distance(point: DVec2, start: DVec2, end: DVec2) -> f64 {
    let line_vec = end - start;
    let point_vec = point - start;
    let len_sq = line_vec.length_squared();

    if len_sq < f64::EPSILON {
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / len_sq).clamp(0.0, 1.0);
    point.distance(start + line_vec * t)
}

/// True if the point lies on (within tolerance of) any polygon edge.
pub fn point_on_boundary(point: DVec2, polygon: &[DVec2]) -> bool {
    let n = polygon.len();
    (0..n).any(|i| {
        point_to_segment_distance(point, polygon[i], polygon[(i + 1) % n]) <= GEOMETRY_EPSILON
    })
}

/// Determines whether a point is inside a polygon using the ray-casting algorithm.
/// Points on the boundary may land on either side; use
/// [`point_strictly_inside`] when the boundary must be excluded.
pub fn point_in_polygon(point: DVec2, polygon: &[DVec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Boundary-exclusive containment test.
pub fn point_strictly_inside(point: DVec2, polygon: &[DVec2]) -> bool {
    !point_on_boundary(point, polygon) && point_in_polygon(point, polygon)
}

/// Inside or on the boundary.
pub fn point_covered(point: DVec2, polygon: &[DVec2]) -> bool {
    point_on_boundary(point, polygon) || point_in_polygon(point, polygon)
}

fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// True if the open segments p1-p2 and p3-p4 cross at a single interior point.
/// Touching at an endpoint or running collinear does not count.
pub fn segments_cross(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    let eps = GEOMETRY_EPSILON;
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

/// True if `inner` lies entirely within `outer` (shared boundary allowed).
///
/// `inner` is expected to be convex, which holds for building footprints.
pub fn polygon_contains_polygon(outer: &[DVec2], inner: &[DVec2]) -> bool {
    if outer.len() < 3 || inner.len() < 3 {
        return false;
    }

    let n = inner.len();
    let m = outer.len();

    // vertices and edge midpoints must not leave the outer polygon
    for i in 0..n {
        let a = inner[i];
        let b = inner[(i + 1) % n];
        if !point_covered(a, outer) || !point_covered((a + b) * 0.5, outer) {
            return false;
        }
    }

    // no outer edge may cut through an inner edge
    for i in 0..n {
        let (a, b) = (inner[i], inner[(i + 1) % n]);
        for j in 0..m {
            if segments_cross(a, b, outer[j], outer[(j + 1) % m]) {
                return false;
            }
        }
    }

    // a reflex vertex of the outer polygon poking into the inner one
    !outer.iter().any(|&v| point_strictly_inside(v, inner))
}

/// Removes the implicit closing vertex if the ring repeats its first point.
pub fn open_ring(mut polygon: Polygon) -> Polygon {
    if polygon.len() > 1
        && polygon[0].distance(polygon[polygon.len() - 1]) <= GEOMETRY_EPSILON
    {
        polygon.pop();
    }
    polygon
}

/// Cuts `subject` down to the part inside the convex polygon `clip`
/// (Sutherland-Hodgman, one half-plane per clip edge)
///
/// # Returns
/// The clipped ring, counter-clockwise if `subject` was. Empty when nothing
/// of `subject` lies inside `clip`.
pub fn clip_to_convex(subject: &[DVec2], clip: &[DVec2]) -> Polygon {
    if clip.len() < 3 {
        return Vec::new();
    }
    // inside is the left side of each edge for a counter-clockwise clip
    let winding = polygon_area(clip).signum();
    let mut output: Polygon = subject.to_vec();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let (a, b) = (clip[i], clip[(i + 1) % clip.len()]);
        let side = |p: DVec2| winding * orientation(a, b, p);

        let input = std::mem::take(&mut output);
        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            let (sc, sp) = (side(current), side(previous));

            if sc >= 0.0 {
                if sp < 0.0 {
                    output.push(previous + (current - previous) * (sp / (sp - sc)));
                }
                output.push(current);
            } else if sp >= 0.0 {
                output.push(previous + (current - previous) * (sp / (sp - sc)));
            }
        }
        output.dedup_by(|p, q| p.distance(*q) <= GEOMETRY_EPSILON);
    }

    open_ring(output)
}
