//! Oriented rectangle collision checks for building footprints.
//!
//! Uses the Separating Axis Theorem. Touching (shared edge or corner) is
//! never counted as overlap, matching the boundary-inclusive containment
//! test used for regions.

use bevy::math::DVec2;

pub type Corners = [DVec2; 4];

/// Corners of a `width` x `height` rectangle anchored at its first corner,
/// rotated counter-clockwise by `rotation_rad` about the anchor.
pub fn anchored_rect(anchor: DVec2, width: f64, height: f64, rotation_rad: f64) -> Corners {
    let rot = DVec2::from_angle(rotation_rad);
    let local = [
        DVec2::new(0.0, 0.0),
        DVec2::new(width, 0.0),
        DVec2::new(width, height),
        DVec2::new(0.0, height),
    ];
    local.map(|p| anchor + rot.rotate(p))
}

fn project(points: &[DVec2], axis: DVec2) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let dot = p.dot(axis);
        (lo.min(dot), hi.max(dot))
    })
}

fn separated_on(axis: DVec2, a: &[DVec2], b: &[DVec2]) -> bool {
    if axis.length_squared() < f64::EPSILON {
        return false;
    }
    let (min_a, max_a) = project(a, axis);
    let (min_b, max_b) = project(b, axis);
    max_a <= min_b || max_b <= min_a
}

// Only two edge normals per rectangle, opposite edges are parallel.
fn rect_axes(corners: &Corners) -> [DVec2; 2] {
    [
        (corners[1] - corners[0]).perp(),
        (corners[2] - corners[1]).perp(),
    ]
}

/// True if the interiors of two footprints overlap.
pub fn footprints_overlap(a: &Corners, b: &Corners) -> bool {
    rect_axes(a)
        .into_iter()
        .chain(rect_axes(b))
        .all(|axis| !separated_on(axis, a, b))
}

/// True if the segment passes through the footprint interior.
pub fn segment_hits_footprint(corners: &Corners, start: DVec2, end: DVec2) -> bool {
    let segment = [start, end];
    let [ax0, ax1] = rect_axes(corners);

    // a zero-length segment has no normal; the rectangle axes alone decide
    [ax0, ax1, (end - start).perp()]
        .into_iter()
        .all(|axis| !separated_on(axis, corners, &segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn anchored_rect_rotates_about_anchor() {
        let c = anchored_rect(DVec2::new(1.0, 1.0), 2.0, 1.0, std::f64::consts::FRAC_PI_2);
        assert!(c[0].distance(DVec2::new(1.0, 1.0)) < 1e-12);
        assert!(c[1].distance(DVec2::new(1.0, 3.0)) < 1e-12);
        assert!(c[2].distance(DVec2::new(0.0, 3.0)) < 1e-12);
    }

    #[test]
    fn separated_no_overlap() {
        let a = anchored_rect(DVec2::ZERO, 5.0, 2.5, 0.0);
        let b = anchored_rect(DVec2::new(10.0, 0.0), 5.0, 2.5, 0.0);
        assert!(!footprints_overlap(&a, &b));
    }

    #[test]
    fn overlapping() {
        let a = anchored_rect(DVec2::ZERO, 5.0, 2.5, 0.0);
        let b = anchored_rect(DVec2::new(3.0, 0.0), 5.0, 2.5, 0.0);
        assert!(footprints_overlap(&a, &b));
    }

    #[test]
    fn touching_no_overlap() {
        let a = anchored_rect(DVec2::ZERO, 5.0, 2.5, 0.0);
        let b = anchored_rect(DVec2::new(5.0, 0.0), 5.0, 2.5, 0.0);
        assert!(!footprints_overlap(&a, &b));
        let corner = anchored_rect(DVec2::new(5.0, 2.5), 5.0, 2.5, 0.0);
        assert!(!footprints_overlap(&a, &corner));
    }

    #[test]
    fn rotated_same_anchor_overlap() {
        let a = anchored_rect(DVec2::ZERO, 5.0, 2.5, 0.0);
        let b = anchored_rect(DVec2::ZERO, 5.0, 2.5, FRAC_PI_4);
        assert!(footprints_overlap(&a, &b));
    }

    #[test]
    fn segment_through_and_beside() {
        let rect = anchored_rect(DVec2::ZERO, 4.0, 2.0, 0.0);
        assert!(segment_hits_footprint(&rect, DVec2::new(-1.0, 1.0), DVec2::new(5.0, 1.0)));
        assert!(segment_hits_footprint(&rect, DVec2::new(1.0, 0.5), DVec2::new(2.0, 1.5)));
        assert!(!segment_hits_footprint(&rect, DVec2::new(-1.0, 3.0), DVec2::new(5.0, 3.0)));
        // along an edge
        assert!(!segment_hits_footprint(&rect, DVec2::new(-1.0, 2.0), DVec2::new(5.0, 2.0)));
        // diagonal missing the corner
        assert!(!segment_hits_footprint(&rect, DVec2::new(3.0, 4.0), DVec2::new(6.0, 1.0)));
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let rect = anchored_rect(DVec2::ZERO, 4.0, 2.0, 0.0);
        let inside = DVec2::new(1.0, 1.0);
        let outside = DVec2::new(9.0, 1.0);
        assert!(segment_hits_footprint(&rect, inside, inside));
        assert!(!segment_hits_footprint(&rect, outside, outside));
    }
}
