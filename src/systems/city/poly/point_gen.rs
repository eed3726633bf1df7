// handles point generation logic for synthetic scenes

use bevy::math::DVec2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::utils::{polygon_area, polygon_centroid};
use super::voronoi::voronoi_cells;

// golden angle in radians, spreads spiral points evenly
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
const JITTER: f64 = 0.15; // standard deviation as a share of the spread

// generates points in a sunflower spiral around (0,0)
// every point stays inside the square [-half_extent, half_extent]^2
pub fn pgen<R: Rng + ?Sized>(
    num_points: usize,
    half_extent: f64,
    spread: f64,
    rng: &mut R,
) -> Vec<DVec2> {
    let jitter = Normal::new(0.0, spread * JITTER).ok();
    let mut points = Vec::with_capacity(num_points);

    for i in 0..num_points {
        let t = i as f64 + 0.5;
        let angle = t * GOLDEN_ANGLE;
        let radius = spread * t.sqrt();
        let mut p = DVec2::from_angle(angle) * radius;
        if let Some(normal) = &jitter {
            p += DVec2::new(normal.sample(rng), normal.sample(rng));
        }
        points.push(p.clamp(DVec2::splat(-half_extent), DVec2::splat(half_extent)));
    }

    points
}

// fixed generators on a square frame around the city
// they close the cells of the outermost regular points
pub fn frame_generators(half_extent: f64, spacing: f64) -> Vec<DVec2> {
    let side = 2.0 * half_extent;
    let count = (side / spacing).ceil().max(1.0) as usize;
    let step = side / count as f64;
    let corners = [
        DVec2::new(-half_extent, -half_extent),
        DVec2::new(half_extent, -half_extent),
        DVec2::new(half_extent, half_extent),
        DVec2::new(-half_extent, half_extent),
    ];

    let mut generators = Vec::with_capacity(4 * count);
    for k in 0..4 {
        let start = corners[k];
        let dir = (corners[(k + 1) % 4] - start) / side;
        // push the frame outwards so its cells end on the city edge
        let outward = -dir.perp();
        for j in 0..count {
            generators.push(start + dir * (j as f64 * step) + outward * step * 0.5);
        }
    }
    generators
}

// lloyd's relaxation, fixed points act as generators but never move
pub fn prelax(
    regular_points: Vec<DVec2>,
    fixed_points: &[DVec2],
    steps: usize,
    half_extent: f64,
) -> Vec<DVec2> {
    let mut regular_points = regular_points;
    let bound = DVec2::splat(half_extent);

    for _ in 0..steps {
        let mut all_points = regular_points.clone();
        all_points.extend_from_slice(fixed_points);
        let cells = voronoi_cells(&all_points);

        // move each regular point to its cell centroid
        for (point, cell) in regular_points.iter_mut().zip(cells) {
            let Some(cell) = cell else { continue };
            let area = polygon_area(&cell);
            if area.abs() > f64::EPSILON {
                *point = polygon_centroid(&cell, area).clamp(-bound, bound);
            }
        }
    }

    regular_points
}
