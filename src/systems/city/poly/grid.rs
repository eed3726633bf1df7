// lattice sampling of a region polygon

use bevy::math::DVec2;

use crate::config::MAX_LATTICE_POINTS;
use crate::error::CityGenError;
use super::utils::{bounding_box, point_strictly_inside};

/// Regular lattice over a polygon's bounding box.
///
/// Points are stored row-major: `index = row * cols + col`, rows ascend in y
/// and columns ascend in x.
#[derive(Debug, Clone)]
pub struct Lattice {
    pub xs: Vec<f64>,                // column coordinates (vertical sample lines)
    pub ys: Vec<f64>,                // row coordinates (horizontal sample lines)
    pub points: Vec<DVec2>,
    pub adjacency: Vec<Vec<usize>>,  // 4-connected, symmetric
}

impl Lattice {
    pub fn cols(&self) -> usize {
        self.xs.len()
    }

    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols() + col
    }
}

/// Lattice points strictly inside the polygon, with the induced adjacency.
#[derive(Debug, Clone, Default)]
pub struct InteriorSet {
    pub points: Vec<DVec2>,
    pub cells: Vec<(usize, usize)>,  // (row, col) of each kept point
    pub adjacency: Vec<Vec<usize>>,  // indices into `points`
}

impl InteriorSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// number of cells along one axis, saturating for huge ratios
fn axis_cells(lo: f64, hi: f64, pitch: f64) -> usize {
    (((hi - lo) / pitch).round() as usize).max(1)
}

/// Evenly spaced coordinates from `lo` to `hi` inclusive, one per cell edge.
fn sample_axis(lo: f64, hi: f64, cells: usize) -> Vec<f64> {
    let step = (hi - lo) / cells as f64;
    (0..=cells)
        .map(|i| if i == cells { hi } else { lo + step * i as f64 })
        .collect()
}

/// Lays a lattice over the polygon's bounding box at the given pitch
///
/// # Returns
/// The lattice with a base adjacency linking every point to its right and
/// next-row neighbour
pub fn sample_lattice(polygon: &[DVec2], pitch: f64) -> Result<Lattice, CityGenError> {
    if !(pitch.is_finite() && pitch > 0.0) {
        return Err(CityGenError::InvalidPitch(pitch));
    }
    let Some((min, max)) = bounding_box(polygon) else {
        return Err(CityGenError::EmptyPolygon);
    };

    // size check before anything is allocated
    let (cx, cy) = (axis_cells(min.x, max.x, pitch), axis_cells(min.y, max.y, pitch));
    let total = cx
        .checked_add(1)
        .zip(cy.checked_add(1))
        .and_then(|(c, r)| c.checked_mul(r));
    if total.is_none_or(|n| n > MAX_LATTICE_POINTS) {
        return Err(CityGenError::LatticeTooLarge { pitch, limit: MAX_LATTICE_POINTS });
    }

    let xs = sample_axis(min.x, max.x, cx);
    let ys = sample_axis(min.y, max.y, cy);
    let (rows, cols) = (ys.len(), xs.len());

    let mut points = Vec::with_capacity(rows * cols);
    for &y in &ys {
        for &x in &xs {
            points.push(DVec2::new(x, y));
        }
    }

    let mut adjacency = vec![Vec::new(); rows * cols];
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;

            // right neighbor
            if col + 1 < cols {
                adjacency[index].push(index + 1);
                adjacency[index + 1].push(index);
            }

            // bottom neighbor
            if row + 1 < rows {
                adjacency[index].push(index + cols);
                adjacency[index + cols].push(index);
            }
        }
    }

    Ok(Lattice { xs, ys, points, adjacency })
}

/// Keeps the lattice points strictly inside the polygon
///
/// # Returns
/// The kept points in lattice order and the adjacency restricted to them.
/// An empty set is a valid result.
pub fn filter_interior(lattice: &Lattice, polygon: &[DVec2]) -> InteriorSet {
    let mut remap = vec![None; lattice.points.len()];
    let mut interior = InteriorSet::default();

    for (index, &point) in lattice.points.iter().enumerate() {
        if point_strictly_inside(point, polygon) {
            remap[index] = Some(interior.points.len());
            interior.points.push(point);
            interior.cells.push((index / lattice.cols(), index % lattice.cols()));
        }
    }

    interior.adjacency = lattice
        .adjacency
        .iter()
        .enumerate()
        .filter(|(index, _)| remap[*index].is_some())
        .map(|(_, neighbors)| neighbors.iter().filter_map(|&n| remap[n]).collect())
        .collect();

    interior
}
