// boundary stitching: caps every interior run of a sample line with junctions
// where the line enters and leaves the polygon

use bevy::math::DVec2;

use crate::config::GEOMETRY_EPSILON;
use super::grid::{InteriorSet, Lattice};
use super::utils::point_strictly_inside;

/// Orientation of a sample line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    Vertical,   // x = const, runs along y
    Horizontal, // y = const, runs along x
}

impl LineAxis {
    fn point(self, fixed: f64, along: f64) -> DVec2 {
        match self {
            LineAxis::Vertical => DVec2::new(fixed, along),
            LineAxis::Horizontal => DVec2::new(along, fixed),
        }
    }

    // (fixed, along) coordinates of a point
    fn split(self, p: DVec2) -> (f64, f64) {
        match self {
            LineAxis::Vertical => (p.x, p.y),
            LineAxis::Horizontal => (p.y, p.x),
        }
    }
}

/// A maximal interval of a sample line lying inside the polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    pub near: DVec2,  // lower coordinate along the line
    pub far: DVec2,
}

/// Boundary junctions and their links to interior nodes.
#[derive(Debug, Clone, Default)]
pub struct Stitching {
    pub nodes: Vec<DVec2>,
    pub links: Vec<(usize, usize)>, // (interior index, boundary index)
    pub bare_chords: usize,         // chords without any bracketed interior node
}

impl Stitching {
    /// Index of the boundary node at `point`, registering it if new.
    fn node_at(&mut self, point: DVec2) -> usize {
        if let Some(existing) = self
            .nodes
            .iter()
            .position(|n| n.distance(point) <= GEOMETRY_EPSILON)
        {
            return existing;
        }
        self.nodes.push(point);
        self.nodes.len() - 1
    }

    fn link(&mut self, interior: usize, boundary: usize) {
        if !self.links.contains(&(interior, boundary)) {
            self.links.push((interior, boundary));
        }
    }
}

/// Intersects the line `axis` at `fixed` with the polygon
///
/// # Returns
/// The chords in ascending order along the line. Lines that only touch the
/// boundary (at a vertex, or along an edge) give no chord.
pub fn line_chords(polygon: &[DVec2], axis: LineAxis, fixed: f64) -> Vec<Chord> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    // coordinates along the line where it meets the boundary
    let mut crossings = Vec::new();
    let n = polygon.len();
    for i in 0..n {
        let (af, aa) = axis.split(polygon[i]);
        let (bf, ba) = axis.split(polygon[(i + 1) % n]);

        if (af - fixed).abs() <= GEOMETRY_EPSILON && (bf - fixed).abs() <= GEOMETRY_EPSILON {
            // edge runs along the line
            crossings.push(aa);
            crossings.push(ba);
        } else if fixed >= af.min(bf) - GEOMETRY_EPSILON && fixed <= af.max(bf) + GEOMETRY_EPSILON {
            let t = ((fixed - af) / (bf - af)).clamp(0.0, 1.0);
            crossings.push(aa + (ba - aa) * t);
        }
    }

    crossings.sort_by(f64::total_cmp);
    crossings.dedup_by(|a, b| (*a - *b).abs() <= GEOMETRY_EPSILON);

    // keep the gaps whose midpoint is inside, merging touching gaps
    let mut chords: Vec<(f64, f64)> = Vec::new();
    for pair in crossings.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if !point_strictly_inside(axis.point(fixed, (lo + hi) * 0.5), polygon) {
            continue;
        }
        match chords.last_mut() {
            Some(last) if (last.1 - lo).abs() <= GEOMETRY_EPSILON => last.1 = hi,
            _ => chords.push((lo, hi)),
        }
    }

    chords
        .into_iter()
        .map(|(lo, hi)| Chord {
            near: axis.point(fixed, lo),
            far: axis.point(fixed, hi),
        })
        .collect()
}

/// Stitches one sample line: registers its chord endpoints and links them to
/// the extreme interior nodes on the line.
///
/// `on_line` lists the interior indices lying on this line, in ascending
/// order along it.
fn stitch_line(
    stitching: &mut Stitching,
    polygon: &[DVec2],
    interior: &InteriorSet,
    axis: LineAxis,
    fixed: f64,
    on_line: &[usize],
) {
    for chord in line_chords(polygon, axis, fixed) {
        let near = stitching.node_at(chord.near);
        let far = stitching.node_at(chord.far);

        let (_, lo) = axis.split(chord.near);
        let (_, hi) = axis.split(chord.far);
        let mut bracketed = on_line.iter().copied().filter(|&i| {
            let (_, along) = axis.split(interior.points[i]);
            along > lo && along < hi
        });

        // runs are sorted along the line: first is the min, last the max
        let Some(first) = bracketed.next() else {
            stitching.bare_chords += 1;
            continue;
        };
        let last = bracketed.last().unwrap_or(first);

        stitching.link(first, near);
        stitching.link(last, far);
    }
}

/// Intersects every sample line of the lattice with the polygon boundary
///
/// # Returns
/// Deduplicated boundary nodes, their links to interior nodes, and the
/// number of bare chords that were skipped for linking
pub fn stitch_boundary(lattice: &Lattice, interior: &InteriorSet, polygon: &[DVec2]) -> Stitching {
    let mut stitching = Stitching::default();

    // interior indices per column / row; kept in lattice order, so each list
    // is already ascending along its line
    let mut by_col = vec![Vec::new(); lattice.cols()];
    let mut by_row = vec![Vec::new(); lattice.rows()];
    for (i, &(row, col)) in interior.cells.iter().enumerate() {
        by_col[col].push(i);
        by_row[row].push(i);
    }

    for (col, &x) in lattice.xs.iter().enumerate() {
        stitch_line(&mut stitching, polygon, interior, LineAxis::Vertical, x, &by_col[col]);
    }
    for (row, &y) in lattice.ys.iter().enumerate() {
        stitch_line(&mut stitching, polygon, interior, LineAxis::Horizontal, y, &by_row[row]);
    }

    stitching
}
