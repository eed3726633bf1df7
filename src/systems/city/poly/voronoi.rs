use bevy::math::DVec2;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, LastUsedVertexHintGenerator, Point2, Triangulation as _};

use crate::config::GEOMETRY_EPSILON;
use crate::systems::city::Polygon;
use super::utils::{calculate_circumcenter, clip_to_convex, point_strictly_inside, polygon_area};

type Delaunay = DelaunayTriangulation<Point2<f64>, (), (), (), LastUsedVertexHintGenerator>;

/// Closed Voronoi cell of every generator
///
/// # Returns
/// One entry per generator, in input order. `None` for generators on the
/// convex hull (their cell is unbounded) and for duplicates of an earlier
/// generator.
pub fn voronoi_cells(generators: &[DVec2]) -> Vec<Option<Polygon>> {
    let mut triangulation = Delaunay::new();
    let mut handles: Vec<Option<FixedVertexHandle>> = Vec::with_capacity(generators.len());
    let mut seen = Vec::new();

    for p in generators {
        let handle = triangulation.insert(Point2::new(p.x, p.y)).ok();
        // spade merges duplicates into the existing vertex
        let handle = handle.filter(|h| !seen.contains(h));
        if let Some(h) = handle {
            seen.push(h);
        }
        handles.push(handle);
    }

    handles
        .iter()
        .zip(generators)
        .map(|(handle, &generator)| {
            let vertex = triangulation.vertex((*handle)?);
            let mut cell: Polygon = Vec::new();
            for edge in vertex.out_edges() {
                // an outer face means the cell is open
                let face = edge.face().as_inner()?;
                let [a, b, c] = face.vertices();
                cell.push(calculate_circumcenter(a.position(), b.position(), c.position()));
            }
            if cell.len() < 3 {
                return None;
            }

            // sort circumcenters by angle around generator
            cell.sort_by(|a, b| {
                let angle_a = (*a - generator).to_angle();
                let angle_b = (*b - generator).to_angle();
                angle_a.total_cmp(&angle_b)
            });
            // cocircular generators share a circumcenter
            cell.dedup_by(|a, b| a.distance(*b) <= GEOMETRY_EPSILON);
            if cell.len() > 1 && cell[0].distance(cell[cell.len() - 1]) <= GEOMETRY_EPSILON {
                cell.pop();
            }
            (cell.len() >= 3).then_some(cell)
        })
        .collect()
}

/// Voronoi cells of the generators strictly inside the convex `boundary`,
/// cut back to the boundary.
///
/// # Returns
/// `(generator index, cell)` pairs with counter-clockwise, non-degenerate cells
pub fn vpoly(generators: &[DVec2], boundary: &[DVec2]) -> Vec<(usize, Polygon)> {
    voronoi_cells(generators)
        .into_iter()
        .enumerate()
        .filter(|(i, _)| point_strictly_inside(generators[*i], boundary))
        .filter_map(|(i, cell)| cell.map(|cell| (i, clip_to_convex(&cell, boundary))))
        .filter(|(_, cell)| polygon_area(cell) > f64::EPSILON)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::city::poly::utils::point_covered;

    fn lattice(n: usize, step: f64) -> Vec<DVec2> {
        (0..n)
            .flat_map(|i| (0..n).map(move |j| DVec2::new(i as f64 * step, j as f64 * step)))
            .collect()
    }

    #[test]
    fn hull_generators_have_no_cell() {
        // jittered 3x3 block, only the middle one is enclosed
        let mut points = lattice(3, 10.0);
        points[4] += DVec2::new(0.3, -0.2);
        let cells = voronoi_cells(&points);
        assert_eq!(cells.len(), 9);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.is_some(), i == 4, "generator {i}");
        }
        let cell = cells[4].as_ref().unwrap();
        assert!(polygon_area(cell) > 0.0);
        assert!(point_strictly_inside(points[4], cell));
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut points = lattice(3, 10.0);
        points[4] += DVec2::new(0.1, 0.4);
        points.push(points[4]);
        let cells = voronoi_cells(&points);
        assert!(cells[4].is_some());
        assert!(cells[9].is_none());
    }

    #[test]
    fn cells_outside_the_boundary_are_skipped() {
        let points: Vec<DVec2> = lattice(5, 10.0)
            .into_iter()
            .enumerate()
            .map(|(i, p)| p + DVec2::new((i % 3) as f64 * 0.2, (i % 2) as f64 * 0.3))
            .collect();
        let boundary = vec![
            DVec2::new(5.0, 5.0),
            DVec2::new(25.0, 5.0),
            DVec2::new(25.0, 16.0),
            DVec2::new(5.0, 16.0),
        ];
        let cells = vpoly(&points, &boundary);
        assert!(!cells.is_empty());
        for (i, cell) in &cells {
            assert!(point_strictly_inside(points[*i], &boundary));
            assert!(polygon_area(cell) > 0.0);
            for p in cell {
                assert!(point_covered(*p, &boundary), "{p:?} leaves the boundary");
            }
        }
    }
}
