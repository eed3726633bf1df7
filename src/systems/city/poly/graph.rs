// road graph assembly and its segment view

use bevy::log::debug;
use bevy::math::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::{DENSITY_RETRY_ATTEMPTS, DENSITY_RETRY_STEP};
use crate::error::CityGenError;
use super::collision::{segment_hits_footprint, Corners};
use super::grid::{filter_interior, sample_lattice, InteriorSet};
use super::stitch::{stitch_boundary, Stitching};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Interior, // lattice point strictly inside the polygon
    Boundary, // chord endpoint on the polygon boundary
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub position: DVec2,
    pub kind: NodeKind,
}

/// Junctions and roads of one region.
///
/// Interior nodes come first, boundary nodes after them. Adjacency is
/// symmetric, without self loops, and never joins two boundary nodes.
/// Built once and not mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadGraph {
    nodes: Vec<Node>,
    adjacency: Vec<Vec<usize>>,
}

impl RoadGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.adjacency.get(i).is_some_and(|list| list.contains(&j))
    }

    /// Every edge once, as `(i, j)` with `i < j`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(i, neighbors)| {
            neighbors.iter().copied().filter(move |&j| i < j).map(move |j| (i, j))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    fn link(&mut self, i: usize, j: usize) {
        if i != j && !self.adjacency[i].contains(&j) {
            self.adjacency[i].push(j);
            self.adjacency[j].push(i);
        }
    }

    /// Flattens the graph into line segments for collision queries.
    pub fn to_network(&self) -> RoadNetwork {
        RoadNetwork {
            segments: self
                .edges()
                .map(|(i, j)| Segment {
                    start: self.nodes[i].position,
                    end: self.nodes[j].position,
                })
                .collect(),
        }
    }
}

/// Merges the interior lattice and the boundary stitching into one graph.
pub fn assemble(interior: &InteriorSet, stitching: &Stitching) -> RoadGraph {
    let offset = interior.len();

    let nodes = interior
        .points
        .iter()
        .map(|&position| Node { position, kind: NodeKind::Interior })
        .chain(
            stitching
                .nodes
                .iter()
                .map(|&position| Node { position, kind: NodeKind::Boundary }),
        )
        .collect::<Vec<_>>();

    let mut graph = RoadGraph {
        adjacency: vec![Vec::new(); nodes.len()],
        nodes,
    };

    for (i, neighbors) in interior.adjacency.iter().enumerate() {
        for &j in neighbors {
            graph.link(i, j);
        }
    }
    for &(i, b) in &stitching.links {
        graph.link(i, offset + b);
    }

    graph
}

/// Graph construction outcome, with the number of skipped bare chords.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub graph: RoadGraph,
    pub bare_chords: usize,
    pub pitch: f64,
}

/// Builds the road graph of a polygon at the given pitch
///
/// # Returns
/// The graph; degenerate polygons give an empty graph, never an error
pub fn build_road_graph(polygon: &[DVec2], pitch: f64) -> Result<GraphBuild, CityGenError> {
    let lattice = sample_lattice(polygon, pitch)?;
    let interior = filter_interior(&lattice, polygon);
    let stitching = stitch_boundary(&lattice, &interior, polygon);

    Ok(GraphBuild {
        graph: assemble(&interior, &stitching),
        bare_chords: stitching.bare_chords,
        pitch,
    })
}

/// How a region treats chords that bracket no interior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordPolicy {
    /// keep the junctions, add no roads
    #[default]
    Skip,
    /// coarsen the pitch until no bare chord remains
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRetry {
    pub max_attempts: u32,
    pub pitch_step: f64,
}

impl Default for DensityRetry {
    fn default() -> Self {
        Self {
            max_attempts: DENSITY_RETRY_ATTEMPTS,
            pitch_step: DENSITY_RETRY_STEP,
        }
    }
}

/// Builds the road graph, growing the pitch while bare chords remain
///
/// # Returns
/// The first build without bare chords, or `DensityRetryExhausted` after
/// `retry.max_attempts` builds
pub fn build_with_density_retry(
    polygon: &[DVec2],
    pitch: f64,
    retry: DensityRetry,
) -> Result<GraphBuild, CityGenError> {
    let mut current = pitch;
    let mut last_pitch = pitch;
    for attempt in 0..retry.max_attempts {
        last_pitch = current;
        let build = build_road_graph(polygon, current)?;
        if build.bare_chords == 0 {
            return Ok(build);
        }
        debug!(
            "attempt {}: {} bare chords at pitch {:.2}",
            attempt + 1,
            build.bare_chords,
            current
        );
        current += retry.pitch_step;
    }

    Err(CityGenError::DensityRetryExhausted {
        attempts: retry.max_attempts,
        last_pitch,
    })
}

/// Builds a region graph according to its chord policy.
pub fn build_for_policy(
    polygon: &[DVec2],
    pitch: f64,
    policy: ChordPolicy,
    retry: DensityRetry,
) -> Result<GraphBuild, CityGenError> {
    match policy {
        ChordPolicy::Skip => build_road_graph(polygon, pitch),
        ChordPolicy::Retry => build_with_density_retry(polygon, pitch, retry),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
}

/// Segment view of one or more road graphs.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub segments: Vec<Segment>,
}

impl RoadNetwork {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Merges another network into this one.
    pub fn extend(&mut self, other: &RoadNetwork) {
        self.segments.extend_from_slice(&other.segments);
    }

    /// True if any road passes through the footprint interior.
    pub fn intersects_footprint(&self, corners: &Corners) -> bool {
        self.segments
            .iter()
            .any(|s| segment_hits_footprint(corners, s.start, s.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::city::poly::collision::anchored_rect;

    fn unit_square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn unit_square_is_a_star() {
        let build = build_road_graph(&unit_square(), 0.5).unwrap();
        let graph = build.graph;

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.nodes()[0].kind, NodeKind::Interior);
        assert_eq!(graph.nodes()[0].position, DVec2::new(0.5, 0.5));
        assert_eq!(graph.neighbors(0).len(), 4);
        for b in 1..5 {
            assert_eq!(graph.nodes()[b].kind, NodeKind::Boundary);
            assert_eq!(graph.neighbors(b), &[0]);
        }
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn network_has_one_segment_per_edge() {
        let square: Vec<DVec2> = unit_square().into_iter().map(|p| p * 10.0).collect();
        let graph = build_road_graph(&square, 1.0).unwrap().graph;
        let network = graph.to_network();
        assert_eq!(network.len(), graph.edge_count());
        for seg in &network.segments {
            assert!(seg.start.distance(seg.end) > 0.0);
        }
    }

    #[test]
    fn degenerate_polygon_gives_empty_graph() {
        let flat = vec![DVec2::new(0.0, 0.0), DVec2::new(5.0, 0.0), DVec2::new(10.0, 0.0)];
        let build = build_road_graph(&flat, 1.0).unwrap();
        assert!(build.graph.is_empty());
        assert!(build.graph.to_network().is_empty());

        let single = vec![DVec2::new(2.0, 2.0)];
        assert!(build_road_graph(&single, 1.0).unwrap().graph.is_empty());
    }

    #[test]
    fn invalid_pitch_is_rejected() {
        assert!(matches!(
            build_road_graph(&unit_square(), 0.0),
            Err(CityGenError::InvalidPitch(_))
        ));
        assert!(matches!(build_road_graph(&[], 1.0), Err(CityGenError::EmptyPolygon)));
    }

    #[test]
    fn retry_returns_first_clean_build() {
        let square: Vec<DVec2> = unit_square().into_iter().map(|p| p * 10.0).collect();
        let build = build_with_density_retry(&square, 1.0, DensityRetry::default()).unwrap();
        assert_eq!(build.pitch, 1.0);
        assert_eq!(build.bare_chords, 0);
    }

    #[test]
    fn retry_is_bounded() {
        // a thin triangle: the tip always produces a chord without lattice points
        let sliver = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 0.3),
        ];
        let retry = DensityRetry { max_attempts: 3, pitch_step: 0.1 };
        match build_with_density_retry(&sliver, 1.0, retry) {
            Err(CityGenError::DensityRetryExhausted { attempts, last_pitch }) => {
                assert_eq!(attempts, 3);
                assert!((last_pitch - 1.2).abs() < 1e-9);
            }
            other => panic!("expected retry exhaustion, got {other:?}"),
        }

        // skipping absorbs the same degeneracy
        let skipped = build_for_policy(&sliver, 1.0, ChordPolicy::Skip, retry).unwrap();
        assert!(skipped.bare_chords > 0);
    }

    #[test]
    fn zero_attempts_fail_immediately() {
        let retry = DensityRetry { max_attempts: 0, pitch_step: 0.1 };
        assert!(matches!(
            build_with_density_retry(&unit_square(), 0.5, retry),
            Err(CityGenError::DensityRetryExhausted { attempts: 0, .. })
        ));
    }

    #[test]
    fn footprint_query_against_network() {
        let square: Vec<DVec2> = unit_square().into_iter().map(|p| p * 4.0).collect();
        let network = build_road_graph(&square, 2.0).unwrap().graph.to_network();
        // roads run along x = 2 and y = 2
        let crossing = anchored_rect(DVec2::new(1.5, 0.5), 1.0, 1.0, 0.0);
        assert!(network.intersects_footprint(&crossing));
        let clear = anchored_rect(DVec2::new(0.5, 0.5), 1.0, 1.0, 0.0);
        assert!(!network.intersects_footprint(&clear));
    }

    #[test]
    fn merged_networks_keep_all_segments() {
        let a = build_road_graph(&unit_square(), 0.5).unwrap().graph.to_network();
        let mut merged = RoadNetwork::default();
        merged.extend(&a);
        merged.extend(&a);
        assert_eq!(merged.len(), 2 * a.len());
    }
}
