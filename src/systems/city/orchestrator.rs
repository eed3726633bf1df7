// drives road graph construction and building placement over every region

use bevy::log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::CityGenError;
use crate::systems::city::Polygon;
use crate::systems::city::placement::{place_building, Building, FilledSpace, PlacementRequest};
use crate::systems::city::poly::graph::{build_for_policy, RoadGraph, RoadNetwork};
use crate::systems::city::profile::{ProfileTable, RegionProfile};
use crate::systems::city::scene::{RegionSpec, SceneData};

/// Which roads a building has to stay clear of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionScope {
    /// roads of the building's own region
    #[default]
    Region,
    /// roads of every region in the city
    City,
}

/// Result of one region.
#[derive(Debug, Clone)]
pub struct RegionLayout {
    pub id: String,
    pub polygon: Polygon,
    pub profile: Option<String>, // resolved profile key, none for excluded regions
    pub graph: RoadGraph,
    pub buildings: Vec<Building>,
    pub pitch: f64,
    pub bare_chords: usize,
}

/// A region that could not be generated.
#[derive(Debug)]
pub struct RegionFailure {
    pub id: String,
    pub error: CityGenError,
}

/// Everything a city run produced.
#[derive(Debug, Default)]
pub struct CityReport {
    pub regions: Vec<RegionLayout>,
    pub failures: Vec<RegionFailure>,
    pub road_network: RoadNetwork, // merged over all generated regions
}

impl CityReport {
    pub fn buildings(&self) -> impl Iterator<Item = &Building> + '_ {
        self.regions.iter().flat_map(|r| r.buildings.iter())
    }

    pub fn building_count(&self) -> usize {
        self.regions.iter().map(|r| r.buildings.len()).sum()
    }
}

// a region whose graph is built and waits for placement
struct Prepared<'a> {
    index: usize,
    spec: &'a RegionSpec,
    profile: Option<(String, &'a RegionProfile)>,
    graph: RoadGraph,
    network: RoadNetwork,
    pitch: f64,
    bare_chords: usize,
}

fn prepare_region<'a>(
    index: usize,
    spec: &'a RegionSpec,
    tables: &'a ProfileTable,
) -> Result<Prepared<'a>, CityGenError> {
    if spec.exclude_buildings {
        return Ok(Prepared {
            index,
            spec,
            profile: None,
            graph: RoadGraph::default(),
            network: RoadNetwork::default(),
            pitch: 0.0,
            bare_chords: 0,
        });
    }

    let (key, profile) = tables.resolve(spec.profile_name())?;
    profile.validate(key, &tables.buildings)?;

    let build = build_for_policy(&spec.polygon, profile.pitch, profile.chord_policy, profile.density_retry)?;
    if build.bare_chords > 0 {
        debug!("{}: skipped {} bare chords", spec.id, build.bare_chords);
    }
    let network = build.graph.to_network();

    Ok(Prepared {
        index,
        spec,
        profile: Some((key.to_string(), profile)),
        graph: build.graph,
        network,
        pitch: build.pitch,
        bare_chords: build.bare_chords,
    })
}

fn fill_region(
    prepared: &Prepared,
    profile: &RegionProfile,
    key: &str,
    tables: &ProfileTable,
    roads: &RoadNetwork,
    seed: u64,
) -> Result<Vec<Building>, CityGenError> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(prepared.index as u64));
    let mix = profile.mix_sampler(key)?;
    let mut filled = FilledSpace::default();
    let mut buildings = Vec::new();

    for _ in 0..profile.fill_attempts {
        let kind = mix.draw(&mut rng);
        let request = PlacementRequest {
            kind,
            region: &prepared.spec.polygon,
            style: tables.style(kind)?,
            attempts: profile.placement_attempts,
        };
        if let Some(building) = place_building(&request, &mut filled, roads, &mut rng)? {
            buildings.push(building);
        }
    }

    Ok(buildings)
}

/// Generates road graphs and buildings for every region of a scene
///
/// Graphs are built for all regions first so that `CollisionScope::City` can
/// test buildings against the merged network. Each region draws from its own
/// generator seeded with `seed + region index`.
///
/// # Returns
/// A report with one layout per successful region and one failure per region
/// that could not be generated; a failing region never stops the others
pub fn generate_city(
    scene: &SceneData,
    tables: &ProfileTable,
    scope: CollisionScope,
    seed: u64,
) -> CityReport {
    let mut report = CityReport::default();
    let mut prepared = Vec::with_capacity(scene.len());

    for (index, spec) in scene.city_shapes.iter().enumerate() {
        match prepare_region(index, spec, tables) {
            Ok(region) => {
                report.road_network.extend(&region.network);
                prepared.push(region);
            }
            Err(error) => {
                warn!("region {} failed: {}", spec.id, error);
                report.failures.push(RegionFailure { id: spec.id.clone(), error });
            }
        }
    }

    for region in prepared {
        let buildings = match &region.profile {
            None => Ok(Vec::new()),
            Some((key, profile)) => {
                let roads = match scope {
                    CollisionScope::Region => &region.network,
                    CollisionScope::City => &report.road_network,
                };
                fill_region(&region, profile, key, tables, roads, seed)
            }
        };

        match buildings {
            Ok(buildings) => {
                info!(
                    "{}: {} junctions, {} roads, {} buildings",
                    region.spec.id,
                    region.graph.len(),
                    region.network.len(),
                    buildings.len()
                );
                report.regions.push(RegionLayout {
                    id: region.spec.id.clone(),
                    polygon: region.spec.polygon.clone(),
                    profile: region.profile.as_ref().map(|(key, _)| key.clone()),
                    graph: region.graph,
                    buildings,
                    pitch: region.pitch,
                    bare_chords: region.bare_chords,
                });
            }
            Err(error) => {
                warn!("region {} failed: {}", region.spec.id, error);
                report.failures.push(RegionFailure { id: region.spec.id.clone(), error });
            }
        }
    }

    info!(
        "city generated: {} regions, {} failed, {} buildings",
        report.regions.len(),
        report.failures.len(),
        report.building_count()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::city::poly::collision::footprints_overlap;
    use crate::systems::city::poly::graph::ChordPolicy;
    use crate::systems::city::poly::utils::polygon_contains_polygon;
    use bevy::math::DVec2;

    fn square(origin: DVec2, side: f64) -> Vec<DVec2> {
        vec![
            origin,
            origin + DVec2::new(side, 0.0),
            origin + DVec2::new(side, side),
            origin + DVec2::new(0.0, side),
        ]
    }

    fn two_block_scene() -> SceneData {
        SceneData {
            city_shapes: vec![
                RegionSpec::new("Residential 1", square(DVec2::ZERO, 40.0)),
                RegionSpec::new("Market", square(DVec2::new(40.0, 0.0), 40.0)),
            ],
        }
    }

    #[test]
    fn every_region_gets_roads_and_buildings() {
        let scene = two_block_scene();
        let report = generate_city(&scene, &ProfileTable::default(), CollisionScope::Region, 5);

        assert!(report.failures.is_empty());
        assert_eq!(report.regions.len(), 2);
        assert_eq!(report.regions[0].profile.as_deref(), Some("Residential"));
        for (layout, spec) in report.regions.iter().zip(&scene.city_shapes) {
            assert!(!layout.graph.is_empty());
            assert!(!layout.buildings.is_empty());
            for b in &layout.buildings {
                assert!(polygon_contains_polygon(&spec.polygon, &b.footprint));
            }
        }
        let total: usize = report.regions.iter().map(|r| r.graph.edge_count()).sum();
        assert_eq!(report.road_network.len(), total);
    }

    #[test]
    fn same_seed_reproduces_the_city() {
        let scene = two_block_scene();
        let tables = ProfileTable::default();
        let a = generate_city(&scene, &tables, CollisionScope::Region, 77);
        let b = generate_city(&scene, &tables, CollisionScope::Region, 77);
        let left: Vec<_> = a.buildings().collect();
        let right: Vec<_> = b.buildings().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn failures_do_not_stop_other_regions() {
        let mut scene = two_block_scene();
        scene.city_shapes.insert(0, RegionSpec::new("Harbour", square(DVec2::new(0.0, 50.0), 10.0)));
        let report = generate_city(&scene, &ProfileTable::default(), CollisionScope::Region, 1);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "Harbour");
        assert!(matches!(report.failures[0].error, CityGenError::UnknownProfile(_)));
        assert_eq!(report.regions.len(), 2);
    }

    #[test]
    fn excluded_regions_stay_empty() {
        let mut scene = two_block_scene();
        scene.city_shapes[1] = scene.city_shapes[1].clone().excluding_buildings();
        let report = generate_city(&scene, &ProfileTable::default(), CollisionScope::Region, 3);

        assert!(report.failures.is_empty());
        let park = &report.regions[1];
        assert!(park.buildings.is_empty());
        assert!(park.graph.is_empty());
        assert!(park.profile.is_none());
    }

    #[test]
    fn explicit_profile_overrides_the_id() {
        let scene = SceneData {
            city_shapes: vec![RegionSpec::new("Docks", square(DVec2::ZERO, 30.0)).with_profile("Industrial")],
        };
        let report = generate_city(&scene, &ProfileTable::default(), CollisionScope::Region, 2);
        assert_eq!(report.regions[0].profile.as_deref(), Some("Industrial"));
        assert_eq!(report.regions[0].pitch, 12.0);
    }

    #[test]
    fn city_scope_avoids_neighbouring_roads() {
        // the second block overlaps the first, so its roads run through the first
        let scene = SceneData {
            city_shapes: vec![
                RegionSpec::new("Residential", square(DVec2::ZERO, 40.0)),
                RegionSpec::new("Residential", square(DVec2::new(20.0, 0.0), 40.0)),
            ],
        };
        let report = generate_city(&scene, &ProfileTable::default(), CollisionScope::City, 4);
        for b in report.buildings() {
            assert!(!report.road_network.intersects_footprint(&b.footprint));
        }
    }

    #[test]
    fn buildings_in_a_region_never_overlap() {
        let report = generate_city(&two_block_scene(), &ProfileTable::default(), CollisionScope::Region, 8);
        for layout in &report.regions {
            for (i, a) in layout.buildings.iter().enumerate() {
                for b in &layout.buildings[i + 1..] {
                    assert!(!footprints_overlap(&a.footprint, &b.footprint));
                }
            }
        }
    }

    #[test]
    fn too_fine_a_pitch_only_fails_its_region() {
        let mut tables = ProfileTable::default();
        tables.regions.get_mut("Market").unwrap().pitch = 1e-6;
        let report = generate_city(&two_block_scene(), &tables, CollisionScope::Region, 6);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "Market");
        assert!(matches!(report.failures[0].error, CityGenError::LatticeTooLarge { .. }));
        assert_eq!(report.regions.len(), 1);
        assert!(!report.regions[0].buildings.is_empty());
    }

    #[test]
    fn retry_exhaustion_is_a_region_failure() {
        let mut tables = ProfileTable::default();
        let sliver_profile = tables.regions.get_mut("Market").unwrap();
        sliver_profile.chord_policy = ChordPolicy::Retry;
        sliver_profile.density_retry.max_attempts = 2;

        let sliver = vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0), DVec2::new(0.0, 0.5)];
        let scene = SceneData { city_shapes: vec![RegionSpec::new("Market", sliver)] };
        let report = generate_city(&scene, &tables, CollisionScope::Region, 0);
        assert!(report.regions.is_empty());
        assert!(matches!(
            report.failures[0].error,
            CityGenError::DensityRetryExhausted { attempts: 2, .. }
        ));
    }
}
