// synthetic city used when no scene file is given
// voronoi cells of relaxed spiral points become the city regions

use bevy::math::DVec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::config::*;
use crate::systems::city::poly::point_gen::{frame_generators, pgen, prelax};
use crate::systems::city::poly::voronoi::vpoly;
use crate::systems::city::profile::ProfileTable;
use super::{RegionSpec, SceneData};

/// Builds a demo scene of `DEMO_GENERATOR_COUNT`-ish regions inside a square
/// city of side `DEMO_CITY_SIZE` centred on the origin
///
/// # Returns
/// A scene whose region ids are profile names with a running number
/// ("Market 2"), plus `DEMO_PARK_COUNT` regions flagged as parks
pub fn demo_scene(seed: u64, tables: &ProfileTable) -> SceneData {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = DEMO_CITY_SIZE * 0.5;

    let regular = pgen(DEMO_GENERATOR_COUNT, half, DEMO_SPIRAL_SPREAD, &mut rng);
    let frame = frame_generators(half, DEMO_FRAME_SPACING);
    let relaxed = prelax(regular, &frame, DEMO_RELAX_STEPS, half);

    let city = vec![
        DVec2::new(-half, -half),
        DVec2::new(half, -half),
        DVec2::new(half, half),
        DVec2::new(-half, half),
    ];
    let cells: Vec<_> = vpoly(&relaxed, &city).into_iter().map(|(_, cell)| cell).collect();

    // hashmap order is random, sort for reproducible draws
    let mut names: Vec<&str> = tables.regions.keys().map(String::as_str).collect();
    names.sort_unstable();

    let mut parks: Vec<usize> = (0..cells.len()).collect();
    parks.shuffle(&mut rng);
    parks.truncate(if names.is_empty() { cells.len() } else { DEMO_PARK_COUNT });

    let mut counters = vec![0usize; names.len()];
    let mut park_count = 0;
    let city_shapes = cells
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            if parks.contains(&i) {
                park_count += 1;
                RegionSpec::new(format!("Park {park_count}"), cell).excluding_buildings()
            } else {
                let k = rng.random_range(0..names.len());
                counters[k] += 1;
                RegionSpec::new(format!("{} {}", names[k], counters[k]), cell)
            }
        })
        .collect();

    SceneData { city_shapes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::city::poly::utils::polygon_area;

    #[test]
    fn demo_regions_are_usable() {
        let tables = ProfileTable::default();
        let scene = demo_scene(INITIAL_SEED, &tables);

        assert!(scene.len() >= DEMO_GENERATOR_COUNT / 2, "only {} regions", scene.len());
        let parks = scene.city_shapes.iter().filter(|r| r.exclude_buildings).count();
        assert_eq!(parks, DEMO_PARK_COUNT);

        let half = DEMO_CITY_SIZE * 0.5;
        for region in &scene.city_shapes {
            assert!(polygon_area(&region.polygon) > 0.0, "{} is degenerate", region.id);
            if !region.exclude_buildings {
                assert!(tables.resolve(region.profile_name()).is_ok(), "{}", region.id);
            }
            for p in &region.polygon {
                assert!(
                    p.x.abs() <= half + 1e-9 && p.y.abs() <= half + 1e-9,
                    "{} reaches {:?}", region.id, p
                );
            }
        }
    }

    #[test]
    fn demo_scene_is_seeded() {
        let tables = ProfileTable::default();
        assert_eq!(demo_scene(5, &tables), demo_scene(5, &tables));
        assert_ne!(demo_scene(5, &tables), demo_scene(6, &tables));
    }

    #[test]
    fn empty_table_gives_only_parks() {
        let tables = ProfileTable { regions: Default::default(), buildings: Default::default() };
        let scene = demo_scene(3, &tables);
        assert!(!scene.is_empty());
        assert!(scene.city_shapes.iter().all(|r| r.exclude_buildings));
    }
}
