// prelude via super, Polygon there is the local alias
use super::*;
use crate::systems::city::orchestrator::generate_city;
use crate::systems::city::placement::Building;

// entity hierarchy components
#[derive(Component)]
pub struct City {
    pub seed: u64,
}

#[derive(Component, Clone)]
pub struct Region {
    pub id: String,
    pub profile: Option<String>,
    pub polygon: Polygon,
    pub junctions: usize,
    pub roads: usize,
}

/// Spawns a `City` entity with one `Region` child per generated region and
/// the region's buildings as grandchildren.
pub fn spawn_city(commands: &mut Commands, layout: &CityLayout) -> Entity {
    let city_entity = commands.spawn(City { seed: layout.seed }).id();

    for region in &layout.report.regions {
        let region_entity = commands
            .spawn(Region {
                id: region.id.clone(),
                profile: region.profile.clone(),
                polygon: region.polygon.clone(),
                junctions: region.graph.len(),
                roads: region.graph.edge_count(),
            })
            .id();
        commands.entity(city_entity).add_children(&[region_entity]);

        let building_entities: Vec<Entity> = region
            .buildings
            .iter()
            .map(|building| commands.spawn(building.clone()).id())
            .collect();

        // add building entities as children of region entity
        commands.entity(region_entity).add_children(&building_entities);
    }

    city_entity
}

fn regenerate(
    commands: &mut Commands,
    seed: u64,
    params: &CityParams,
    tables: &ProfileTable,
    scene: &SceneData,
    layout: &mut CityLayout,
) {
    layout.seed = seed;
    layout.report = generate_city(scene, tables, params.scope, seed);
    spawn_city(commands, layout);
}

pub fn generate_on_startup(
    mut commands: Commands,
    seed: Res<Seed>,
    params: Res<CityParams>,
    tables: Res<ProfileTable>,
    scene: Res<SceneData>,
    mut layout: ResMut<CityLayout>,
    mut exports: EventWriter<ExportEvent>,
) {
    if scene.is_empty() {
        warn!("scene has no regions, nothing to generate");
    }
    regenerate(&mut commands, seed.0, &params, &tables, &scene, &mut layout);

    if params.export_on_startup {
        exports.write(params.export_event());
    }
}

pub fn handle_regeneration(
    mut commands: Commands,
    mut events: EventReader<RegenerateEvent>,
    mut seed: ResMut<Seed>,
    params: Res<CityParams>,
    tables: Res<ProfileTable>,
    scene: Res<SceneData>,
    mut layout: ResMut<CityLayout>,
    query: Query<Entity, With<City>>,
) {
    // only the latest request matters
    let Some(event) = events.read().last() else {
        return;
    };

    // cleanup existing city, children go with it
    for entity in query.iter() {
        commands.entity(entity).try_despawn();
    }

    seed.0 = event.seed;
    info!("regenerating city with seed {}", event.seed);
    regenerate(&mut commands, event.seed, &params, &tables, &scene, &mut layout);
}
