// this is the entry point for the city generation plugin
use std::path::PathBuf;

use bevy::math::DVec2;
use bevy::prelude::*;

use crate::config::*;
use crate::systems::export::{handle_export, ExportEvent};

pub mod orchestrator;
pub mod placement;
pub mod poly;
pub mod profile;
pub mod scene;
pub mod town;

use orchestrator::{CityReport, CollisionScope};
use profile::ProfileTable;
use scene::SceneData;

// my 2d polygon datatype
// closed ring, the last vertex connects back to the first
pub type Polygon = Vec<DVec2>;

// resources
#[derive(Resource)]
pub struct Seed(pub u64);

impl Default for Seed {
    fn default() -> Self {
        Self(INITIAL_SEED)
    }
}

// city generation parameters
#[derive(Resource, Debug, Clone)]
pub struct CityParams {
    pub scope: CollisionScope,
    pub building_output: PathBuf,
    pub roads_output: Option<PathBuf>,
    pub export_on_startup: bool, // write the export right after the first generation
}

impl Default for CityParams {
    fn default() -> Self {
        Self {
            scope: CollisionScope::default(),
            building_output: PathBuf::from(BUILDING_OUTPUT),
            roads_output: None,
            export_on_startup: false,
        }
    }
}

impl CityParams {
    pub fn export_event(&self) -> ExportEvent {
        ExportEvent {
            buildings: self.building_output.clone(),
            roads: self.roads_output.clone(),
        }
    }
}

// latest generation result
#[derive(Resource, Default)]
pub struct CityLayout {
    pub seed: u64,
    pub report: CityReport,
}

// Event for regeneration
#[derive(Event)]
pub struct RegenerateEvent {
    pub seed: u64,
}

// main plugin for generation
// resources inserted before the plugin is added are kept
pub struct CityGenerationPlugin;

impl Plugin for CityGenerationPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<Seed>()
            .init_resource::<CityParams>()
            .init_resource::<ProfileTable>()
            .init_resource::<SceneData>()
            .init_resource::<CityLayout>()

            .add_event::<RegenerateEvent>()
            .add_event::<ExportEvent>()

            .add_systems(Startup, town::generate_on_startup)
            .add_systems(Update, (town::handle_regeneration, handle_export).chain());
    }
}
