// scene description: the regions a city is generated from

use std::path::Path;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::CityGenError;
use crate::systems::city::Polygon;
use crate::systems::city::poly::utils::open_ring;

pub mod demo;

/// One region ("blob") of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpec {
    pub id: String,
    #[serde(rename = "outerPolygon")]
    pub polygon: Polygon,
    /// Profile name; falls back to the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Parks and other open spaces get no buildings.
    #[serde(default)]
    pub exclude_buildings: bool,
}

impl RegionSpec {
    pub fn new(id: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            polygon: open_ring(polygon),
            profile: None,
            exclude_buildings: false,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn excluding_buildings(mut self) -> Self {
        self.exclude_buildings = true;
        self
    }

    /// Name used for the profile lookup.
    pub fn profile_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(&self.id)
    }
}

/// The regions of a city, in generation order.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneData {
    pub city_shapes: Vec<RegionSpec>,
}

impl SceneData {
    pub fn load(path: &Path) -> Result<Self, CityGenError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses a scene document; closed rings are reopened.
    pub fn from_json(text: &str) -> Result<Self, CityGenError> {
        let mut scene: SceneData = serde_json::from_str(text)?;
        for region in &mut scene.city_shapes {
            region.polygon = open_ring(std::mem::take(&mut region.polygon));
        }
        Ok(scene)
    }

    pub fn len(&self) -> usize {
        self.city_shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.city_shapes.is_empty()
    }
}
