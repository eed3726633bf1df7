// region profiles and building styles
// both tables default to the tuned values in config.rs and can be replaced
// from a JSON document

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::Resource;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::config::{BUILDING_TABLE, DEFAULT_ROTATION_DEG, PLACEMENT_ATTEMPTS, REGION_TABLE};
use crate::error::CityGenError;
use crate::systems::city::poly::graph::{ChordPolicy, DensityRetry};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Static parameters of one region type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub pitch: f64,
    pub building_mix: Vec<(String, f64)>, // ordered (type, probability), sums to 1
    pub fill_attempts: u32,               // building draws per region
    #[serde(default = "default_placement_attempts")]
    pub placement_attempts: u32,          // rejection-sampling budget per building
    #[serde(default)]
    pub chord_policy: ChordPolicy,
    #[serde(default)]
    pub density_retry: DensityRetry,
}

fn default_placement_attempts() -> u32 {
    PLACEMENT_ATTEMPTS
}

/// Size and orientation range of one building type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingStyle {
    pub dimensions: (f64, f64), // (min, max) of both width and height
    #[serde(default = "default_rotation")]
    pub rotation_deg: (f64, f64),
}

fn default_rotation() -> (f64, f64) {
    DEFAULT_ROTATION_DEG
}

impl BuildingStyle {
    pub fn validate(&self, kind: &str) -> Result<(), CityGenError> {
        let (min, max) = self.dimensions;
        let (lo, hi) = self.rotation_deg;
        let reason = if !(min.is_finite() && max.is_finite()) || min <= 0.0 {
            Some("dimensions must be positive")
        } else if min > max {
            Some("dimension range is inverted")
        } else if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            Some("rotation range is inverted")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CityGenError::InvalidBuildingStyle {
                kind: kind.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl RegionProfile {
    pub fn validate(&self, id: &str, styles: &HashMap<String, BuildingStyle>) -> Result<(), CityGenError> {
        let invalid = |reason: String| CityGenError::InvalidProfile {
            id: id.to_string(),
            reason,
        };

        if !(self.pitch.is_finite() && self.pitch > 0.0) {
            return Err(invalid(format!("pitch {} must be positive", self.pitch)));
        }
        if self.building_mix.is_empty() {
            return Err(invalid("building mix is empty".to_string()));
        }
        if self.building_mix.iter().any(|(_, p)| !p.is_finite() || *p < 0.0) {
            return Err(invalid("probabilities must be non-negative".to_string()));
        }
        let total: f64 = self.building_mix.iter().map(|(_, p)| p).sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(format!("probabilities sum to {total}, not 1")));
        }
        if self.chord_policy == ChordPolicy::Retry && !(self.density_retry.pitch_step > 0.0) {
            return Err(invalid("density retry step must be positive".to_string()));
        }
        for (kind, _) in &self.building_mix {
            if !styles.contains_key(kind) {
                return Err(CityGenError::UnknownBuildingType(kind.clone()));
            }
        }
        Ok(())
    }

    /// Sampler over the building mix.
    pub fn mix_sampler(&self, id: &str) -> Result<BuildingMix<'_>, CityGenError> {
        let index = WeightedIndex::new(self.building_mix.iter().map(|(_, p)| *p)).map_err(|e| {
            CityGenError::InvalidProfile {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(BuildingMix { profile: self, index })
    }
}

/// Weighted draw of building types from a profile.
pub struct BuildingMix<'a> {
    profile: &'a RegionProfile,
    index: WeightedIndex<f64>,
}

impl BuildingMix<'_> {
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.profile.building_mix[self.index.sample(rng)].0
    }
}

/// Region profiles and building styles, looked up by name.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTable {
    pub regions: HashMap<String, RegionProfile>,
    pub buildings: HashMap<String, BuildingStyle>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        let regions = REGION_TABLE
            .iter()
            .map(|&(id, pitch, fill_attempts, mix)| {
                let profile = RegionProfile {
                    pitch,
                    building_mix: mix.iter().map(|&(kind, p)| (kind.to_string(), p)).collect(),
                    fill_attempts,
                    placement_attempts: PLACEMENT_ATTEMPTS,
                    chord_policy: ChordPolicy::default(),
                    density_retry: DensityRetry::default(),
                };
                (id.to_string(), profile)
            })
            .collect();

        let buildings = BUILDING_TABLE
            .iter()
            .map(|&(kind, min, max)| {
                let style = BuildingStyle {
                    dimensions: (min, max),
                    rotation_deg: DEFAULT_ROTATION_DEG,
                };
                (kind.to_string(), style)
            })
            .collect();

        Self { regions, buildings }
    }
}

impl ProfileTable {
    /// Reads a table from JSON and validates every entry.
    pub fn load(path: &Path) -> Result<Self, CityGenError> {
        let text = std::fs::read_to_string(path)?;
        let table: ProfileTable = serde_json::from_str(&text)?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), CityGenError> {
        for (kind, style) in &self.buildings {
            style.validate(kind)?;
        }
        for (id, profile) in &self.regions {
            profile.validate(id, &self.buildings)?;
        }
        Ok(())
    }

    /// Profile for a region: exact name first, then the name without a
    /// trailing number ("Residential 2" -> "Residential").
    pub fn resolve(&self, name: &str) -> Result<(&str, &RegionProfile), CityGenError> {
        let trimmed = name.trim();
        let base = match trimmed.rsplit_once(' ') {
            Some((head, tail)) if tail.chars().all(|c| c.is_ascii_digit()) => head.trim_end(),
            _ => trimmed,
        };

        [trimmed, base]
            .into_iter()
            .find_map(|key| self.regions.get_key_value(key))
            .map(|(key, profile)| (key.as_str(), profile))
            .ok_or_else(|| CityGenError::UnknownProfile(name.to_string()))
    }

    pub fn style(&self, kind: &str) -> Result<&BuildingStyle, CityGenError> {
        self.buildings
            .get(kind)
            .ok_or_else(|| CityGenError::UnknownBuildingType(kind.to_string()))
    }
}
