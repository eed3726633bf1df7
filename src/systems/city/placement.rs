// rejection-sampling building placement

use bevy::math::DVec2;
use bevy::prelude::Component;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CityGenError;
use crate::systems::city::poly::collision::{anchored_rect, footprints_overlap, Corners};
use crate::systems::city::poly::graph::RoadNetwork;
use crate::systems::city::poly::utils::{bounding_box, polygon_contains_polygon};
use crate::systems::city::profile::BuildingStyle;

/// An accepted building footprint.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: String,
    pub footprint: Corners,
}

/// Footprints already accepted in one region. Only grows.
#[derive(Debug, Clone, Default)]
pub struct FilledSpace {
    footprints: Vec<Corners>,
}

impl FilledSpace {
    pub fn footprints(&self) -> &[Corners] {
        &self.footprints
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn overlaps(&self, corners: &Corners) -> bool {
        self.footprints.iter().any(|f| footprints_overlap(f, corners))
    }

    fn push(&mut self, corners: Corners) {
        self.footprints.push(corners);
    }
}

/// One building to place.
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    pub kind: &'a str,
    pub region: &'a [DVec2],
    pub style: &'a BuildingStyle,
    pub attempts: u32,
}

/// Samples random footprints until one fits the region, misses every filled
/// footprint and every road, or the attempt budget runs out
///
/// # Returns
/// `Ok(Some(building))` once accepted (also appended to `filled`),
/// `Ok(None)` when the budget is exhausted
pub fn place_building<R: Rng + ?Sized>(
    request: &PlacementRequest,
    filled: &mut FilledSpace,
    roads: &RoadNetwork,
    rng: &mut R,
) -> Result<Option<Building>, CityGenError> {
    request.style.validate(request.kind)?;
    let Some((min, max)) = bounding_box(request.region) else {
        return Err(CityGenError::EmptyPolygon);
    };

    let (dim_lo, dim_hi) = request.style.dimensions;
    let (rot_lo, rot_hi) = request.style.rotation_deg;

    for _ in 0..request.attempts {
        let anchor = DVec2::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
        );
        let width = rng.random_range(dim_lo..=dim_hi);
        let height = rng.random_range(dim_lo..=dim_hi);
        let rotation = rng.random_range(rot_lo..=rot_hi).to_radians();

        let footprint = anchored_rect(anchor, width, height, rotation);

        if polygon_contains_polygon(request.region, &footprint)
            && !filled.overlaps(&footprint)
            && !roads.intersects_footprint(&footprint)
        {
            filled.push(footprint);
            return Ok(Some(Building {
                kind: request.kind.to_string(),
                footprint,
            }));
        }
    }

    Ok(None)
}
