// saves the city as json documents
// by iterating through all generated regions

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Serialize;

use crate::error::CityGenError;
use crate::systems::city::CityLayout;
use crate::systems::city::orchestrator::CityReport;
use crate::systems::city::poly::graph::Node;

// export event
#[derive(Event, Debug, Clone)]
pub struct ExportEvent {
    pub buildings: PathBuf,
    pub roads: Option<PathBuf>,
}

/// One building as `[type, [[x, y], ...]]`, ring closed on the first corner.
pub type BuildingRecord = (String, Vec<[f64; 2]>);

pub fn building_records(report: &CityReport) -> Vec<BuildingRecord> {
    report
        .buildings()
        .map(|building| {
            let mut ring: Vec<[f64; 2]> = building.footprint.iter().map(|p| [p.x, p.y]).collect();
            ring.push(ring[0]);
            (building.kind.clone(), ring)
        })
        .collect()
}

#[derive(Serialize)]
struct RegionRoads<'a> {
    id: &'a str,
    pitch: f64,
    nodes: &'a [Node],
    edges: Vec<(usize, usize)>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CityGenError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Writes all buildings of the report
///
/// # Returns
/// The number of buildings written
pub fn write_buildings(report: &CityReport, path: &Path) -> Result<usize, CityGenError> {
    let records = building_records(report);
    write_json(path, &records)?;
    Ok(records.len())
}

/// Writes the road graph of every region: junctions with their kind, and
/// edges as index pairs into the junction list.
pub fn write_roads(report: &CityReport, path: &Path) -> Result<(), CityGenError> {
    let regions: Vec<RegionRoads> = report
        .regions
        .iter()
        .map(|region| RegionRoads {
            id: &region.id,
            pitch: region.pitch,
            nodes: region.graph.nodes(),
            edges: region.graph.edges().collect(),
        })
        .collect();
    write_json(path, &regions)
}

pub fn export_city(report: &CityReport, event: &ExportEvent) -> Result<usize, CityGenError> {
    let count = write_buildings(report, &event.buildings)?;
    if let Some(roads) = &event.roads {
        write_roads(report, roads)?;
    }
    Ok(count)
}

// handle export events
pub fn handle_export(mut events: EventReader<ExportEvent>, layout: Res<CityLayout>) {
    for event in events.read() {
        match export_city(&layout.report, event) {
            Ok(count) => {
                info!("exported {} buildings to {}", count, event.buildings.display());
            }
            Err(e) => {
                error!("export failed: {}", e);
            }
        }
    }
}
