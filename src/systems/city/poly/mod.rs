// polygon geometry: road graph construction and the helpers around it

pub mod collision;
pub mod graph;
pub mod grid;
pub mod point_gen;
pub mod stitch;
pub mod utils;
pub mod voronoi;
