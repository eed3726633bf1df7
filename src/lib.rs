pub mod config;
pub mod error;
pub mod systems;

pub use error::CityGenError;
pub use systems::city::CityGenerationPlugin;
