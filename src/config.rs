// Configuration file, all measurements in scene units (1 unit = 1 meter)
// This controls the initial generation parameter settings

// Current parameter settings follow the region and building tables of the
// original city back-end

pub const INITIAL_SEED: u64 = 1512086461918454205;

// Geometry tolerance for on-boundary tests and node deduplication
pub const GEOMETRY_EPSILON: f64 = 1e-9;

// Largest lattice a region may sample, in points
pub const MAX_LATTICE_POINTS: usize = 4_000_000;

// Building placement
pub const PLACEMENT_ATTEMPTS: u32 = 50; // rejection-sampling tries per building
pub const DEFAULT_ROTATION_DEG: (f64, f64) = (0.0, 90.0);

// Density retry (only used by regions with ChordPolicy::Retry)
pub const DENSITY_RETRY_ATTEMPTS: u32 = 20;
pub const DENSITY_RETRY_STEP: f64 = 0.1; // pitch growth per retry

// Region table: (id, pitch, fill attempts, [(building type, probability)])
pub const REGION_TABLE: &[(&str, f64, u32, &[(&str, f64)])] = &[
    ("Residential", 7.0, 100, &[("residential", 0.8), ("commercial", 0.15), ("industrial", 0.05)]),
    ("Town Centre", 8.0, 80, &[("residential", 0.4), ("commercial", 0.5), ("industrial", 0.1)]),
    ("Market", 10.0, 70, &[("residential", 0.3), ("commercial", 0.6), ("industrial", 0.1)]),
    ("Commercial", 12.0, 60, &[("residential", 0.2), ("commercial", 0.7), ("industrial", 0.1)]),
    ("Industrial", 12.0, 50, &[("residential", 0.1), ("commercial", 0.2), ("industrial", 0.7)]),
];

// Building table: (type, min side, max side)
pub const BUILDING_TABLE: &[(&str, f64, f64)] = &[
    ("residential", 1.0, 6.0),
    ("industrial", 3.0, 10.0),
    ("commercial", 4.0, 7.0),
];

// Demo scene parameters (used when no scene file is given)
pub const DEMO_CITY_SIZE: f64 = 250.0;       // side of the square city area
pub const DEMO_GENERATOR_COUNT: usize = 24;
pub const DEMO_SPIRAL_SPREAD: f64 = 21.0;    // radius growth of the generator spiral
pub const DEMO_FRAME_SPACING: f64 = 30.0;    // fixed generators around the city edge
pub const DEMO_RELAX_STEPS: usize = 3;       // lloyd relaxation passes
pub const DEMO_PARK_COUNT: usize = 1;

// Output defaults
pub const BUILDING_OUTPUT: &str = "building_data.json";
