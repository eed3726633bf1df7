// ---------------------------------------------------------------------------
// CityGenError: typed failures of road graph construction and placement
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors surfaced by city generation.
///
/// Geometric degeneracies and placement exhaustion are not errors; they are
/// absorbed where they happen. Only bad configuration, retry exhaustion and
/// collaborator I/O end up here.
#[derive(Debug)]
pub enum CityGenError {
    /// Sampling pitch was zero, negative or not finite.
    InvalidPitch(f64),
    /// A region polygon without any vertex.
    EmptyPolygon,
    /// Pitch too fine for the region: the lattice would exceed the point cap.
    LatticeTooLarge { pitch: f64, limit: usize },
    /// Dimension or rotation range of a building style is unusable.
    InvalidBuildingStyle { kind: String, reason: String },
    /// A region profile is inconsistent (probabilities, pitch, ...).
    InvalidProfile { id: String, reason: String },
    /// No profile matches the region id.
    UnknownProfile(String),
    /// A profile references a building type missing from the style table.
    UnknownBuildingType(String),
    /// Bounded density retries all hit a bare chord.
    DensityRetryExhausted { attempts: u32, last_pitch: f64 },
    /// I/O error while reading a scene or writing results.
    Io(std::io::Error),
    /// Malformed JSON document.
    Json(serde_json::Error),
}

impl fmt::Display for CityGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityGenError::InvalidPitch(pitch) => {
                write!(f, "Invalid pitch {pitch}: must be positive and finite")
            }
            CityGenError::EmptyPolygon => write!(f, "Region polygon has no vertices"),
            CityGenError::LatticeTooLarge { pitch, limit } => {
                write!(f, "Pitch {pitch} samples more than {limit} lattice points")
            }
            CityGenError::InvalidBuildingStyle { kind, reason } => {
                write!(f, "Invalid building style '{kind}': {reason}")
            }
            CityGenError::InvalidProfile { id, reason } => {
                write!(f, "Invalid region profile '{id}': {reason}")
            }
            CityGenError::UnknownProfile(id) => write!(f, "No region profile for '{id}'"),
            CityGenError::UnknownBuildingType(kind) => {
                write!(f, "No building style for type '{kind}'")
            }
            CityGenError::DensityRetryExhausted {
                attempts,
                last_pitch,
            } => write!(
                f,
                "Road graph still degenerate after {attempts} density retries (last pitch {last_pitch})"
            ),
            CityGenError::Io(e) => write!(f, "I/O error: {e}"),
            CityGenError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for CityGenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CityGenError::Io(e) => Some(e),
            CityGenError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CityGenError {
    fn from(e: std::io::Error) -> Self {
        CityGenError::Io(e)
    }
}

impl From<serde_json::Error> for CityGenError {
    fn from(e: serde_json::Error) -> Self {
        CityGenError::Json(e)
    }
}
