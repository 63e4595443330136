//! Radio Direction-Finding Triangulation
//! 
//! Estimates a transmitter position from compass bearings taken by
//! observers at different locations, using a least-squares intersection of
//! the lines of bearing in a fixed UTM frame.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;

// Re-export commonly used types
pub use self::core::{BearingReading, Fix, Observation, MIN_OBSERVATIONS};
pub use algorithms::{BearingTriangulator, PlanarLine, Projector, UtmProjection};
pub use processing::{FixOutcome, FixTriggerPolicy, SessionTracker};
pub use validation::{ObservationValidator, ProjectionError, TriangulationError, ValidationError};
pub use utils::{ConfigError, TriangulationConfig};
