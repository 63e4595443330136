//! Input validation and error types

pub mod data;
pub mod error;

pub use data::{ObservationValidator, ValidationError};
pub use error::{ProjectionError, TriangulationError};
