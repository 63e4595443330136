//! Error classification for projection and triangulation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of the geodetic projector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("non-finite coordinate: lat={lat}, lon={lon}")]
    NonFiniteGeodetic { lat: f64, lon: f64 },

    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("non-finite planar coordinate: x={x}, y={y}")]
    NonFinitePlanar { x: f64, y: f64 },

    #[error("projection produced a non-finite result")]
    Diverged,
}

/// Why a solve produced no fix.
///
/// All variants are recoverable: the first two are the expected steady
/// state while a session gathers bearings, the last is a caller input defect.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriangulationError {
    #[error("insufficient observations: {available} available, {required} required")]
    InsufficientObservations { available: usize, required: usize },

    #[error("insufficient geometric diversity: singular value ratio {singular_ratio:.3e} below {tolerance:.1e}")]
    DegenerateGeometry { singular_ratio: f64, tolerance: f64 },

    #[error("numeric fault: {reason}")]
    NumericFault { reason: String },
}

impl TriangulationError {
    pub fn numeric(reason: impl Into<String>) -> Self {
        Self::NumericFault { reason: reason.into() }
    }

    /// Short machine-friendly code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientObservations { .. } => "insufficient_observations",
            Self::DegenerateGeometry { .. } => "degenerate_geometry",
            Self::NumericFault { .. } => "numeric_fault",
        }
    }

    /// Whether more or different bearings can turn this into a fix
    pub fn is_recoverable_with_more_data(&self) -> bool {
        !matches!(self, Self::NumericFault { .. })
    }
}

impl From<ProjectionError> for TriangulationError {
    fn from(err: ProjectionError) -> Self {
        Self::numeric(format!("projection failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TriangulationError::InsufficientObservations { available: 1, required: 2 };
        assert!(err.to_string().starts_with("insufficient observations"));

        let err = TriangulationError::DegenerateGeometry { singular_ratio: 1e-17, tolerance: 1e-3 };
        assert!(err.to_string().starts_with("insufficient geometric diversity"));
        assert_eq!(err.code(), "degenerate_geometry");
    }

    #[test]
    fn test_projection_error_becomes_numeric_fault() {
        let err: TriangulationError = ProjectionError::LatitudeOutOfRange(91.0).into();
        assert_eq!(err.code(), "numeric_fault");
        assert!(!err.is_recoverable_with_more_data());
        assert!(err.to_string().contains("91"));
    }
}
