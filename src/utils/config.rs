use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::algorithms::{BearingTriangulator, UtmProjection};
use crate::core::{DEFAULT_SINGULAR_RATIO_TOLERANCE, DEFAULT_UTM_ZONE, MIN_OBSERVATIONS};

/// Deployment-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TriangulationConfig {
    pub projection: ProjectionConfig,
    pub solver: SolverConfig,
    pub policy: PolicyConfig,
}

/// Planar frame used for every solve of this deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// UTM zone number (1-60)
    pub utm_zone: u8,
    /// Northern hemisphere (false selects the 10,000 km false northing)
    pub northern_hemisphere: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Smallest accepted ratio of singular values before bearings count as parallel
    pub singular_ratio_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Observations a group needs before a solve is attempted
    pub min_observations: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            utm_zone: DEFAULT_UTM_ZONE,
            northern_hemisphere: true,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singular_ratio_tolerance: DEFAULT_SINGULAR_RATIO_TOLERANCE,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_observations: MIN_OBSERVATIONS,
        }
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl TriangulationConfig {
    /// Load and validate a JSON configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            utm_zone = config.projection.utm_zone,
            northern = config.projection.northern_hemisphere,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zone = self.projection.utm_zone;
        if !(1..=60).contains(&zone) {
            return Err(ConfigError::InvalidParameter {
                parameter: "projection.utm_zone",
                value: zone.to_string(),
                reason: "UTM zone must be between 1 and 60",
            });
        }

        let tolerance = self.solver.singular_ratio_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 || tolerance >= 1.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "solver.singular_ratio_tolerance",
                value: tolerance.to_string(),
                reason: "tolerance must lie strictly between 0 and 1",
            });
        }

        if self.policy.min_observations < MIN_OBSERVATIONS {
            return Err(ConfigError::InvalidParameter {
                parameter: "policy.min_observations",
                value: self.policy.min_observations.to_string(),
                reason: "at least two bearings are needed for a fix",
            });
        }

        Ok(())
    }

    pub fn projection(&self) -> UtmProjection {
        UtmProjection::new(self.projection.utm_zone, self.projection.northern_hemisphere)
    }

    pub fn triangulator(&self) -> BearingTriangulator<UtmProjection> {
        BearingTriangulator::new(self.projection()).with_tolerance(self.solver.singular_ratio_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::Projector;

    #[test]
    fn test_default_config() {
        let config = TriangulationConfig::default();
        assert_eq!(config.projection.utm_zone, 44);
        assert!(config.projection.northern_hemisphere);
        assert_eq!(config.policy.min_observations, 2);
        assert!(config.validate().is_ok());
        assert_eq!(config.projection().epsg_code(), 32644);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TriangulationConfig::from_json(r#"{"projection": {"utm_zone": 45}}"#).unwrap();
        assert_eq!(config.projection.utm_zone, 45);
        assert!(config.projection.northern_hemisphere);
        assert_eq!(config.solver, SolverConfig::default());

        let (x, _) = config.triangulator().projector().project(27.7, 87.0).unwrap();
        assert!((x - 500000.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_parameters() {
        let err = TriangulationConfig::from_json(r#"{"projection": {"utm_zone": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { parameter: "projection.utm_zone", .. }));

        let err = TriangulationConfig::from_json(r#"{"solver": {"singular_ratio_tolerance": 0.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { .. }));

        let err = TriangulationConfig::from_json(r#"{"policy": {"min_observations": 1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { parameter: "policy.min_observations", .. }));

        let err = TriangulationConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut config = TriangulationConfig::default();
        config.projection.utm_zone = 45;
        config.policy.min_observations = 3;

        let path = std::env::temp_dir().join(format!("bearing_fix_config_{}.json", std::process::id()));
        config.save_to_file(&path).unwrap();
        let loaded = TriangulationConfig::load_from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TriangulationConfig::load_from_file("/nonexistent/bearing_fix.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
