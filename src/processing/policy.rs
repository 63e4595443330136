//! When to (re-)solve a group's fix
//!
//! Every call recomputes over the full observation history of a group, so a
//! fix tightens as bearings accumulate. The policy holds no state between
//! calls.

use serde::Serialize;
use tracing::debug;

use crate::algorithms::{BearingTriangulator, Projector, UtmProjection};
use crate::core::{BearingReading, Fix, Observation, MIN_OBSERVATIONS};
use crate::utils::config::TriangulationConfig;
use crate::validation::error::TriangulationError;

/// Result of running the policy over a group's observations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixOutcome {
    FixFound(Fix),
    MoreDataNeeded { have: usize, need: usize },
    NoFix(TriangulationError),
}

impl FixOutcome {
    pub fn fix(&self) -> Option<&Fix> {
        match self {
            FixOutcome::FixFound(fix) => Some(fix),
            _ => None,
        }
    }

    pub fn is_fix(&self) -> bool {
        matches!(self, FixOutcome::FixFound(_))
    }

    /// Status line reported back to the field device
    pub fn message(&self) -> String {
        match self {
            FixOutcome::FixFound(fix) => format!("Fix Found! Error: {:.1}m", fix.error_meters),
            _ => "Bearing recorded.".to_string(),
        }
    }

    /// Short note stored alongside a fix
    pub fn note(&self) -> Option<String> {
        self.fix().map(|fix| format!("Err: {:.1}m", fix.error_meters))
    }
}

/// Decides whether a group has enough bearings and runs the solver
#[derive(Debug, Clone)]
pub struct FixTriggerPolicy<P: Projector = UtmProjection> {
    triangulator: BearingTriangulator<P>,
    min_observations: usize,
}

impl Default for FixTriggerPolicy<UtmProjection> {
    fn default() -> Self {
        Self::new(BearingTriangulator::default())
    }
}

impl FixTriggerPolicy<UtmProjection> {
    pub fn from_config(config: &TriangulationConfig) -> Self {
        Self::new(config.triangulator()).with_min_observations(config.policy.min_observations)
    }
}

impl<P: Projector> FixTriggerPolicy<P> {
    pub fn new(triangulator: BearingTriangulator<P>) -> Self {
        Self {
            triangulator,
            min_observations: MIN_OBSERVATIONS,
        }
    }

    /// Never below the two bearings a fix needs
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations.max(MIN_OBSERVATIONS);
        self
    }

    pub fn min_observations(&self) -> usize {
        self.min_observations
    }

    pub fn triangulator(&self) -> &BearingTriangulator<P> {
        &self.triangulator
    }

    /// Run over the entire accumulated set of a group's observations
    pub fn on_new_observations(&self, observations: &[Observation]) -> FixOutcome {
        let have = observations.len();
        if have < self.min_observations {
            debug!(have, need = self.min_observations, "waiting for more bearings");
            return FixOutcome::MoreDataNeeded {
                have,
                need: self.min_observations,
            };
        }

        let readings: Vec<BearingReading> = observations.iter().map(Observation::reading).collect();
        match self.triangulator.solve(&readings) {
            Ok(fix) => FixOutcome::FixFound(fix),
            Err(TriangulationError::InsufficientObservations { available, required }) => {
                FixOutcome::MoreDataNeeded {
                    have: available,
                    need: required.max(self.min_observations),
                }
            }
            Err(err) => {
                debug!(code = err.code(), %err, "no fix for group");
                FixOutcome::NoFix(err)
            }
        }
    }
}
