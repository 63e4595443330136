//! In-memory session bookkeeping
//!
//! Stands in for the ingestion side: keeps every observation per group,
//! re-runs the trigger policy after each batch and remembers the most
//! recent fix. Nothing here is persisted.

use std::collections::HashMap;

use tracing::{info, warn};

use super::policy::{FixOutcome, FixTriggerPolicy};
use crate::algorithms::{Projector, UtmProjection};
use crate::core::{Fix, Observation};
use crate::validation::data::{ObservationValidator, ValidationError};

#[derive(Debug, Clone, Default)]
struct GroupState {
    observations: Vec<Observation>,
    latest_fix: Option<Fix>,
}

/// Accumulates observations per group and tracks the latest fix of each
pub struct SessionTracker<P: Projector = UtmProjection> {
    policy: FixTriggerPolicy<P>,
    validator: ObservationValidator,
    groups: HashMap<String, GroupState>,
}

impl Default for SessionTracker<UtmProjection> {
    fn default() -> Self {
        Self::new(FixTriggerPolicy::default())
    }
}

impl<P: Projector> SessionTracker<P> {
    pub fn new(policy: FixTriggerPolicy<P>) -> Self {
        Self {
            policy,
            validator: ObservationValidator::new(),
            groups: HashMap::new(),
        }
    }

    /// Record a batch for one group and re-solve over its full history.
    ///
    /// A rejected batch leaves the group untouched.
    pub fn record(&mut self, batch: &[Observation]) -> Result<FixOutcome, ValidationError> {
        let group_id = match self.validator.validate_batch(batch) {
            Ok(group_id) => group_id.to_string(),
            Err(err) => {
                warn!(%err, "observation batch rejected");
                return Err(err);
            }
        };

        let state = self.groups.entry(group_id.clone()).or_default();
        state.observations.extend_from_slice(batch);

        let outcome = self.policy.on_new_observations(&state.observations);
        if let Some(fix) = outcome.fix() {
            info!(
                group = %group_id,
                observations = fix.observations,
                lat = fix.latitude,
                lon = fix.longitude,
                error_meters = fix.error_meters,
                "fix updated"
            );
            state.latest_fix = Some(*fix);
        }

        Ok(outcome)
    }

    pub fn observations(&self, group_id: &str) -> &[Observation] {
        self.groups
            .get(group_id)
            .map(|state| state.observations.as_slice())
            .unwrap_or(&[])
    }

    pub fn latest_fix(&self, group_id: &str) -> Option<&Fix> {
        self.groups.get(group_id).and_then(|state| state.latest_fix.as_ref())
    }

    /// Known group ids in sorted order
    pub fn groups(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn policy(&self) -> &FixTriggerPolicy<P> {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::error::TriangulationError;

    const ALPHA: &str = "SESSION_2024-05-01T10:00:00";
    const BRAVO: &str = "SESSION_2024-05-01T11:30:00";

    #[test]
    fn test_fix_after_second_bearing() {
        let mut tracker = SessionTracker::default();

        let first = tracker.record(&[Observation::new(ALPHA, 27.70, 85.30, 90.0)]).unwrap();
        assert_eq!(first, FixOutcome::MoreDataNeeded { have: 1, need: 2 });
        assert!(tracker.latest_fix(ALPHA).is_none());

        let second = tracker.record(&[Observation::new(ALPHA, 27.69, 85.30, 0.0)]).unwrap();
        assert!(second.is_fix());
        assert_eq!(tracker.observations(ALPHA).len(), 2);
        assert_eq!(tracker.latest_fix(ALPHA), second.fix());
    }

    #[test]
    fn test_recompute_uses_full_history() {
        let mut tracker = SessionTracker::default();
        tracker
            .record(&[
                Observation::new(ALPHA, 27.70, 85.30, 90.0),
                Observation::new(ALPHA, 27.69, 85.30, 0.0),
            ])
            .unwrap();

        let outcome = tracker.record(&[Observation::new(ALPHA, 27.75, 85.25, 150.0)]).unwrap();
        assert_eq!(outcome.fix().map(|f| f.observations), Some(3));
        assert!(tracker.latest_fix(ALPHA).map(|f| f.error_meters).unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn test_groups_are_isolated() {
        let mut tracker = SessionTracker::default();
        tracker
            .record(&[
                Observation::new(ALPHA, 27.70, 85.30, 90.0),
                Observation::new(ALPHA, 27.69, 85.30, 0.0),
            ])
            .unwrap();

        let outcome = tracker.record(&[Observation::new(BRAVO, 27.70, 85.30, 45.0)]).unwrap();
        assert_eq!(outcome, FixOutcome::MoreDataNeeded { have: 1, need: 2 });
        assert!(tracker.latest_fix(BRAVO).is_none());
        assert!(tracker.latest_fix(ALPHA).is_some());
        assert_eq!(tracker.groups(), vec![ALPHA, BRAVO]);
    }

    #[test]
    fn test_degenerate_solve_keeps_previous_fix() {
        let mut tracker = SessionTracker::default();
        let outcome = tracker
            .record(&[
                Observation::new(ALPHA, 27.70, 85.30, 45.0),
                Observation::new(ALPHA, 27.71, 85.31, 45.0),
            ])
            .unwrap();
        assert!(matches!(
            outcome,
            FixOutcome::NoFix(TriangulationError::DegenerateGeometry { .. })
        ));
        assert!(tracker.latest_fix(ALPHA).is_none());

        // A bearing from a different angle resolves it
        let outcome = tracker.record(&[Observation::new(ALPHA, 27.69, 85.40, 315.0)]).unwrap();
        assert!(outcome.is_fix());
        assert!(tracker.latest_fix(ALPHA).is_some());
    }

    #[test]
    fn test_rejected_batch_is_not_recorded() {
        let mut tracker = SessionTracker::default();
        let err = tracker
            .record(&[
                Observation::new(ALPHA, 27.70, 85.30, 90.0),
                Observation::new(ALPHA, 27.69, 85.30, 400.0),
            ])
            .unwrap_err();

        assert!(matches!(err, ValidationError::OutOfRange { index: 1, .. }));
        assert!(tracker.observations(ALPHA).is_empty());
        assert!(tracker.groups().is_empty());
        assert!(tracker.record(&[]).is_err());
    }
}
