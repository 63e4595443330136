use thiserror::Error;

use crate::core::Observation;

/// Rejections raised while checking an incoming observation batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid data format: empty batch")]
    EmptyBatch,

    #[error("Invalid Group ID: missing group id")]
    MissingGroupId,

    #[error("Observation {index} belongs to group {found:?}, batch is for {expected:?}")]
    MixedGroups {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Observation {index}: {field} is not finite")]
    NonFinite { index: usize, field: &'static str },

    #[error("Observation {index}: {field} = {value} outside {}", range_text(.min, .max, .upper_inclusive))]
    OutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
        upper_inclusive: bool,
    },
}

fn range_text(min: &f64, max: &f64, upper_inclusive: &bool) -> String {
    let close = if *upper_inclusive { ']' } else { ')' };
    format!("[{}, {}{}", min, max, close)
}

/// Range checks applied before observations reach the solver
#[derive(Debug, Clone, Default)]
pub struct ObservationValidator;

impl ObservationValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a batch and return the group id it belongs to.
    ///
    /// The group is taken from the first observation; every other
    /// observation must carry the same key.
    pub fn validate_batch<'a>(&self, batch: &'a [Observation]) -> Result<&'a str, ValidationError> {
        let first = batch.first().ok_or(ValidationError::EmptyBatch)?;
        let group_id = first.group_id.as_str();
        if group_id.trim().is_empty() {
            return Err(ValidationError::MissingGroupId);
        }

        for (index, observation) in batch.iter().enumerate() {
            if observation.group_id != group_id {
                return Err(ValidationError::MixedGroups {
                    index,
                    expected: group_id.to_string(),
                    found: observation.group_id.clone(),
                });
            }
            self.validate_observation(index, observation)?;
        }

        Ok(group_id)
    }

    pub fn validate_observation(&self, index: usize, observation: &Observation) -> Result<(), ValidationError> {
        check_range(index, "latitude", observation.latitude, -90.0, 90.0, true)?;
        check_range(index, "longitude", observation.longitude, -180.0, 180.0, true)?;
        check_range(index, "bearing", observation.bearing, 0.0, 360.0, false)?;
        Ok(())
    }
}

fn check_range(
    index: usize,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    upper_inclusive: bool,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { index, field });
    }

    let above = if upper_inclusive { value > max } else { value >= max };
    if value < min || above {
        return Err(ValidationError::OutOfRange {
            index,
            field,
            value,
            min,
            max,
            upper_inclusive,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(lat: f64, lon: f64, bearing: f64) -> Observation {
        Observation::new("SESSION_2024-05-01T10:00:00", lat, lon, bearing)
    }

    #[test]
    fn test_valid_batch() {
        let batch = vec![obs(27.7, 85.3, 90.0), obs(27.69, 85.3, 0.0), obs(-90.0, 180.0, 359.9)];
        let group = ObservationValidator::new().validate_batch(&batch).unwrap();
        assert_eq!(group, "SESSION_2024-05-01T10:00:00");
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(
            ObservationValidator::new().validate_batch(&[]),
            Err(ValidationError::EmptyBatch)
        );
    }

    #[test]
    fn test_missing_group_rejected() {
        let batch = vec![Observation::new("  ", 27.7, 85.3, 90.0)];
        assert_eq!(
            ObservationValidator::new().validate_batch(&batch),
            Err(ValidationError::MissingGroupId)
        );
    }

    #[test]
    fn test_mixed_groups_rejected() {
        let batch = vec![obs(27.7, 85.3, 90.0), Observation::new("other", 27.69, 85.3, 0.0)];
        let err = ObservationValidator::new().validate_batch(&batch).unwrap_err();
        assert!(matches!(err, ValidationError::MixedGroups { index: 1, .. }));
    }

    #[test]
    fn test_range_checks() {
        let validator = ObservationValidator::new();

        let err = validator.validate_batch(&[obs(90.5, 85.3, 10.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "latitude", .. }));

        let err = validator.validate_batch(&[obs(27.7, -180.1, 10.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "longitude", .. }));

        // 360 is not a valid bearing, 0 is
        let err = validator.validate_batch(&[obs(27.7, 85.3, 360.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "bearing", .. }));
        assert!(err.to_string().ends_with("[0, 360)"));
        assert!(validator.validate_batch(&[obs(27.7, 85.3, 0.0)]).is_ok());

        let err = validator.validate_batch(&[obs(27.7, 85.3, -1.0)]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "bearing", .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = ObservationValidator::new()
            .validate_batch(&[obs(27.7, f64::NAN, 10.0)])
            .unwrap_err();
        assert_eq!(err, ValidationError::NonFinite { index: 0, field: "longitude" });
    }
}
