use thiserror::Error;

use crate::region::RegionHandle;

/// Why an intersection source could not observe a region. Every caller
/// degrades to treating the region as visible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObserveError {
    #[error("intersection observation is not supported by this host")]
    Unsupported,
    #[error("region {0:?} is not registered")]
    UnknownRegion(RegionHandle),
}

/// Configuration problems. Engines log these and fall back to a static
/// presentation instead of returning them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("threshold {0} is outside 0..=1")]
    ThresholdOutOfRange(f32),
    #[error("phrase list is empty")]
    EmptyPhrases,
    #[error("{field} must be positive, got {value}")]
    NonPositiveDuration { field: &'static str, value: f64 },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fails with [`ConfigError::NonPositiveDuration`] unless `value > 0`.
pub fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDuration { field, value })
    }
}
