use thiserror::Error;

/// Set-up errors. Everything here is detected before the first step runs;
/// nothing inside a time loop returns an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("axis {axis} needs at least 2 points, got {points}")]
    TooFewPoints { axis: &'static str, points: usize },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("no boundary condition given for the {side} side")]
    MissingBoundary { side: &'static str },

    #[error("periodic boundary on axis {axis} must be set on both ends")]
    UnpairedPeriodic { axis: &'static str },

    #[error("field has {actual} points, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{model} is not supported by {integrator}")]
    UnsupportedModel { model: &'static str, integrator: &'static str },

    #[error("{number} number {value:.4} is outside the stable range [0, {limit}]")]
    Unstable { number: &'static str, value: f64, limit: f64 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejects zero, negative, NaN and infinite values.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// Any sign, but not NaN or infinite.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

/// Accepts zero, rejects negative and non-finite values.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
