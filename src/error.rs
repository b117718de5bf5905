use thiserror::Error;

/// Invalid analysis configuration.
///
/// Only configuration construction can fail. The analysis functions
/// themselves are total and report missing market structure through empty
/// or zero-valued results instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// A percentage threshold was zero, negative, NaN or infinite.
    #[error("percentage must be positive and finite, got {0}")]
    InvalidPercent(f64),

    /// A Fibonacci ratio was negative, NaN or infinite.
    #[error("fibonacci ratio must be non-negative and finite, got {0}")]
    InvalidRatio(f64),

    /// A Fibonacci ratio set had no entries.
    #[error("fibonacci ratio set must not be empty")]
    EmptyRatios,
}
