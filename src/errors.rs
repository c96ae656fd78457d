use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum ZoneError {
    #[error("{0}")]
    Error(String),
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),
    #[error("Ill-conditioned network: {0}")]
    IllConditionedNetwork(String),
    #[error("Misaligned series '{name}': expected {expected} steps, got {actual}")]
    MisalignedSeries {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Schedule '{name}' value {value} outside limits [{lower}, {upper}]")]
    ScheduleOutsideLimits {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("Non-convergent control at step {step}: {reason}")]
    NonConvergentControl { step: usize, reason: String },
}

/// Convenience type for `Result<T, ZoneError>`.
pub type ZoneResult<T> = Result<T, ZoneError>;
