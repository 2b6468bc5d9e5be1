use thiserror::Error;

use crate::data::loader::Source;

/// Failures while obtaining the facility dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// One candidate source could not be fetched or parsed.
    #[error("{location}: {reason}")]
    Source { location: Source, reason: String },

    /// Every candidate failed; the embedded snapshot is in use.
    #[error("all {} dataset sources failed", .failures.len())]
    DataUnavailable { failures: Vec<LoadError> },
}

/// The user's position could not be determined.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location lookup failed: {0}")]
    Network(String),

    #[error("unexpected location response: {0}")]
    InvalidResponse(String),

    /// Manually typed coordinates that are not numbers.
    #[error("invalid coordinates: {0}")]
    InvalidInput(String),

    #[error("coordinates out of range: {lat}, {lon}")]
    OutOfRange { lat: f64, lon: f64 },
}
