//! Error type shared by the chart engine.

use thiserror::Error;

/// Errors raised by operations that receive invalid parameters.
///
/// Lookups that simply find nothing return `Option` instead; malformed
/// geometry (an empty path) yields empty results rather than an error.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Interval cannot be 0")]
    ZeroInterval,

    #[error("interpolate_value: position {position} is outside of the sampled range {positions:?}")]
    PositionOutOfRange { position: f64, positions: Vec<f64> },

    #[error("interpolate_value: {positions} positions for {values} values")]
    LengthMismatch { positions: usize, values: usize },

    #[error("interpolate_value: no samples to interpolate from")]
    EmptySamples,

    #[error("Invalid ISO-8601 duration '{0}'")]
    InvalidDuration(String),

    #[error("Invalid train id '{input}': {reason}")]
    InvalidTrainId { input: String, reason: &'static str },

    #[error("Occurrence {index} is outside of the grid of {count} occurrences")]
    OccurrenceOutOfGrid { index: u64, count: u64 },

    #[error("Invalid time scale {0} ms/px")]
    InvalidTimeScale(f64),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
