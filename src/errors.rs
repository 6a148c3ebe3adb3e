//! Error types for channelmix
//!
//! Three algorithmic failures (misaligned series, degenerate weights,
//! infeasible constraints) plus the input-validation and I/O errors the
//! surrounding layers raise.

use thiserror::Error;

/// Main error type for aggregation, allocation and their I/O plumbing
#[derive(Error, Debug)]
pub enum MixError {
    /// Contribution series of different lengths
    #[error("Misaligned series: channel(s) {channels:?} differ from {reference} ({expected} periods)")]
    MisalignedSeries {
        reference: String,
        expected: usize,
        channels: Vec<String>,
    },

    /// No channel has positive modeled ROI in aggregate
    #[error("Degenerate weights: ROI sum {weight_sum} is not positive, cannot proportion budget")]
    DegenerateWeights { weight_sum: f64 },

    /// Constraints cannot hold together with the fixed total budget
    #[error("Infeasible constraints after {iterations} iteration(s): channel(s) {channels:?} cannot satisfy their bounds")]
    InfeasibleConstraints {
        channels: Vec<String>,
        iterations: usize,
    },

    /// A single constraint is malformed
    #[error("Invalid constraint for channel {channel}: {reason}")]
    InvalidConstraint { channel: String, reason: String },

    /// Malformed numeric input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dataset preparation errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("Error: {0}")]
    Generic(String),
}

impl MixError {
    /// True for the failures raised by the aggregation/allocation algorithms
    /// themselves, as opposed to malformed input or I/O.
    pub fn is_algorithmic(&self) -> bool {
        matches!(
            self,
            MixError::MisalignedSeries { .. }
                | MixError::DegenerateWeights { .. }
                | MixError::InfeasibleConstraints { .. }
        )
    }
}

/// Result type alias for channelmix operations
pub type Result<T> = std::result::Result<T, MixError>;

/// Convert anyhow errors to MixError
impl From<anyhow::Error> for MixError {
    fn from(err: anyhow::Error) -> Self {
        MixError::Generic(err.to_string())
    }
}
