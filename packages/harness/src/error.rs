use std::time::Duration;
use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that stop an evaluation run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Failed to list objects in bucket {bucket}: {message}")]
    Listing { bucket: String, message: String },

    #[error("Prediction service is not healthy: {0}")]
    HealthCheck(#[source] PredictionError),
}

/// Failure of a single prediction request. Recorded per sample, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Prediction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode prediction response: {0}")]
    Decode(String),

    #[error("Prediction request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Prediction service reported failure: {0}")]
    Rejected(String),
}
