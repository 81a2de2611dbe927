// Error taxonomy for the chart pipeline

use thiserror::Error;

/// Errors surfaced by the chart pipeline.
///
/// Unsupported chart types and unrepresentable values are not errors: the
/// former yields an empty chart, the latter is absorbed by [`crate::sanitize`].
#[derive(Debug, Error)]
pub enum ChartError {
    /// A required request field was absent or empty.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A request referenced a column the dataset does not have.
    #[error("column '{0}' not found in dataset")]
    InvalidColumn(String),

    /// The request payload could not be decoded.
    #[error("malformed chart request: {0}")]
    MalformedRequest(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;
