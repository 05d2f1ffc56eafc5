//! Error types for the bayesian-holidays library.

use thiserror::Error;

/// Result type alias for holiday-model operations.
pub type Result<T> = std::result::Result<T, HolidayError>;

/// Errors that can occur while preparing data for or consuming output of
/// the external sampler.
#[derive(Error, Debug)]
pub enum HolidayError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Date ordering or range violation.
    #[error("date range error: {0}")]
    DateRange(String),

    /// A named posterior variable was not present in the sampler output.
    #[error("posterior variable not found: {0}")]
    MissingVariable(String),

    /// The external sampler failed or produced unusable output.
    #[error("sampler error: {0}")]
    Sampler(String),

    /// Malformed record in an input file.
    #[error("parse error: {0}")]
    Parse(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding/decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP failure while querying a trends source.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Chart rendering failure.
    #[error("plot error: {0}")]
    Plot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = HolidayError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = HolidayError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = HolidayError::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");

        let err = HolidayError::MissingVariable("h_scale".to_string());
        assert_eq!(err.to_string(), "posterior variable not found: h_scale");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HolidayError = io.into();
        assert!(matches!(err, HolidayError::Io(_)));
    }
}
