//! Error types for the profit_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the profit_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Malformed or unsatisfiable forecast request
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Model training failed for every candidate configuration
    #[error("Fit error: {0}")]
    FitError(String),

    /// The trained model cannot extrapolate to the requested horizon
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numerical kernels
    #[error("Math error: {0}")]
    MathError(#[from] profit_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error reading delimited files
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error serialising results
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}
