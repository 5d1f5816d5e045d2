//! # Profit Math
//!
//! Numerical building blocks for fitting seasonal ARIMA models with
//! exogenous regressors. Everything here works on plain `f64` slices so the
//! crate stays independent of any data-frame representation.

use thiserror::Error;

pub mod criteria;
pub mod differencing;
pub mod linalg;
pub mod optimize;
pub mod polynomial;
pub mod stationarity;
pub mod stats;
pub mod transform;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
