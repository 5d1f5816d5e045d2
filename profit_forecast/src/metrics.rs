//! Accuracy metrics for in-sample fits and hold-out forecasts

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Forecast accuracy metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Number of compared values
    pub count: usize,
}

/// Compare `forecast` with `actual` value by value
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();

    let (ape_sum, ape_count) = actual
        .iter()
        .zip(errors.iter())
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, e)| {
            (sum + e.abs() / a.abs() * 100.0, count + 1)
        });
    let mape = if ape_count > 0 {
        ape_sum / ape_count as f64
    } else {
        0.0
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| {
            let scale = a.abs() + f.abs();
            if scale == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / scale
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        rmse,
        mape,
        smape,
        count: forecast.len(),
    })
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy ({} values):", self.count)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_forecast() {
        let values = [10.0, 20.0, 30.0];
        let accuracy = forecast_accuracy(&values, &values).unwrap();
        assert_eq!(accuracy.mae, 0.0);
        assert_eq!(accuracy.rmse, 0.0);
        assert_eq!(accuracy.smape, 0.0);
        assert_eq!(accuracy.count, 3);
    }

    #[test]
    fn test_known_errors() {
        let accuracy = forecast_accuracy(&[110.0, 90.0], &[100.0, 100.0]).unwrap();
        assert!((accuracy.mae - 10.0).abs() < 1e-12);
        assert!((accuracy.rmse - 10.0).abs() < 1e-12);
        assert!((accuracy.mape - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_actuals_skip_percentage_error() {
        let accuracy = forecast_accuracy(&[1.0, 2.0], &[0.0, 2.0]).unwrap();
        assert_eq!(accuracy.mape, 0.0);
        assert!((accuracy.smape - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }
}
