//! Descriptive statistics over `f64` slices

use crate::{MathError, Result};

/// Arithmetic mean of the values
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot calculate mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by `n`)
pub fn variance(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    Ok(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> Result<f64> {
    Ok(variance(values)?.sqrt())
}

/// Sample autocovariance at `lag`, normalised by the series length
pub fn autocovariance(values: &[f64], lag: usize) -> Result<f64> {
    if lag >= values.len() {
        return Err(MathError::InsufficientData(format!(
            "Lag {} requires more than {} observations",
            lag,
            values.len()
        )));
    }

    let m = mean(values)?;
    let sum: f64 = values
        .iter()
        .zip(values.iter().skip(lag))
        .map(|(a, b)| (a - m) * (b - m))
        .sum();

    Ok(sum / values.len() as f64)
}

/// Sum of squares of the values
pub fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

        assert!((mean(&values).unwrap() - 5.0).abs() < 1e-12);
        assert!((variance(&values).unwrap() - 4.0).abs() < 1e-12);
        assert!((std_dev(&values).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_series() {
        assert!(mean(&[]).is_err());
        assert!(variance(&[]).is_err());
    }

    #[test]
    fn test_autocovariance() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // lag 0 equals the population variance
        let gamma0 = autocovariance(&values, 0).unwrap();
        assert!((gamma0 - variance(&values).unwrap()).abs() < 1e-12);

        // (-1.5*-0.5 + -0.5*0.5 + 0.5*1.5) / 4
        let gamma1 = autocovariance(&values, 1).unwrap();
        assert!((gamma1 - 0.3125).abs() < 1e-12);

        assert!(autocovariance(&values, 4).is_err());
    }
}
