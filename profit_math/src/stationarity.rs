//! KPSS level-stationarity test and differencing-order selection

use crate::differencing::difference;
use crate::stats::{mean, sum_of_squares, variance};
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Critical values of the KPSS level statistic (Kwiatkowski et al. 1992, table 1)
const LEVEL_CRITICAL_VALUES: [(f64, f64); 4] =
    [(0.10, 0.347), (0.05, 0.463), (0.025, 0.574), (0.01, 0.739)];

/// Result of a KPSS level-stationarity test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpssResult {
    /// Test statistic
    pub statistic: f64,
    /// Bartlett window truncation lag used for the long-run variance
    pub lags: usize,
    /// Critical value at the requested significance level
    pub critical_value: f64,
}

impl KpssResult {
    /// The null of level stationarity is kept when the statistic does not
    /// exceed the critical value
    pub fn is_stationary(&self) -> bool {
        self.statistic <= self.critical_value
    }
}

/// Critical value of the KPSS level statistic at significance `alpha`
pub fn kpss_critical_value(alpha: f64) -> Result<f64> {
    LEVEL_CRITICAL_VALUES
        .iter()
        .find(|(level, _)| (level - alpha).abs() < 1e-9)
        .map(|(_, cv)| *cv)
        .ok_or_else(|| {
            MathError::InvalidInput(format!(
                "Unsupported KPSS significance level {}; use 0.10, 0.05, 0.025 or 0.01",
                alpha
            ))
        })
}

/// KPSS test of the null hypothesis that `series` is level stationary
pub fn kpss_level_test(series: &[f64], alpha: f64) -> Result<KpssResult> {
    let critical_value = kpss_critical_value(alpha)?;
    let n = series.len();
    if n < 3 {
        return Err(MathError::InsufficientData(format!(
            "KPSS test needs at least 3 observations, got {}",
            n
        )));
    }

    let m = mean(series)?;
    let residuals: Vec<f64> = series.iter().map(|v| v - m).collect();

    let mut partial_sum = 0.0;
    let mut eta = 0.0;
    for e in &residuals {
        partial_sum += e;
        eta += partial_sum * partial_sum;
    }
    let nf = n as f64;
    eta /= nf * nf;

    let lags = (3.0 * nf.sqrt() / 13.0).trunc() as usize;
    let mut long_run = sum_of_squares(&residuals) / nf;
    for lag in 1..=lags.min(n - 1) {
        let weight = 1.0 - lag as f64 / (lags as f64 + 1.0);
        let cov: f64 = residuals
            .iter()
            .zip(residuals.iter().skip(lag))
            .map(|(a, b)| a * b)
            .sum();
        long_run += 2.0 * weight * cov / nf;
    }

    if long_run <= 0.0 || !long_run.is_finite() {
        return Err(MathError::CalculationError(
            "Long-run variance is not positive".to_string(),
        ));
    }

    Ok(KpssResult {
        statistic: eta / long_run,
        lags,
        critical_value,
    })
}

/// Number of first differences needed before the KPSS test no longer
/// rejects level stationarity, capped at `max_d`
pub fn ndiffs(series: &[f64], alpha: f64, max_d: usize) -> Result<usize> {
    let mut current = series.to_vec();
    let mut d = 0;

    while d < max_d {
        if current.len() < 3 || variance(&current)? == 0.0 {
            break;
        }
        if kpss_level_test(&current, alpha)?.is_stationary() {
            break;
        }
        current = difference(&current, 1)?;
        d += 1;
    }

    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-noise in [-0.5, 0.5)
    fn noise(len: usize) -> Vec<f64> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let series = noise(500);
        let result = kpss_level_test(&series, 0.05).unwrap();
        assert!(result.is_stationary(), "statistic {}", result.statistic);
        assert_eq!(ndiffs(&series, 0.05, 2).unwrap(), 0);
    }

    #[test]
    fn test_trend_needs_differencing() {
        let series: Vec<f64> = noise(500)
            .iter()
            .enumerate()
            .map(|(i, e)| 0.05 * i as f64 + e)
            .collect();
        let result = kpss_level_test(&series, 0.05).unwrap();
        assert!(!result.is_stationary());
        assert_eq!(ndiffs(&series, 0.05, 2).unwrap(), 1);
    }

    #[test]
    fn test_constant_series_needs_nothing() {
        assert_eq!(ndiffs(&[3.0; 50], 0.05, 2).unwrap(), 0);
    }

    #[test]
    fn test_critical_values() {
        assert_eq!(kpss_critical_value(0.05).unwrap(), 0.463);
        assert!(kpss_critical_value(0.2).is_err());
        assert!(kpss_level_test(&[1.0, 2.0], 0.05).is_err());
    }
}
