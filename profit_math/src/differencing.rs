//! Regular and seasonal differencing
//!
//! The combined operator `(1 - B)^d (1 - B^s)^D` is expanded once into a
//! lag polynomial; applying it drops the first `degree` observations and
//! integrating it back needs the last `degree` observations of the levels.

use crate::polynomial::LagPolynomial;
use crate::{MathError, Result};

/// Combined regular and seasonal differencing operator
#[derive(Debug, Clone, PartialEq)]
pub struct Differencer {
    d: usize,
    seasonal_d: usize,
    period: usize,
    polynomial: LagPolynomial,
}

impl Differencer {
    /// Create the operator `(1 - B)^d (1 - B^period)^seasonal_d`
    pub fn new(d: usize, seasonal_d: usize, period: usize) -> Result<Self> {
        if seasonal_d > 0 && period < 2 {
            return Err(MathError::InvalidInput(format!(
                "Seasonal differencing needs a period of at least 2, got {}",
                period
            )));
        }

        let regular = LagPolynomial::difference(1, d)?;
        let polynomial = if seasonal_d > 0 {
            regular.multiply(&LagPolynomial::difference(period, seasonal_d)?)
        } else {
            regular
        };

        Ok(Self {
            d,
            seasonal_d,
            period,
            polynomial,
        })
    }

    /// Number of leading observations consumed by the operator
    pub fn order(&self) -> usize {
        self.polynomial.degree()
    }

    /// Regular differencing order
    pub fn d(&self) -> usize {
        self.d
    }

    /// Seasonal differencing order
    pub fn seasonal_d(&self) -> usize {
        self.seasonal_d
    }

    /// Seasonal period
    pub fn period(&self) -> usize {
        self.period
    }

    /// The expanded differencing polynomial
    pub fn polynomial(&self) -> &LagPolynomial {
        &self.polynomial
    }

    /// Apply the operator; the result has `len - order()` values
    pub fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        let order = self.order();
        if series.len() <= order {
            return Err(MathError::InsufficientData(format!(
                "Differencing of order {} needs more than {} observations, got {}",
                order,
                order,
                series.len()
            )));
        }

        let lags = self.polynomial.nonzero_lags();
        Ok((order..series.len())
            .map(|t| {
                lags.iter()
                    .fold(series[t], |acc, (lag, c)| acc + c * series[t - lag])
            })
            .collect())
    }

    /// Undo the operator for values that follow `history`.
    ///
    /// `differenced` holds the differenced values for the periods right
    /// after the end of `history`; the returned vector holds the matching
    /// levels.
    pub fn integrate(&self, history: &[f64], differenced: &[f64]) -> Result<Vec<f64>> {
        let order = self.order();
        if history.len() < order {
            return Err(MathError::InsufficientData(format!(
                "Integration needs the last {} observations, got {}",
                order,
                history.len()
            )));
        }

        let lags = self.polynomial.nonzero_lags();
        let mut levels: Vec<f64> = history[history.len() - order..].to_vec();
        for w in differenced {
            let t = levels.len();
            let value = lags
                .iter()
                .fold(*w, |acc, (lag, c)| acc - c * levels[t - lag]);
            levels.push(value);
        }

        Ok(levels.split_off(order))
    }
}

/// Simple lag difference `y_t - y_{t-lag}`
pub fn difference(series: &[f64], lag: usize) -> Result<Vec<f64>> {
    if lag == 0 {
        return Err(MathError::InvalidInput(
            "Differencing lag must be greater than zero".to_string(),
        ));
    }
    if series.len() <= lag {
        return Err(MathError::InsufficientData(format!(
            "Lag {} difference needs more than {} observations, got {}",
            lag,
            lag,
            series.len()
        )));
    }

    Ok((lag..series.len()).map(|t| series[t] - series[t - lag]).collect())
}
