//! Lag (backshift) polynomials
//!
//! A polynomial `c(B) = c0 + c1 B + c2 B^2 + ...` is stored as its
//! coefficient vector. AR operators use the convention `1 - phi1 B - ...`,
//! MA operators `1 + theta1 B + ...`.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Polynomial in the backshift operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagPolynomial {
    coefficients: Vec<f64>,
}

impl LagPolynomial {
    /// Create a polynomial from raw coefficients, lowest lag first
    pub fn new(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(MathError::InvalidInput(
                "A lag polynomial needs at least the lag-0 coefficient".to_string(),
            ));
        }

        Ok(Self { coefficients })
    }

    /// The identity operator `1`
    pub fn identity() -> Self {
        Self {
            coefficients: vec![1.0],
        }
    }

    /// AR operator `1 - phi1 B - ... - phip B^p`
    pub fn autoregressive(phi: &[f64]) -> Self {
        let mut coefficients = Vec::with_capacity(phi.len() + 1);
        coefficients.push(1.0);
        coefficients.extend(phi.iter().map(|c| -c));
        Self { coefficients }
    }

    /// MA operator `1 + theta1 B + ... + thetaq B^q`
    pub fn moving_average(theta: &[f64]) -> Self {
        let mut coefficients = Vec::with_capacity(theta.len() + 1);
        coefficients.push(1.0);
        coefficients.extend_from_slice(theta);
        Self { coefficients }
    }

    /// Differencing operator `(1 - B^lag)^order`
    pub fn difference(lag: usize, order: usize) -> Result<Self> {
        if lag == 0 {
            return Err(MathError::InvalidInput(
                "Differencing lag must be greater than zero".to_string(),
            ));
        }

        let mut base = vec![0.0; lag + 1];
        base[0] = 1.0;
        base[lag] = -1.0;

        Ok(Self { coefficients: base }.pow(order))
    }

    /// Substitute `B^period` for `B`, turning a seasonal operator in
    /// `B^s` into one in `B`
    pub fn seasonal(&self, period: usize) -> Self {
        if period <= 1 {
            return self.clone();
        }

        let mut coefficients = vec![0.0; self.degree() * period + 1];
        for (i, c) in self.coefficients.iter().enumerate() {
            coefficients[i * period] = *c;
        }
        Self { coefficients }
    }

    /// Product of two polynomials
    pub fn multiply(&self, other: &Self) -> Self {
        let mut coefficients = vec![0.0; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }
        Self { coefficients }
    }

    /// Raise the polynomial to a non-negative integer power
    pub fn pow(&self, exponent: usize) -> Self {
        (0..exponent).fold(Self::identity(), |acc, _| acc.multiply(self))
    }

    /// Highest lag with a stored coefficient
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients, lowest lag first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient at `lag`, zero beyond the degree
    pub fn coefficient(&self, lag: usize) -> f64 {
        self.coefficients.get(lag).copied().unwrap_or(0.0)
    }

    /// Non-zero coefficients at lags >= 1, as `(lag, coefficient)` pairs
    pub fn nonzero_lags(&self) -> Vec<(usize, f64)> {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| **c != 0.0)
            .map(|(lag, c)| (lag, *c))
            .collect()
    }

    /// First `count` coefficients of the power series `ma(B) / ar(B)`.
    ///
    /// With `ar` including any differencing factors these are the psi
    /// weights of the forecast error: the h-step error is
    /// `sum_{j<h} psi_j * e_{T+h-j}`.
    pub fn psi_weights(ar: &Self, ma: &Self, count: usize) -> Result<Vec<f64>> {
        let lead = ar.coefficient(0);
        if lead.abs() < f64::EPSILON {
            return Err(MathError::InvalidInput(
                "AR operator must have a non-zero lag-0 coefficient".to_string(),
            ));
        }

        let ar_lags = ar.nonzero_lags();
        let mut psi: Vec<f64> = Vec::with_capacity(count);
        for j in 0..count {
            let mut value = ma.coefficient(j);
            for (lag, c) in &ar_lags {
                if *lag > j {
                    break;
                }
                value -= c * psi[j - lag];
            }
            psi.push(value / lead);
        }

        Ok(psi)
    }
}
