//! Gaussian log-likelihood and information criteria

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Likelihood-based fit statistics of an estimated model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformationCriteria {
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
}

impl InformationCriteria {
    /// Criteria for a Gaussian model with innovation variance `sigma2`
    /// estimated from `n_obs` residuals and `n_params` free parameters
    /// (the variance included).
    ///
    /// AICc is `+inf` when `n_obs <= n_params + 1`.
    pub fn gaussian(sigma2: f64, n_obs: usize, n_params: usize) -> Result<Self> {
        if n_obs == 0 {
            return Err(MathError::InsufficientData(
                "Information criteria need at least one observation".to_string(),
            ));
        }
        if !(sigma2 > 0.0 && sigma2.is_finite()) {
            return Err(MathError::CalculationError(format!(
                "Innovation variance must be positive and finite, got {}",
                sigma2
            )));
        }

        let n = n_obs as f64;
        let k = n_params as f64;
        let log_likelihood = -0.5 * n * ((2.0 * PI * sigma2).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let aicc = if n_obs > n_params + 1 {
            aic + 2.0 * k * (k + 1.0) / (n - k - 1.0)
        } else {
            f64::INFINITY
        };
        let bic = -2.0 * log_likelihood + k * n.ln();

        Ok(Self {
            log_likelihood,
            aic,
            aicc,
            bic,
        })
    }
}
