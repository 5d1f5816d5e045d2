//! Forecasting models for daily profit series

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::ForecastAccuracy;
use chrono::{Duration, NaiveDate};
use profit_math::criteria::InformationCriteria;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;
use std::str::FromStr;

pub mod auto;
pub mod exogenous;
pub mod sarimax;

pub use auto::{AutoSarimax, SearchConfig, SearchStrategy};
pub use exogenous::{ExogenousMatrix, ExogenousSchema};
pub use sarimax::{Sarimax, SarimaxOrder, TrainedSarimax};

/// Two-sided standard normal quantile for a confidence level in (0, 1)
pub fn normal_quantile(confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(ForecastError::ValidationError(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence
        )));
    }

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::ForecastingError(format!("Normal distribution: {}", e)))?;
    Ok(normal.inverse_cdf(0.5 + confidence / 2.0))
}

/// Point forecasts for consecutive days after the training end, with the
/// psi weights that describe how forecast errors accumulate
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPath {
    start_date: NaiveDate,
    values: Vec<f64>,
    psi_weights: Vec<f64>,
    sigma2: f64,
}

/// Forecast of a sum of days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumForecast {
    pub total: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPath {
    /// Create a path; `psi_weights` must cover every horizon
    pub fn new(
        start_date: NaiveDate,
        values: Vec<f64>,
        psi_weights: Vec<f64>,
        sigma2: f64,
    ) -> Result<Self> {
        if psi_weights.len() < values.len() {
            return Err(ForecastError::ValidationError(format!(
                "{} psi weights cannot describe {} horizons",
                psi_weights.len(),
                values.len()
            )));
        }
        if !(sigma2 >= 0.0 && sigma2.is_finite()) {
            return Err(ForecastError::ForecastingError(format!(
                "Innovation variance must be finite and non-negative, got {}",
                sigma2
            )));
        }

        Ok(Self {
            start_date,
            values,
            psi_weights,
            sigma2,
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of days forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// First forecast day
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Date of each forecast value
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start_date.iter_days().take(self.values.len()).collect()
    }

    /// Index of `date` in the path, if it is covered
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start_date).num_days();
        if offset >= 0 && (offset as usize) < self.values.len() {
            Some(offset as usize)
        } else {
            None
        }
    }

    /// Forecast error variance of the value at `index`
    pub fn variance(&self, index: usize) -> f64 {
        let upto = (index + 1).min(self.psi_weights.len());
        self.sigma2
            * self.psi_weights[..upto]
                .iter()
                .map(|psi| psi * psi)
                .sum::<f64>()
    }

    /// Per-day confidence intervals at `confidence_level`
    pub fn confidence_intervals(&self, confidence_level: f64) -> Result<Vec<(f64, f64)>> {
        let z = normal_quantile(confidence_level)?;

        Ok(self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let margin = z * self.variance(i).sqrt();
                (v - margin, v + margin)
            })
            .collect())
    }

    /// Sum of the values at `indices`, with a confidence interval that
    /// accounts for the correlation of errors across days.
    ///
    /// An empty index set gives exactly zero with a zero-width interval.
    pub fn sum_with_interval(&self, indices: &[usize], confidence_level: f64) -> Result<SumForecast> {
        let z = normal_quantile(confidence_level)?;
        if let Some(bad) = indices.iter().find(|i| **i >= self.values.len()) {
            return Err(ForecastError::ValidationError(format!(
                "Index {} is outside the {}-day forecast",
                bad,
                self.values.len()
            )));
        }

        let total: f64 = indices.iter().map(|i| self.values[*i]).sum();
        let last = match indices.iter().max() {
            Some(last) => *last,
            None => {
                return Ok(SumForecast {
                    total: 0.0,
                    std_error: 0.0,
                    lower: 0.0,
                    upper: 0.0,
                })
            }
        };

        // Error of day i is sum_{m <= i} psi_{i-m} e_m; collect the weight
        // of each shock e_m across the summed days
        let variance: f64 = (0..=last)
            .map(|m| {
                let weight: f64 = indices
                    .iter()
                    .filter(|i| **i >= m)
                    .map(|i| self.psi_weights[i - m])
                    .sum();
                weight * weight
            })
            .sum::<f64>()
            * self.sigma2;

        let std_error = variance.sqrt();
        Ok(SumForecast {
            total,
            std_error,
            lower: total - z * std_error,
            upper: total + z * std_error,
        })
    }
}

/// Criterion minimised by the order search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    #[default]
    Aic,
    Aicc,
    Bic,
}

impl InformationCriterion {
    /// The value of this criterion in `criteria`
    pub fn score(&self, criteria: &InformationCriteria) -> f64 {
        match self {
            InformationCriterion::Aic => criteria.aic,
            InformationCriterion::Aicc => criteria.aicc,
            InformationCriterion::Bic => criteria.bic,
        }
    }
}

impl FromStr for InformationCriterion {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aic" => Ok(InformationCriterion::Aic),
            "aicc" => Ok(InformationCriterion::Aicc),
            "bic" => Ok(InformationCriterion::Bic),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown information criterion '{}'; use aic, aicc or bic",
                other
            ))),
        }
    }
}

/// Named regression coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub value: f64,
}

/// Description of a trained model for display and the HTTP API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub order: SarimaxOrder,
    pub training_start: NaiveDate,
    pub training_end: NaiveDate,
    pub observations: usize,
    pub sigma2: f64,
    pub criteria: InformationCriteria,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    pub exogenous: Vec<Coefficient>,
    pub in_sample: ForecastAccuracy,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug + Send + Sync {
    /// Forecast the days following the training end. `future` holds one
    /// exogenous row per day, starting the day after the training end.
    fn forecast(&self, future: &ExogenousMatrix) -> Result<ForecastPath>;

    /// Schema the model was fitted with, used to build `future`
    fn schema(&self) -> &ExogenousSchema;

    /// Last day of the training data
    fn training_end(&self) -> NaiveDate;

    /// Model description
    fn summary(&self) -> ModelSummary;

    /// Name of the model
    fn name(&self) -> &str;

    /// Forecast the next `horizon` days, building the exogenous rows from
    /// the fitted schema
    fn forecast_days(&self, horizon: usize) -> Result<ForecastPath> {
        let start = self.training_end() + Duration::days(1);
        let dates: Vec<NaiveDate> = start.iter_days().take(horizon).collect();
        let future = self.schema().future_matrix(&dates);
        self.forecast(&future)
    }
}

/// Forecast model that can be trained on a profit history
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a historical series
    fn train(&self, data: &HistoricalSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(values: Vec<f64>, psi: Vec<f64>, sigma2: f64) -> ForecastPath {
        ForecastPath::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values, psi, sigma2).unwrap()
    }

    #[test]
    fn test_normal_quantile() {
        assert!((normal_quantile(0.95).unwrap() - 1.959964).abs() < 1e-5);
        assert!(normal_quantile(1.0).is_err());
        assert!(normal_quantile(0.0).is_err());
    }

    #[test]
    fn test_random_walk_sum_variance() {
        // psi = 1 for every lag: error of day i has variance (i + 1) sigma2
        let p = path(vec![1.0; 3], vec![1.0; 3], 1.0);
        assert_eq!(p.variance(2), 3.0);

        // Sum of days 0 and 2: shock 0 weighs 2, shocks 1 and 2 weigh 1
        let sum = p.sum_with_interval(&[0, 2], 0.95).unwrap();
        assert_eq!(sum.total, 2.0);
        assert!((sum.std_error - 6f64.sqrt()).abs() < 1e-12);
        assert!(sum.lower < sum.total && sum.total < sum.upper);
    }

    #[test]
    fn test_white_noise_sum_variance() {
        let p = path(vec![2.0, 3.0, 4.0], vec![1.0, 0.0, 0.0], 4.0);
        let sum = p.sum_with_interval(&[0, 1, 2], 0.95).unwrap();
        assert_eq!(sum.total, 9.0);
        assert!((sum.std_error - 12f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let p = path(vec![5.0, 6.0], vec![1.0, 0.5], 1.0);
        let sum = p.sum_with_interval(&[], 0.95).unwrap();
        assert_eq!(sum.total, 0.0);
        assert_eq!((sum.lower, sum.upper), (0.0, 0.0));
        assert!(p.sum_with_interval(&[2], 0.95).is_err());
    }

    #[test]
    fn test_dates_and_index() {
        let p = path(vec![1.0; 40], vec![1.0; 40], 1.0);
        let dates = p.dates();
        assert_eq!(dates.len(), 40);
        assert_eq!(p.index_of(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()), Some(31));
        assert_eq!(p.index_of(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()), None);
    }

    #[test]
    fn test_criterion_parsing() {
        assert_eq!("AICc".parse::<InformationCriterion>().unwrap(), InformationCriterion::Aicc);
        assert!("hqic".parse::<InformationCriterion>().is_err());
    }
}
