//! Monthly profit forecasts from a trained model
//!
//! A request names a calendar month after the training data and a number of
//! working days. The service forecasts every day up to the end of that month,
//! then sums the forecasts of the month's first `num_working_days` working
//! days.

use crate::calendar::{parse_month_name, YearMonth};
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::{normal_quantile, ForecastModel, TrainedForecastModel};
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Train `model` on `series`, logging how long it took
pub fn train<M: ForecastModel>(model: &M, series: &HistoricalSeries) -> Result<M::Trained> {
    info!(
        "Training {} on {} days ({} to {})",
        model.name(),
        series.len(),
        series.start_date(),
        series.end_date()
    );
    let started = Instant::now();
    let trained = model.train(series)?;
    info!(
        "Trained {} in {:.2?}",
        trained.name(),
        started.elapsed()
    );
    Ok(trained)
}

/// Service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Level of the interval around the total, in (0, 1)
    pub confidence_level: f64,
    /// Longest supported distance from the training end to the last day of
    /// the target month
    pub max_horizon_days: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            max_horizon_days: 730,
        }
    }
}

/// Month and working-day count to forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub target_month: YearMonth,
    pub num_working_days: usize,
}

impl ForecastRequest {
    pub fn new(target_month: YearMonth, num_working_days: usize) -> Self {
        Self {
            target_month,
            num_working_days,
        }
    }
}

/// Interval around a forecast total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

/// Forecast for one summed day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub profit: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Answer to a [`ForecastRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub target_month: YearMonth,
    pub month_name: String,
    pub num_working_days: usize,
    pub available_working_days: usize,
    pub predicted_total_profit: f64,
    pub confidence_interval: Option<ConfidenceInterval>,
    /// The working days that were summed, in date order
    pub days: Vec<DailyForecast>,
    pub model: String,
}

impl ForecastResult {
    /// Two-line text summary
    pub fn summary(&self) -> String {
        format!(
            "Selected month: {}, Number of working days: {}\nEstimated total profit: {:.2} USD",
            self.month_name, self.num_working_days, self.predicted_total_profit
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Answers forecast requests with a shared trained model
#[derive(Debug)]
pub struct ForecastService<M: TrainedForecastModel + ?Sized> {
    model: Arc<M>,
    config: ServiceConfig,
}

impl<M: TrainedForecastModel + ?Sized> Clone for ForecastService<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            config: self.config.clone(),
        }
    }
}

impl<M: TrainedForecastModel + ?Sized> ForecastService<M> {
    /// Create a service, validating the settings
    pub fn new(model: Arc<M>, config: ServiceConfig) -> Result<Self> {
        normal_quantile(config.confidence_level)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        if config.max_horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "Maximum horizon must be at least one day".to_string(),
            ));
        }

        Ok(Self { model, config })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Last day of the training data
    pub fn training_end(&self) -> NaiveDate {
        self.model.training_end()
    }

    /// Working days of `month` under the model's calendar
    pub fn working_days(&self, month: YearMonth) -> Vec<NaiveDate> {
        self.model.schema().marker().working_days(month)
    }

    /// Resolve `"2024-01"` to that month, or an English month name to its
    /// next occurrence after the training data
    pub fn resolve_month(&self, month: &str) -> Result<YearMonth> {
        let month = month.trim();
        if month.contains('-') {
            return month.parse();
        }

        let number = parse_month_name(month)?;
        YearMonth::next_occurrence(number, self.training_end())
    }

    /// Check a request; returns the horizon in days
    pub fn validate(&self, request: &ForecastRequest) -> Result<usize> {
        let training_end = self.training_end();
        let last_month = YearMonth::containing(training_end);
        if request.target_month <= last_month {
            return Err(ForecastError::ValidationError(format!(
                "Target month {} must come after the training data, which ends in {}",
                request.target_month, last_month
            )));
        }

        let horizon = (request.target_month.last_day() - training_end).num_days() as usize;
        if horizon > self.config.max_horizon_days {
            return Err(ForecastError::ForecastingError(format!(
                "{} is {} days past the training data; the model forecasts at most {} days ahead",
                request.target_month, horizon, self.config.max_horizon_days
            )));
        }

        let available = self.working_days(request.target_month).len();
        if request.num_working_days > available {
            return Err(ForecastError::ValidationError(format!(
                "Not enough working days in {} {}: requested {}, available {}",
                request.target_month.month_name(),
                request.target_month.year(),
                request.num_working_days,
                available
            )));
        }

        Ok(horizon)
    }

    /// Forecast the total profit of the first `num_working_days` working
    /// days of the target month
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        let horizon = self.validate(request)?;
        let first_day = self.training_end() + Duration::days(1);
        let dates: Vec<NaiveDate> = first_day.iter_days().take(horizon).collect();
        let future = self.model.schema().future_matrix(&dates);
        let path = self.model.forecast(&future)?;

        let working_days = self.working_days(request.target_month);
        let selected = &working_days[..request.num_working_days];
        let indices = selected
            .iter()
            .map(|date| {
                path.index_of(*date).ok_or_else(|| {
                    ForecastError::ForecastingError(format!("{} is outside the forecast", date))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let level = self.config.confidence_level;
        let sum = path.sum_with_interval(&indices, level)?;
        if ![sum.total, sum.lower, sum.upper].iter().all(|v| v.is_finite()) {
            return Err(ForecastError::ForecastingError(format!(
                "Forecast for {} is not a finite number",
                request.target_month
            )));
        }

        let z = normal_quantile(level)?;
        let days = indices
            .iter()
            .map(|i| {
                let profit = path.values()[*i];
                let margin = z * path.variance(*i).sqrt();
                DailyForecast {
                    date: first_day + Duration::days(*i as i64),
                    profit,
                    lower: profit - margin,
                    upper: profit + margin,
                }
            })
            .collect();

        debug!(
            "{} working days of {} summed from a {}-day forecast",
            indices.len(),
            request.target_month,
            horizon
        );
        info!(
            "Forecast {} with {} working days: {:.2}",
            request.target_month, request.num_working_days, sum.total
        );

        Ok(ForecastResult {
            target_month: request.target_month,
            month_name: request.target_month.month_name().to_string(),
            num_working_days: request.num_working_days,
            available_working_days: working_days.len(),
            predicted_total_profit: sum.total,
            confidence_interval: Some(ConfidenceInterval {
                lower: sum.lower,
                upper: sum.upper,
                level,
            }),
            days,
            model: self.model.name().to_string(),
        })
    }

    /// Forecast a month given by name or as `YYYY-MM`
    pub fn forecast_month_name(&self, month: &str, num_working_days: usize) -> Result<ForecastResult> {
        let target_month = self.resolve_month(month)?;
        self.forecast(&ForecastRequest::new(target_month, num_working_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SpecialDayMarker;
    use crate::models::{ExogenousSchema, Sarimax, SarimaxOrder, TrainedSarimax};

    fn trained() -> TrainedSarimax {
        let marker = SpecialDayMarker::default();
        let values: Vec<f64> = (0..120).map(|t| 1000.0 + (t % 7) as f64 * 10.0).collect();
        let start = NaiveDate::from_ymd_opt(2023, 9, 3).unwrap();
        let series = HistoricalSeries::from_values(start, &values, &marker).unwrap();

        let schema = ExogenousSchema::new(marker).with_month_dummies(false);
        let model = Sarimax::new(SarimaxOrder::new(1, 0, 0), schema).unwrap();
        train(&model, &series).unwrap()
    }

    fn service() -> ForecastService<TrainedSarimax> {
        ForecastService::new(Arc::new(trained()), ServiceConfig::default()).unwrap()
    }

    #[test]
    fn test_training_ends_in_december() {
        // 2023-09-03 + 119 days
        assert_eq!(service().training_end(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_resolve_month() {
        let service = service();
        assert_eq!(service.resolve_month("january").unwrap(), YearMonth::new(2024, 1).unwrap());
        assert_eq!(service.resolve_month("Dec").unwrap(), YearMonth::new(2024, 12).unwrap());
        assert_eq!(service.resolve_month("2025-03").unwrap(), YearMonth::new(2025, 3).unwrap());
        assert!(service.resolve_month("Smarch").is_err());
    }

    #[test]
    fn test_summary_format() {
        let result = service().forecast_month_name("February", 3).unwrap();
        let summary = result.summary();
        assert!(summary.starts_with("Selected month: February, Number of working days: 3\n"));
        assert!(summary.ends_with(" USD"));
        assert_eq!(result.days.len(), 3);
        assert_eq!(result.days[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_total_is_sum_of_days() {
        let result = service().forecast_month_name("2024-01", 10).unwrap();
        let total: f64 = result.days.iter().map(|d| d.profit).sum();
        assert!((result.predicted_total_profit - total).abs() < 1e-9);
        // New Year's Day is a holiday and is not summed
        assert!(result.days.iter().all(|d| d.date != NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn test_horizon_limit() {
        let config = ServiceConfig {
            max_horizon_days: 40,
            ..ServiceConfig::default()
        };
        let service = ForecastService::new(Arc::new(trained()), config).unwrap();
        assert!(service.forecast_month_name("2024-01", 5).is_ok());
        assert!(matches!(
            service.forecast_month_name("2024-02", 5),
            Err(ForecastError::ForecastingError(_))
        ));
    }

    #[test]
    fn test_invalid_config() {
        let config = ServiceConfig {
            confidence_level: 1.5,
            ..ServiceConfig::default()
        };
        assert!(ForecastService::new(Arc::new(trained()), config).is_err());
    }
}
