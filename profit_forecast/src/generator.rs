//! Synthetic daily profit history
//!
//! Profit for day `t` of `n` is
//!
//! ```text
//! |N(base, noise_std)|
//!   + annual_amplitude * sin(2 pi t / 365)
//!   + weekly_amplitude * sin(2 pi t / 7)
//!   + trend_total * t / (n - 1)
//! ```
//!
//! scaled by `weekend_factor` / `holiday_factor` on flagged days.

use crate::calendar::SpecialDayMarker;
use crate::data::{DailyRecord, HistoricalSeries};
use crate::error::{ForecastError, Result};
use chrono::{Months, NaiveDate};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shape of the synthetic series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// First day of the history
    pub start_date: NaiveDate,
    /// Length of the history in whole years
    pub years: u32,
    /// Mean of the daily noise term
    pub base_profit: f64,
    /// Standard deviation of the daily noise term
    pub noise_std: f64,
    /// Amplitude of the yearly sine wave
    pub annual_amplitude: f64,
    /// Amplitude of the weekly sine wave
    pub weekly_amplitude: f64,
    /// Linear trend added by the last day
    pub trend_total: f64,
    /// Profit multiplier on weekend days
    pub weekend_factor: f64,
    /// Profit multiplier on holidays
    pub holiday_factor: f64,
    /// RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            years: 4,
            base_profit: 1000.0,
            noise_std: 200.0,
            annual_amplitude: 200.0,
            weekly_amplitude: 0.0,
            trend_total: 500.0,
            weekend_factor: 1.0,
            holiday_factor: 1.0,
            seed: Some(42),
        }
    }
}

impl GeneratorConfig {
    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    /// Last day of the history: the day before `start_date + years`
    pub fn end_date(&self) -> Result<NaiveDate> {
        self.start_date
            .checked_add_months(Months::new(self.years.saturating_mul(12)))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "{} years from {} is outside the supported calendar",
                    self.years, self.start_date
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        if self.years == 0 {
            return Err(ForecastError::InvalidParameter(
                "History length must be at least one year".to_string(),
            ));
        }
        if !(self.noise_std > 0.0 && self.noise_std.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Noise standard deviation must be a positive finite number".to_string(),
            ));
        }
        let finite = [
            self.base_profit,
            self.annual_amplitude,
            self.weekly_amplitude,
            self.trend_total,
            self.weekend_factor,
            self.holiday_factor,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(
                "Generator parameters must be finite numbers".to_string(),
            ));
        }
        self.end_date().map(|_| ())
    }
}

/// Produces synthetic [`HistoricalSeries`]
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    config: GeneratorConfig,
    marker: SpecialDayMarker,
}

impl DatasetGenerator {
    /// Create a generator, validating the configuration
    pub fn new(config: GeneratorConfig, marker: SpecialDayMarker) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, marker })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the history. Identical seeds give identical series.
    pub fn generate(&self) -> Result<HistoricalSeries> {
        let cfg = &self.config;
        let end = cfg.end_date()?;
        let n = (end - cfg.start_date).num_days() as usize + 1;

        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let noise = Normal::new(cfg.base_profit, cfg.noise_std)
            .map_err(|e| ForecastError::InvalidParameter(format!("Invalid noise distribution: {}", e)))?;

        let trend_step = if n > 1 {
            cfg.trend_total / (n - 1) as f64
        } else {
            0.0
        };

        let records: Vec<DailyRecord> = cfg
            .start_date
            .iter_days()
            .take(n)
            .enumerate()
            .map(|(t, date)| {
                let t_f = t as f64;
                let mut profit = noise.sample(&mut rng).abs()
                    + cfg.annual_amplitude * (2.0 * PI * t_f / 365.0).sin()
                    + cfg.weekly_amplitude * (2.0 * PI * t_f / 7.0).sin()
                    + trend_step * t_f;

                let flags = self.marker.mark(date);
                if flags.is_weekend {
                    profit *= cfg.weekend_factor;
                }
                if flags.is_holiday {
                    profit *= cfg.holiday_factor;
                }

                DailyRecord {
                    date,
                    profit,
                    is_weekend: flags.is_weekend,
                    is_holiday: flags.is_holiday,
                }
            })
            .collect();

        debug!(
            "Generated {} days of synthetic profit from {} to {}",
            records.len(),
            cfg.start_date,
            end
        );

        HistoricalSeries::new(records)
    }
}
