//! Server configuration from environment variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PORT` | 7860 |
//! | `BIND_ADDR` | 127.0.0.1 |
//! | `PROFIT_SEED` | 42 (`random` for an entropy seed) |
//! | `PROFIT_HISTORY_YEARS` | 4 |
//! | `PROFIT_START_DATE` | 2020-01-01 |
//! | `PROFIT_SEASONAL_PERIOD` | 7 |
//! | `PROFIT_MAX_ORDER` | 3 |
//! | `PROFIT_CONFIDENCE` | 0.95 |
//! | `PROFIT_HOLIDAYS_CSV` | unset: January 1 and July 4 |
//! | `PROFIT_DATASET_CSV` | unset: generate the history |

use chrono::NaiveDate;
use profit_forecast::calendar::{HolidayCalendar, SpecialDayMarker};
use profit_forecast::generator::GeneratorConfig;
use profit_forecast::models::SearchConfig;
use profit_forecast::service::ServiceConfig;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to build its model and listen
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub seed: Option<u64>,
    pub history_years: u32,
    pub start_date: NaiveDate,
    pub seasonal_period: usize,
    pub max_order: usize,
    pub confidence: f64,
    pub holidays_csv: Option<PathBuf>,
    pub dataset_csv: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 7860,
            seed: generator.seed,
            history_years: generator.years,
            start_date: generator.start_date,
            seasonal_period: 7,
            max_order: 3,
            confidence: 0.95,
            holidays_csv: None,
            dataset_csv: None,
        }
    }
}

impl AppConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = match lookup("PROFIT_SEED") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("random") => None,
            Some(raw) => Some(parse_value("PROFIT_SEED", &raw)?),
            None => defaults.seed,
        };

        let start_date = match lookup("PROFIT_START_DATE") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                ConfigError::InvalidValue {
                    key: "PROFIT_START_DATE",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.start_date,
        };

        let config = Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            seed,
            history_years: parse_or(&lookup, "PROFIT_HISTORY_YEARS", defaults.history_years)?,
            start_date,
            seasonal_period: parse_or(&lookup, "PROFIT_SEASONAL_PERIOD", defaults.seasonal_period)?,
            max_order: parse_or(&lookup, "PROFIT_MAX_ORDER", defaults.max_order)?,
            confidence: parse_or(&lookup, "PROFIT_CONFIDENCE", defaults.confidence)?,
            holidays_csv: lookup("PROFIT_HOLIDAYS_CSV").map(PathBuf::from),
            dataset_csv: lookup("PROFIT_DATASET_CSV").map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, value: String, reason: &str| ConfigError::InvalidValue {
            key,
            value,
            reason: reason.to_string(),
        };

        if self.history_years == 0 {
            return Err(invalid("PROFIT_HISTORY_YEARS", "0".to_string(), "must be at least 1"));
        }
        if self.seasonal_period < 2 {
            return Err(invalid(
                "PROFIT_SEASONAL_PERIOD",
                self.seasonal_period.to_string(),
                "must be at least 2",
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(invalid(
                "PROFIT_CONFIDENCE",
                self.confidence.to_string(),
                "must be between 0 and 1",
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Weekend and holiday marker; holidays come from `PROFIT_HOLIDAYS_CSV`
    /// when set
    pub fn marker(&self) -> profit_forecast::Result<SpecialDayMarker> {
        let holidays = match &self.holidays_csv {
            Some(path) => HolidayCalendar::from_csv(path)?,
            None => HolidayCalendar::official(),
        };
        Ok(SpecialDayMarker::new(
            SpecialDayMarker::default().weekend_days().to_vec(),
            holidays,
        ))
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::default()
            .with_start_date(self.start_date)
            .with_years(self.history_years)
            .with_seed(self.seed)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            period: self.seasonal_period,
            ..SearchConfig::default().with_max_orders(self.max_order)
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            confidence_level: self.confidence,
            ..ServiceConfig::default()
        }
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:7860");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.search_config().period, 7);
        assert_eq!(config.search_config().max_seasonal_q, 3);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("BIND_ADDR", "0.0.0.0"),
            ("PROFIT_SEED", "random"),
            ("PROFIT_HISTORY_YEARS", "3"),
            ("PROFIT_START_DATE", "2019-06-01"),
            ("PROFIT_MAX_ORDER", "2"),
            ("PROFIT_CONFIDENCE", "0.9"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.seed, None);
        assert_eq!(config.generator_config().years, 3);
        assert_eq!(
            config.generator_config().start_date,
            NaiveDate::from_ymd_opt(2019, 6, 1).unwrap()
        );
        assert_eq!(config.search_config().max_p, 2);
        assert_eq!(config.service_config().confidence_level, 0.9);
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("PROFIT_CONFIDENCE", "1.2")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("PROFIT_SEASONAL_PERIOD", "1")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("PROFIT_START_DATE", "01/01/2020")])).is_err());

        let err = AppConfig::from_lookup(lookup(&[("PROFIT_HISTORY_YEARS", "0")])).unwrap_err();
        assert!(err.to_string().contains("PROFIT_HISTORY_YEARS"));
    }

    #[test]
    fn test_missing_holiday_file() {
        let config = AppConfig {
            holidays_csv: Some(PathBuf::from("/nonexistent/holidays.csv")),
            ..AppConfig::default()
        };
        assert!(config.marker().is_err());
    }
}
