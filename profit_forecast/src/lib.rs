//! # Profit Forecast
//!
//! Daily profit forecasting with a seasonal ARIMA model and exogenous
//! calendar regressors.
//!
//! ## Features
//!
//! - Synthetic daily profit histories with trend, seasonality, weekend and
//!   holiday markers
//! - Configurable weekend days and holiday calendars
//! - SARIMAX estimation with automatic order selection
//! - Monthly totals over a chosen number of working days, with confidence
//!   intervals
//!
//! ## Quick Start
//!
//! ```no_run
//! use profit_forecast::calendar::SpecialDayMarker;
//! use profit_forecast::generator::{DatasetGenerator, GeneratorConfig};
//! use profit_forecast::models::{AutoSarimax, ExogenousSchema, SearchConfig};
//! use profit_forecast::service::{train, ForecastService, ServiceConfig};
//! use std::sync::Arc;
//!
//! # fn main() -> profit_forecast::Result<()> {
//! let marker = SpecialDayMarker::default();
//! let history = DatasetGenerator::new(GeneratorConfig::default(), marker.clone())?.generate()?;
//!
//! let model = AutoSarimax::new(SearchConfig::default(), ExogenousSchema::new(marker))?;
//! let trained = train(&model, &history)?;
//!
//! let service = ForecastService::new(Arc::new(trained), ServiceConfig::default())?;
//! let result = service.forecast_month_name("January", 20)?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod data;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use crate::calendar::{HolidayCalendar, SpecialDayMarker, YearMonth};
pub use crate::data::{DataLoader, HistoricalSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, TrainedForecastModel};
pub use crate::service::{ForecastRequest, ForecastResult, ForecastService};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
