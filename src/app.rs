//! Shared server state: the training history and the forecast service

use crate::config::AppConfig;
use anyhow::Context;
use log::info;
use profit_forecast::data::{DataLoader, HistoricalSeries};
use profit_forecast::generator::DatasetGenerator;
use profit_forecast::models::{AutoSarimax, ExogenousSchema, TrainedSarimax};
use profit_forecast::service::{train, ForecastService};
use std::sync::Arc;

/// Read-only state handed to every request
#[derive(Debug)]
pub struct AppState {
    pub history: HistoricalSeries,
    pub service: ForecastService<TrainedSarimax>,
}

pub type SharedState = Arc<AppState>;

/// Load or generate the history and train the model. Blocking; run it off
/// the async executor.
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let marker = config.marker().context("Failed to load the holiday calendar")?;

    let history = match &config.dataset_csv {
        Some(path) => {
            info!("Loading profit history from {}", path.display());
            DataLoader::from_csv(path, &marker)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => {
            info!(
                "Generating {} years of synthetic profit from {} (seed {:?})",
                config.history_years, config.start_date, config.seed
            );
            DatasetGenerator::new(config.generator_config(), marker.clone())?.generate()?
        }
    };

    let model = AutoSarimax::new(config.search_config(), ExogenousSchema::new(marker))?;
    let trained = train(&model, &history).context("Model training failed")?;
    let service = ForecastService::new(Arc::new(trained), config.service_config())?;

    Ok(AppState { history, service })
}
