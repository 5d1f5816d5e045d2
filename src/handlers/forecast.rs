// src/handlers/forecast.rs
use super::error::ApiError;
use crate::app::SharedState;
use log::{error, info};
use profit_forecast::TrainedForecastModel;
use serde::Deserialize;
use warp::reply::Json;
use warp::Rejection;

/// Body of `POST /api/v1/forecast`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastBody {
    /// English month name or `YYYY-MM`
    pub month: String,
    pub working_days: usize,
}

pub async fn post_forecast(body: ForecastBody, state: SharedState) -> Result<Json, Rejection> {
    info!(
        "Handling forecast request for {} with {} working days",
        body.month, body.working_days
    );

    let result = state
        .service
        .forecast_month_name(&body.month, body.working_days)
        .map_err(|e| {
            error!("Forecast for {} failed: {}", body.month, e);
            warp::reject::custom(ApiError::from(e))
        })?;

    Ok(warp::reply::json(&result))
}

pub async fn get_model(state: SharedState) -> Result<Json, Rejection> {
    info!("Handling request for the model summary.");
    Ok(warp::reply::json(&state.service.model().summary()))
}

pub async fn get_monthly_history(state: SharedState) -> Result<Json, Rejection> {
    info!("Handling request for monthly profit history.");
    Ok(warp::reply::json(&state.history.monthly_totals()))
}
