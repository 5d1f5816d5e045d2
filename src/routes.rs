// src/routes.rs
use crate::app::SharedState;
use crate::handlers::error::ApiError;
use crate::handlers::forecast::{get_model, get_monthly_history, post_forecast};
use crate::handlers::page::index;
use log::{info, warn};
use std::convert::Infallible;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 16 * 1024;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status, api_error.message.clone())
    } else if let Some(body_error) = err.find::<BodyDeserializeError>() {
        let api_error = ApiError::bad_request(format!("Invalid request body: {}", body_error));
        (api_error.status, api_error.message)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large".to_string())
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: SharedState) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let index_route = warp::path::end().and(warp::get()).and_then(index);

    let health_route = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "status": "ok" })));

    let forecast_route = warp::path!("api" / "v1" / "forecast")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(post_forecast);

    let model_route = warp::path!("api" / "v1" / "model")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_model);

    let history_route = warp::path!("api" / "v1" / "history" / "monthly")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_monthly_history);

    info!("All routes configured successfully.");

    index_route
        .or(health_route)
        .or(forecast_route)
        .or(model_route)
        .or(history_route)
        .recover(handle_rejection)
        .with(warp::log("profit_predictor::http"))
}
