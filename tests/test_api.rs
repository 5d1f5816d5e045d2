use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use profit_forecast::YearMonth;
use profit_predictor::{build_state, routes::routes, AppConfig, SharedState};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use warp::http::StatusCode;

/// Two years of generated history (2020-2021) behind a small model search
fn state() -> SharedState {
    static STATE: OnceLock<SharedState> = OnceLock::new();
    STATE
        .get_or_init(|| {
            let config = AppConfig {
                history_years: 2,
                max_order: 1,
                ..AppConfig::default()
            };
            Arc::new(build_state(&config).unwrap())
        })
        .clone()
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_index_page() {
    let response = warp::test::request()
        .method("GET")
        .path("/")
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = String::from_utf8_lossy(response.body());
    assert!(page.contains("Profit Predictor"));
    assert!(page.contains("/api/v1/forecast"));
}

#[tokio::test]
async fn test_health() {
    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response.body())["status"], "ok");
}

#[tokio::test]
async fn test_forecast_by_month_name() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/forecast")
        .json(&serde_json::json!({ "month": "March", "working_days": 20 }))
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response.body());
    assert_eq!(body["target_month"], "2022-03");
    assert_eq!(body["month_name"], "March");
    assert_eq!(body["num_working_days"], 20);
    assert_eq!(body["days"].as_array().unwrap().len(), 20);

    let total = body["predicted_total_profit"].as_f64().unwrap();
    assert!(total > 10_000.0 && total < 50_000.0);
    let lower = body["confidence_interval"]["lower"].as_f64().unwrap();
    let upper = body["confidence_interval"]["upper"].as_f64().unwrap();
    assert!(lower < total && total < upper);
}

#[tokio::test]
async fn test_forecast_too_many_working_days() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/forecast")
        .json(&serde_json::json!({ "month": "2022-02", "working_days": 40 }))
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = json(response.body())["error"].as_str().unwrap().to_string();
    assert!(message.contains("Not enough working days"));
}

#[tokio::test]
async fn test_forecast_month_inside_history() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/forecast")
        .json(&serde_json::json!({ "month": "2021-05", "working_days": 10 }))
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_beyond_horizon() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/forecast")
        .json(&serde_json::json!({ "month": "2024-06", "working_days": 10 }))
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_forecast_last_supported_month() {
    let month = YearMonth::containing(NaiveDate::MAX).to_string();
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/forecast")
        .json(&serde_json::json!({ "month": month, "working_days": 1 }))
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_forecast_malformed_body() {
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/forecast")
        .header("content-type", "application/json")
        .body(r#"{"month": "March", "working_days": -3}"#)
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json(response.body())["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_model_summary() {
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/model")
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response.body());
    assert_eq!(body["training_end"], "2021-12-31");
    assert_eq!(body["observations"], 731);
    assert!(body["sigma2"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_monthly_history() {
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/history/monthly")
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let months = json(response.body());
    let months = months.as_array().unwrap();
    assert_eq!(months.len(), 24);
    assert_eq!(months[0]["month"], "2020-01");
    assert_eq!(months[0]["days"], 31);
}

#[tokio::test]
async fn test_unknown_path() {
    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/nothing")
        .reply(&routes(state()))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response.body())["error"], "Not Found");
}
