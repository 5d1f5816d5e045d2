//! # Profit Predictor
//!
//! Web front end for monthly profit forecasts. The server builds a daily
//! profit history (generated or loaded from CSV), trains an auto-selected
//! SARIMAX model once at startup and answers forecast requests from a small
//! HTML page through a JSON API.

pub mod app;
pub mod config;
pub mod handlers;
pub mod routes;

pub use crate::app::{build_state, AppState, SharedState};
pub use crate::config::AppConfig;
