// src/handlers/page.rs
use log::info;
use warp::reply::Html;
use warp::Rejection;

/// The forecast page, compiled into the binary
pub const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> Result<Html<&'static str>, Rejection> {
    info!("Serving the forecast page.");
    Ok(warp::reply::html(INDEX_HTML))
}
