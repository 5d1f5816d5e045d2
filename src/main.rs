use anyhow::Context;
use log::info;
use profit_forecast::TrainedForecastModel;
use profit_predictor::{build_state, routes, AppConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;
    info!("Using configuration: {:?}", config);

    let training_config = config.clone();
    let state = tokio::task::spawn_blocking(move || build_state(&training_config))
        .await
        .context("Training task panicked")??;
    info!(
        "Model {} ready; training data ends {}",
        state.service.model().name(),
        state.service.training_end()
    );

    let api = routes::routes(Arc::new(state));
    let addr = config.socket_addr();
    info!("Starting server on http://{}", addr);
    warp::serve(api).run(addr).await;

    Ok(())
}
