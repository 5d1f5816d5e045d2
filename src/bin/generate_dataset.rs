//! Write the synthetic daily profit dataset to CSV
//!
//! Usage: `generate_dataset [output.csv] [years] [seed]`

use anyhow::Context;
use log::info;
use profit_forecast::calendar::SpecialDayMarker;
use profit_forecast::generator::{DatasetGenerator, GeneratorConfig};
use profit_forecast::DataLoader;
use std::env;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let output = args.first().map(String::as_str).unwrap_or("profit_data.csv");

    let mut config = GeneratorConfig::default();
    if let Some(years) = args.get(1) {
        config.years = years
            .parse()
            .with_context(|| format!("Invalid number of years '{}'", years))?;
    }
    if let Some(seed) = args.get(2) {
        config.seed = Some(seed.parse().with_context(|| format!("Invalid seed '{}'", seed))?);
    }

    let series = DatasetGenerator::new(config, SpecialDayMarker::default())?.generate()?;
    DataLoader::to_csv(&series, output).with_context(|| format!("Failed to write {}", output))?;

    info!(
        "Wrote {} days ({} to {}) to {}",
        series.len(),
        series.start_date(),
        series.end_date(),
        output
    );
    println!("Wrote {} days of profit data to {}", series.len(), output);
    Ok(())
}
