use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use profit_forecast::calendar::SpecialDayMarker;
use profit_forecast::data::{DataLoader, HistoricalSeries};
use profit_forecast::generator::{DatasetGenerator, GeneratorConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_data_loader_from_csv() {
    // Only date and profit; flags come from the marker
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,profit").unwrap();
    writeln!(file, "2022-12-31,1000.0").unwrap();
    writeln!(file, "2023-01-01,1100.5").unwrap();
    writeln!(file, "2023-01-02,990.25").unwrap();

    let series = DataLoader::from_csv(file.path(), &SpecialDayMarker::default()).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.start_date(), date(2022, 12, 31));
    assert_eq!(series.profits(), vec![1000.0, 1100.5, 990.25]);
    assert!(series.records()[1].is_weekend);
    assert!(series.records()[1].is_holiday);
    assert!(!series.records()[2].is_weekend);
}

#[test]
fn test_stored_flags_take_precedence() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,profit,is_weekend,is_holiday").unwrap();
    writeln!(file, "2023-03-01,10,true,false").unwrap();
    writeln!(file, "2023-03-02,20,false,true").unwrap();

    let series = DataLoader::from_csv(file.path(), &SpecialDayMarker::default()).unwrap();
    assert!(series.records()[0].is_weekend);
    assert!(series.records()[1].is_holiday);
}

#[test]
fn test_csv_round_trip_of_generated_data() {
    let marker = SpecialDayMarker::default();
    let config = GeneratorConfig::default().with_years(1);
    let series = DatasetGenerator::new(config, marker.clone())
        .unwrap()
        .generate()
        .unwrap();

    let file = NamedTempFile::new().unwrap();
    DataLoader::to_csv(&series, file.path()).unwrap();

    let contents = std::fs::read_to_string(file.path()).unwrap();
    let header = contents.lines().next().unwrap();
    assert_eq!(header, "date,profit,is_weekend,is_holiday,control");
    assert!(contents.contains("2020-01-01,"));
    assert!(contents.contains("Official Holiday"));
    assert!(contents.contains("Sunday"));

    let loaded = DataLoader::from_csv(file.path(), &marker).unwrap();
    assert_eq!(loaded.len(), series.len());
    assert_eq!(loaded.dates(), series.dates());
    for (a, b) in loaded.profits().iter().zip(series.profits().iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_invalid_csv_content() {
    let marker = SpecialDayMarker::default();

    let mut gap = NamedTempFile::new().unwrap();
    writeln!(gap, "date,profit").unwrap();
    writeln!(gap, "2023-01-01,1.0").unwrap();
    writeln!(gap, "2023-01-03,1.0").unwrap();
    assert!(DataLoader::from_csv(gap.path(), &marker).is_err());

    let mut no_profit = NamedTempFile::new().unwrap();
    writeln!(no_profit, "date,revenue").unwrap();
    writeln!(no_profit, "2023-01-01,1.0").unwrap();
    assert!(DataLoader::from_csv(no_profit.path(), &marker).is_err());

    assert!(DataLoader::from_csv("/nonexistent/profits.csv", &marker).is_err());
}

#[test]
fn test_historical_series_statistics() {
    let marker = SpecialDayMarker::default();
    let series = HistoricalSeries::from_values(date(2023, 5, 1), &[2.0, 4.0, 6.0], &marker).unwrap();

    assert_eq!(series.mean().unwrap(), 4.0);
    assert!(series.std_dev().unwrap() > 0.0);

    let df = series.to_dataframe().unwrap();
    assert_eq!(df.height(), 3);
    assert_eq!(df.width(), 5);
}
