use approx::assert_relative_eq;
use chrono::NaiveDate;
use profit_forecast::calendar::{HolidayCalendar, SpecialDayMarker};
use profit_forecast::data::HistoricalSeries;
use profit_forecast::generator::{DatasetGenerator, GeneratorConfig};
use profit_forecast::models::{
    AutoSarimax, ExogenousSchema, ForecastModel, InformationCriterion, Sarimax, SarimaxOrder,
    SearchConfig, SearchStrategy, TrainedForecastModel,
};
use profit_forecast::ForecastError;
use rstest::rstest;

fn generated(years: u32) -> HistoricalSeries {
    DatasetGenerator::new(
        GeneratorConfig::default().with_years(years),
        SpecialDayMarker::default(),
    )
    .unwrap()
    .generate()
    .unwrap()
}

fn small_search() -> SearchConfig {
    SearchConfig {
        max_order: 2,
        ..SearchConfig::default().with_max_orders(1)
    }
}

#[test]
fn test_fixed_order_sarimax() {
    let series = generated(1);
    let order = SarimaxOrder::new(1, 0, 0).with_seasonal(0, 1, 1, 7);
    let model = Sarimax::new(order, ExogenousSchema::default()).unwrap();
    assert_eq!(model.name(), "SARIMAX(1,0,0)(0,1,1)[7]");

    let trained = model.train(&series).unwrap();
    let forecast = trained.forecast_days(31).unwrap();

    assert_eq!(forecast.horizons(), 31);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
    let intervals = forecast.confidence_intervals(0.95).unwrap();
    for ((lower, upper), value) in intervals.iter().zip(forecast.values()) {
        assert!(lower < value && value < upper);
    }
}

#[test]
fn test_weekend_effect_is_estimated() {
    // Weekends earn half; no seasonal differencing so the indicator survives
    let marker = SpecialDayMarker::new(
        vec![chrono::Weekday::Sat, chrono::Weekday::Sun],
        HolidayCalendar::empty(),
    );
    let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let values: Vec<f64> = start
        .iter_days()
        .take(364)
        .enumerate()
        .map(|(i, d)| {
            let base = if marker.is_weekend(d) { 500.0 } else { 1000.0 };
            base + ((i * 37) % 11) as f64
        })
        .collect();
    let series = HistoricalSeries::from_values(start, &values, &marker).unwrap();

    let schema = ExogenousSchema::new(marker).with_month_dummies(false);
    let trained = Sarimax::new(SarimaxOrder::new(0, 0, 0), schema)
        .unwrap()
        .train(&series)
        .unwrap();

    let weekend = trained
        .regression_coefficients()
        .into_iter()
        .find(|c| c.name == "weekend")
        .unwrap();
    assert_relative_eq!(weekend.value, -500.0, epsilon = 2.0);
}

#[test]
fn test_auto_sarimax_on_generated_data() {
    let series = generated(2);
    let model = AutoSarimax::new(small_search(), ExogenousSchema::default()).unwrap();
    let trained = model.train(&series).unwrap();

    let summary = trained.summary();
    assert_eq!(summary.training_end, NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
    assert_eq!(summary.observations, 731);
    assert!(summary.sigma2 > 0.0);
    assert_eq!(summary.order.period, 7);
    assert!(summary.exogenous.iter().any(|c| c.name == "month_12"));
    assert!(summary.in_sample.mae > 0.0);
}

#[rstest]
#[case(InformationCriterion::Aic)]
#[case(InformationCriterion::Aicc)]
#[case(InformationCriterion::Bic)]
fn test_every_criterion_selects_a_model(#[case] criterion: InformationCriterion) {
    let series = generated(1).slice(0, Some(200)).unwrap();
    let config = SearchConfig {
        criterion,
        ..small_search()
    };
    let trained = AutoSarimax::new(config, ExogenousSchema::default())
        .unwrap()
        .train(&series)
        .unwrap();
    assert!(criterion.score(trained.criteria()).is_finite());
}

#[test]
fn test_grid_search() {
    let series = generated(1).slice(0, Some(150)).unwrap();
    let config = SearchConfig {
        strategy: SearchStrategy::Grid,
        ..small_search()
    };
    let trained = AutoSarimax::new(config, ExogenousSchema::default().with_month_dummies(false))
        .unwrap()
        .train(&series)
        .unwrap();
    assert!(trained.order().arma_parameters() <= 2);
}

#[test]
fn test_too_short_for_seasonal_period() {
    let series = generated(1).slice(0, Some(6)).unwrap();
    let model = AutoSarimax::new(small_search(), ExogenousSchema::default()).unwrap();

    match model.train(&series) {
        Err(ForecastError::FitError(_)) => {}
        other => panic!("Expected FitError, got {:?}", other.map(|m| m.order())),
    }
}
