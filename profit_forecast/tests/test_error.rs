use profit_forecast::error::ForecastError;
use profit_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    match ForecastError::from(io_error) {
        ForecastError::IoError(_) => {}
        other => panic!("Expected IoError variant, got {:?}", other),
    }

    let math_error = MathError::InsufficientData("need 3 observations".to_string());
    match ForecastError::from(math_error) {
        ForecastError::MathError(inner) => {
            assert_eq!(inner, MathError::InsufficientData("need 3 observations".to_string()))
        }
        other => panic!("Expected MathError variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::ValidationError("Not enough working days".to_string());
    assert_eq!(error.to_string(), "Validation error: Not enough working days");

    let error = ForecastError::FitError("no candidate converged".to_string());
    assert_eq!(error.to_string(), "Fit error: no candidate converged");

    let error = ForecastError::ForecastingError("horizon too long".to_string());
    assert_eq!(error.to_string(), "Forecasting error: horizon too long");
}
