//! Regression with seasonal ARIMA errors
//!
//! `y_t = x_t' beta + u_t` with
//! `phi(B) Phi(B^s) (1-B)^d (1-B^s)^D u_t = theta(B) Theta(B^s) e_t`.
//!
//! Estimation by conditional sum of squares: difference `y` and every
//! regressor, solve for `beta` by least squares, then fit the ARMA part of
//! the regression residuals with Nelder-Mead over an unconstrained
//! parameterisation that keeps the AR side stationary and the MA side
//! invertible.

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::models::exogenous::{ExogenousMatrix, ExogenousSchema};
use crate::models::{
    Coefficient, ForecastModel, ForecastPath, ModelSummary, TrainedForecastModel,
};
use chrono::{Duration, NaiveDate};
use log::debug;
use profit_math::criteria::InformationCriteria;
use profit_math::differencing::Differencer;
use profit_math::linalg::least_squares;
use profit_math::optimize::NelderMead;
use profit_math::polynomial::LagPolynomial;
use profit_math::transform::constrain_stationary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Iteration limit of the ARMA parameter search
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
/// Relative tolerance of the ARMA parameter search
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Orders of a seasonal ARIMA model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SarimaxOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaxOrder {
    /// Non-seasonal ARIMA(p, d, q)
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p: 0,
            seasonal_d: 0,
            seasonal_q: 0,
            period: 0,
        }
    }

    /// Add the seasonal part (P, D, Q) with period `s`
    pub fn with_seasonal(mut self, seasonal_p: usize, seasonal_d: usize, seasonal_q: usize, period: usize) -> Self {
        self.seasonal_p = seasonal_p;
        self.seasonal_d = seasonal_d;
        self.seasonal_q = seasonal_q;
        self.period = period;
        self
    }

    /// Number of AR and MA coefficients
    pub fn arma_parameters(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Highest lag of the full AR polynomial
    pub fn ar_degree(&self) -> usize {
        self.p + self.period * self.seasonal_p
    }

    fn is_seasonal(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_seasonal() && self.period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "{} has a seasonal part but a period of {}",
                self, self.period
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SarimaxOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SARIMAX({},{},{})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(
                f,
                "({},{},{})[{}]",
                self.seasonal_p, self.seasonal_d, self.seasonal_q, self.period
            )?;
        }
        Ok(())
    }
}

/// AR and MA coefficients of the four lag polynomials
#[derive(Debug, Clone, PartialEq)]
struct ArmaCoefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl ArmaCoefficients {
    /// Map an unconstrained vector laid out as `[ar, ma, sar, sma]`
    fn from_unconstrained(x: &[f64], order: &SarimaxOrder) -> Self {
        let (ar, rest) = x.split_at(order.p);
        let (ma, rest) = rest.split_at(order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(order.seasonal_p);

        let invertible = |values: &[f64]| -> Vec<f64> {
            constrain_stationary(values).into_iter().map(|c| -c).collect()
        };

        Self {
            ar: constrain_stationary(ar),
            ma: invertible(ma),
            seasonal_ar: constrain_stationary(seasonal_ar),
            seasonal_ma: invertible(seasonal_ma),
        }
    }

    /// Full AR and MA polynomials with the seasonal factors expanded
    fn polynomials(&self, period: usize) -> (LagPolynomial, LagPolynomial) {
        let ar = LagPolynomial::autoregressive(&self.ar)
            .multiply(&LagPolynomial::autoregressive(&self.seasonal_ar).seasonal(period));
        let ma = LagPolynomial::moving_average(&self.ma)
            .multiply(&LagPolynomial::moving_average(&self.seasonal_ma).seasonal(period));
        (ar, ma)
    }
}

/// Conditional innovations of `u` under `ar(B) u_t = ma(B) e_t`, with
/// innovations before the first full AR window set to zero. Returns the
/// innovations and their sum of squares.
fn conditional_innovations(u: &[f64], ar: &LagPolynomial, ma: &LagPolynomial) -> (Vec<f64>, f64) {
    let start = ar.degree();
    let ar_lags = ar.nonzero_lags();
    let ma_lags = ma.nonzero_lags();

    let mut e = vec![0.0; u.len()];
    let mut sse = 0.0;
    for t in start..u.len() {
        let mut value = u[t];
        for (lag, c) in &ar_lags {
            value += c * u[t - lag];
        }
        for (lag, c) in ma_lags.iter().take_while(|(lag, _)| *lag <= t) {
            value -= c * e[t - lag];
        }
        e[t] = value;
        sse += value * value;
    }

    (e, sse)
}

/// SARIMAX model with fixed orders
#[derive(Debug, Clone)]
pub struct Sarimax {
    name: String,
    order: SarimaxOrder,
    schema: ExogenousSchema,
    optimizer: NelderMead,
}

impl Sarimax {
    /// Create a model with the given orders and regressors
    pub fn new(order: SarimaxOrder, schema: ExogenousSchema) -> Result<Self> {
        order.validate()?;
        let optimizer = NelderMead::new(DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE)?.with_initial_step(0.3);

        Ok(Self {
            name: order.to_string(),
            order,
            schema,
            optimizer,
        })
    }

    pub fn order(&self) -> SarimaxOrder {
        self.order
    }
}

impl ForecastModel for Sarimax {
    type Trained = TrainedSarimax;

    fn train(&self, data: &HistoricalSeries) -> Result<TrainedSarimax> {
        let exog = self.schema.training_matrix(data)?;
        fit(data, &exog, &self.schema, self.order, &self.optimizer)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fit one SARIMAX order to `series` with regressors `exog`
pub(crate) fn fit(
    series: &HistoricalSeries,
    exog: &ExogenousMatrix,
    schema: &ExogenousSchema,
    order: SarimaxOrder,
    optimizer: &NelderMead,
) -> Result<TrainedSarimax> {
    order.validate()?;
    let y = series.profits();
    if exog.rows() != y.len() {
        return Err(ForecastError::ValidationError(format!(
            "Regressors cover {} days but the series has {}",
            exog.rows(),
            y.len()
        )));
    }

    let fit_error = |e: profit_math::MathError| ForecastError::FitError(format!("{}: {}", order, e));

    let differencer = Differencer::new(order.d, order.seasonal_d, order.period).map_err(fit_error)?;
    let w = differencer.apply(&y).map_err(fit_error)?;

    let mut names = exog.names().to_vec();
    let mut z = exog
        .columns()
        .iter()
        .map(|c| differencer.apply(c))
        .collect::<profit_math::Result<Vec<Vec<f64>>>>()
        .map_err(fit_error)?;
    let has_intercept = differencer.order() == 0;
    if has_intercept {
        names.push("intercept".to_string());
        z.push(vec![1.0; w.len()]);
    }

    let start = order.ar_degree();
    let n_params = order.arma_parameters() + z.len() + 1;
    if w.len() <= start + n_params {
        return Err(ForecastError::FitError(format!(
            "{} needs more than {} observations after differencing, got {}",
            order,
            start + n_params,
            w.len()
        )));
    }
    let n_eff = w.len() - start;

    let beta = least_squares(&z, &w).map_err(fit_error)?;
    let u: Vec<f64> = w
        .iter()
        .enumerate()
        .map(|(t, value)| value - z.iter().zip(&beta).map(|(c, b)| c[t] * b).sum::<f64>())
        .collect();

    let objective = |x: &[f64]| {
        let (ar, ma) = ArmaCoefficients::from_unconstrained(x, &order).polynomials(order.period);
        let (_, sse) = conditional_innovations(&u, &ar, &ma);
        if sse > 0.0 && sse.is_finite() {
            0.5 * (sse / n_eff as f64).ln()
        } else {
            f64::NAN
        }
    };
    let result = optimizer
        .minimize(objective, &vec![0.0; order.arma_parameters()])
        .map_err(fit_error)?;
    if !result.converged {
        return Err(ForecastError::FitError(format!(
            "{} did not converge after {} iterations",
            order, result.iterations
        )));
    }

    let coefficients = ArmaCoefficients::from_unconstrained(&result.x, &order);
    let (ar_poly, ma_poly) = coefficients.polynomials(order.period);
    let (innovations, sse) = conditional_innovations(&u, &ar_poly, &ma_poly);
    let sigma2 = sse / n_eff as f64;
    let criteria = InformationCriteria::gaussian(sigma2, n_eff, n_params).map_err(fit_error)?;
    if !criteria.aic.is_finite() {
        return Err(ForecastError::FitError(format!(
            "{} produced a non-finite information criterion",
            order
        )));
    }

    let offset = differencer.order();
    let actual: Vec<f64> = (start..innovations.len()).map(|t| y[offset + t]).collect();
    let fitted: Vec<f64> = (start..innovations.len())
        .map(|t| y[offset + t] - innovations[t])
        .collect();
    let in_sample = forecast_accuracy(&fitted, &actual)?;

    debug!(
        "{}: sigma2={:.3} aic={:.3} after {} iterations",
        order, sigma2, criteria.aic, result.iterations
    );

    Ok(TrainedSarimax {
        name: order.to_string(),
        order,
        schema: schema.clone(),
        regressors: names,
        beta,
        has_intercept,
        coefficients,
        ar_poly,
        ma_poly,
        differencer,
        sigma2,
        criteria,
        in_sample,
        training_start: series.start_date(),
        training_end: series.end_date(),
        history: y,
        exog_tail: exog.tail(offset),
        regression_residuals: u,
        innovations,
        css_start: start,
    })
}

/// Trained SARIMAX model
#[derive(Debug, Clone)]
pub struct TrainedSarimax {
    name: String,
    order: SarimaxOrder,
    schema: ExogenousSchema,
    /// Regression column names, intercept last when present
    regressors: Vec<String>,
    beta: Vec<f64>,
    has_intercept: bool,
    coefficients: ArmaCoefficients,
    ar_poly: LagPolynomial,
    ma_poly: LagPolynomial,
    differencer: Differencer,
    sigma2: f64,
    criteria: InformationCriteria,
    in_sample: ForecastAccuracy,
    training_start: NaiveDate,
    training_end: NaiveDate,
    history: Vec<f64>,
    /// Last `differencer.order()` regressor values, needed to difference
    /// future regressors
    exog_tail: Vec<Vec<f64>>,
    regression_residuals: Vec<f64>,
    innovations: Vec<f64>,
    css_start: usize,
}

impl TrainedSarimax {
    pub fn order(&self) -> SarimaxOrder {
        self.order
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn criteria(&self) -> &InformationCriteria {
        &self.criteria
    }

    /// Regression coefficients by column name
    pub fn regression_coefficients(&self) -> Vec<Coefficient> {
        self.regressors
            .iter()
            .zip(self.beta.iter())
            .map(|(name, value)| Coefficient {
                name: name.clone(),
                value: *value,
            })
            .collect()
    }

    /// Non-seasonal AR coefficients `phi`
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients.ar
    }

    /// Non-seasonal MA coefficients `theta`
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients.ma
    }

    /// One-step-ahead in-sample predictions with their dates
    pub fn fitted_values(&self) -> Vec<(NaiveDate, f64)> {
        let offset = self.differencer.order();
        (self.css_start..self.innovations.len())
            .map(|t| {
                let index = offset + t;
                (
                    self.training_start + Duration::days(index as i64),
                    self.history[index] - self.innovations[t],
                )
            })
            .collect()
    }

    /// Conditional innovations over the estimation window
    pub fn residuals(&self) -> &[f64] {
        &self.innovations[self.css_start..]
    }

    /// In-sample accuracy of the one-step predictions
    pub fn in_sample_accuracy(&self) -> &ForecastAccuracy {
        &self.in_sample
    }
}

impl TrainedForecastModel for TrainedSarimax {
    fn forecast(&self, future: &ExogenousMatrix) -> Result<ForecastPath> {
        let expected = self.schema.column_names();
        if future.names() != expected.as_slice() {
            return Err(ForecastError::ValidationError(format!(
                "Future regressors {:?} do not match the fitted regressors {:?}",
                future.names(),
                expected
            )));
        }

        let start_date = self.training_end + Duration::days(1);
        let horizon = future.rows();
        if horizon == 0 {
            return ForecastPath::new(start_date, Vec::new(), Vec::new(), self.sigma2);
        }

        let forecast_error = |e: profit_math::MathError| ForecastError::ForecastingError(e.to_string());

        let mut z: Vec<Vec<f64>> = Vec::with_capacity(self.beta.len());
        for (tail, column) in self.exog_tail.iter().zip(future.columns()) {
            let mut joined = tail.clone();
            joined.extend_from_slice(column);
            z.push(self.differencer.apply(&joined).map_err(forecast_error)?);
        }
        if self.has_intercept {
            z.push(vec![1.0; horizon]);
        }

        let ar_lags = self.ar_poly.nonzero_lags();
        let ma_lags = self.ma_poly.nonzero_lags();
        let mut u = self.regression_residuals.clone();
        let mut e = self.innovations.clone();
        let mut differenced = Vec::with_capacity(horizon);
        for h in 0..horizon {
            let t = u.len();
            let mut value = 0.0;
            for (lag, c) in ar_lags.iter().filter(|(lag, _)| *lag <= t) {
                value -= c * u[t - lag];
            }
            for (lag, c) in ma_lags.iter().filter(|(lag, _)| *lag <= t) {
                value += c * e[t - lag];
            }
            u.push(value);
            e.push(0.0);

            let regression: f64 = z.iter().zip(&self.beta).map(|(c, b)| c[h] * b).sum();
            differenced.push(regression + value);
        }

        let values = self
            .differencer
            .integrate(&self.history, &differenced)
            .map_err(forecast_error)?;
        let psi = LagPolynomial::psi_weights(
            &self.ar_poly.multiply(self.differencer.polynomial()),
            &self.ma_poly,
            horizon,
        )
        .map_err(forecast_error)?;

        if values.iter().chain(psi.iter()).any(|v| !v.is_finite()) {
            return Err(ForecastError::ForecastingError(format!(
                "{} produced non-finite forecasts",
                self.order
            )));
        }

        ForecastPath::new(start_date, values, psi, self.sigma2)
    }

    fn schema(&self) -> &ExogenousSchema {
        &self.schema
    }

    fn training_end(&self) -> NaiveDate {
        self.training_end
    }

    fn summary(&self) -> ModelSummary {
        ModelSummary {
            name: self.name.clone(),
            order: self.order,
            training_start: self.training_start,
            training_end: self.training_end,
            observations: self.history.len(),
            sigma2: self.sigma2,
            criteria: self.criteria,
            ar: self.coefficients.ar.clone(),
            ma: self.coefficients.ma.clone(),
            seasonal_ar: self.coefficients.seasonal_ar.clone(),
            seasonal_ma: self.coefficients.seasonal_ma.clone(),
            exogenous: self.regression_coefficients(),
            in_sample: self.in_sample,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
