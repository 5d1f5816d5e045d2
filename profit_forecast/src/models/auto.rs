//! Automatic SARIMAX order selection
//!
//! The regular differencing order comes from repeated KPSS tests on the
//! seasonally differenced series. The ARMA orders are searched either
//! stepwise (start from a few small models and move to the first
//! neighbouring order that lowers the criterion) or over the full grid.

use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::exogenous::{ExogenousMatrix, ExogenousSchema};
use crate::models::sarimax::{fit, SarimaxOrder, TrainedSarimax, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::models::{ForecastModel, InformationCriterion};
use log::{debug, info, warn};
use profit_math::differencing::Differencer;
use profit_math::optimize::NelderMead;
use profit_math::stationarity::{kpss_critical_value, ndiffs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// (p, q, P, Q)
type Candidate = (usize, usize, usize, usize);

const STEPWISE_STARTS: [Candidate; 4] = [(2, 2, 1, 1), (0, 0, 0, 0), (1, 0, 1, 0), (0, 1, 0, 1)];

/// How candidate orders are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    #[default]
    Stepwise,
    Grid,
}

/// Bounds and settings of the order search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_p: usize,
    pub max_q: usize,
    pub max_seasonal_p: usize,
    pub max_seasonal_q: usize,
    /// Bound on p + q + P + Q
    pub max_order: usize,
    /// Fixed regular differencing order; chosen by KPSS tests when `None`
    pub d: Option<usize>,
    pub max_d: usize,
    pub seasonal_d: usize,
    pub period: usize,
    /// KPSS significance level
    pub alpha: f64,
    pub criterion: InformationCriterion,
    pub strategy: SearchStrategy,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_q: 3,
            max_seasonal_p: 3,
            max_seasonal_q: 3,
            max_order: 5,
            d: None,
            max_d: 2,
            seasonal_d: 1,
            period: 7,
            alpha: 0.05,
            criterion: InformationCriterion::Aic,
            strategy: SearchStrategy::Stepwise,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SearchConfig {
    /// Apply the same bound to p, q, P and Q
    pub fn with_max_orders(mut self, max: usize) -> Self {
        self.max_p = max;
        self.max_q = max;
        self.max_seasonal_p = max;
        self.max_seasonal_q = max;
        self
    }

    fn validate(&self) -> Result<()> {
        let seasonal = self.seasonal_d + self.max_seasonal_p + self.max_seasonal_q > 0;
        if seasonal && self.period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Seasonal terms need a period of at least 2, got {}",
                self.period
            )));
        }
        kpss_critical_value(self.alpha)?;
        NelderMead::new(self.max_iterations, self.tolerance)?;
        Ok(())
    }

    fn in_bounds(&self, (p, q, sp, sq): Candidate) -> bool {
        p <= self.max_p
            && q <= self.max_q
            && sp <= self.max_seasonal_p
            && sq <= self.max_seasonal_q
            && p + q + sp + sq <= self.max_order
    }
}

/// SARIMAX with automatic order selection
#[derive(Debug, Clone)]
pub struct AutoSarimax {
    name: String,
    config: SearchConfig,
    schema: ExogenousSchema,
}

impl AutoSarimax {
    /// Create an auto-selecting model
    pub fn new(config: SearchConfig, schema: ExogenousSchema) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: "AutoSARIMAX".to_string(),
            config,
            schema,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Regular differencing order: fixed, or the number of differences the
    /// KPSS test asks for after seasonal differencing
    pub fn select_d(&self, values: &[f64]) -> Result<usize> {
        if let Some(d) = self.config.d {
            return Ok(d);
        }

        let seasonal = Differencer::new(0, self.config.seasonal_d, self.config.period)?;
        let differenced = seasonal.apply(values).map_err(|e| {
            ForecastError::FitError(format!("Series too short for seasonal differencing: {}", e))
        })?;
        let d = ndiffs(&differenced, self.config.alpha, self.config.max_d)
            .map_err(|e| ForecastError::FitError(format!("Stationarity test failed: {}", e)))?;

        debug!("KPSS selected d={} (D={})", d, self.config.seasonal_d);
        Ok(d)
    }
}

impl ForecastModel for AutoSarimax {
    type Trained = TrainedSarimax;

    fn train(&self, data: &HistoricalSeries) -> Result<TrainedSarimax> {
        let d = self.select_d(&data.profits())?;
        let exog = self.schema.training_matrix(data)?;
        let optimizer =
            NelderMead::new(self.config.max_iterations, self.config.tolerance)?.with_initial_step(0.3);

        let mut search = Search {
            config: &self.config,
            schema: &self.schema,
            data,
            exog: &exog,
            optimizer,
            d,
            visited: HashMap::new(),
            best: None,
        };
        match self.config.strategy {
            SearchStrategy::Stepwise => search.stepwise(),
            SearchStrategy::Grid => search.grid(),
        }

        let fits = search.visited.len();
        let (score, model) = search.best.ok_or_else(|| {
            ForecastError::FitError(format!("None of the {} candidate orders could be fitted", fits))
        })?;

        info!(
            "Selected {} with {:?} {:.3} after {} candidate fits",
            model.order(),
            self.config.criterion,
            score,
            fits
        );
        Ok(model)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// State of one order search
struct Search<'a> {
    config: &'a SearchConfig,
    schema: &'a ExogenousSchema,
    data: &'a HistoricalSeries,
    exog: &'a ExogenousMatrix,
    optimizer: NelderMead,
    d: usize,
    /// Criterion value per fitted candidate, `None` when the fit failed
    visited: HashMap<Candidate, Option<f64>>,
    best: Option<(f64, TrainedSarimax)>,
}

impl Search<'_> {
    fn order(&self, (p, q, sp, sq): Candidate) -> SarimaxOrder {
        SarimaxOrder::new(p, self.d, q).with_seasonal(sp, self.config.seasonal_d, sq, self.config.period)
    }

    /// Fit `candidate` unless it was already tried or is out of bounds.
    /// Returns true when it becomes the best model so far.
    fn evaluate(&mut self, candidate: Candidate) -> bool {
        if !self.config.in_bounds(candidate) || self.visited.contains_key(&candidate) {
            return false;
        }

        let order = self.order(candidate);
        let trained = match fit(self.data, self.exog, self.schema, order, &self.optimizer) {
            Ok(trained) => trained,
            Err(e) => {
                warn!("Skipping {}: {}", order, e);
                self.visited.insert(candidate, None);
                return false;
            }
        };

        let score = self.config.criterion.score(trained.criteria());
        if !score.is_finite() {
            warn!("Skipping {}: {:?} is not finite", order, self.config.criterion);
            self.visited.insert(candidate, None);
            return false;
        }

        debug!("{} {:?}={:.3}", order, self.config.criterion, score);
        self.visited.insert(candidate, Some(score));

        let improves = self.best.as_ref().map_or(true, |(best, _)| score < *best);
        if improves {
            self.best = Some((score, trained));
        }
        improves
    }

    fn stepwise(&mut self) {
        for start in STEPWISE_STARTS {
            self.evaluate(start);
        }

        loop {
            let current = match &self.best {
                Some((_, model)) => {
                    let order = model.order();
                    (order.p, order.q, order.seasonal_p, order.seasonal_q)
                }
                None => return,
            };

            if !neighbours(current).into_iter().any(|next| self.evaluate(next)) {
                break;
            }
        }
    }

    fn grid(&mut self) {
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                for sp in 0..=self.config.max_seasonal_p {
                    for sq in 0..=self.config.max_seasonal_q {
                        self.evaluate((p, q, sp, sq));
                    }
                }
            }
        }
    }
}

/// Orders one step away from `current`: each of P, Q, p, q moved by one,
/// and P with Q, p with q moved together
fn neighbours((p, q, sp, sq): Candidate) -> Vec<Candidate> {
    const STEPS: [(i64, i64, i64, i64); 12] = [
        (0, 0, -1, 0),
        (0, 0, 1, 0),
        (0, 0, 0, -1),
        (0, 0, 0, 1),
        (0, 0, -1, -1),
        (0, 0, 1, 1),
        (-1, 0, 0, 0),
        (1, 0, 0, 0),
        (0, -1, 0, 0),
        (0, 1, 0, 0),
        (-1, -1, 0, 0),
        (1, 1, 0, 0),
    ];
    let shift = |value: usize, step: i64| usize::try_from(value as i64 + step).ok();

    STEPS
        .iter()
        .filter_map(|(dp, dq, dsp, dsq)| {
            Some((shift(p, *dp)?, shift(q, *dq)?, shift(sp, *dsp)?, shift(sq, *dsq)?))
        })
        .collect()
}
