//! Derivative-free minimisation (Nelder-Mead simplex)

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Floor on the convergence threshold for objectives whose minimum is zero
const ABSOLUTE_TOLERANCE: f64 = 1e-10;

/// Outcome of a minimisation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    /// Best point found
    pub x: Vec<f64>,
    /// Objective value at `x`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the convergence tolerance was met before the iteration limit
    pub converged: bool,
}

/// Nelder-Mead simplex minimiser
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    tolerance: f64,
    initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

impl NelderMead {
    /// Create a minimiser with the given iteration limit and relative
    /// tolerance on the spread of the simplex values
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration limit must be greater than zero".to_string(),
            ));
        }
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(MathError::InvalidInput(
                "Tolerance must be a positive finite number".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            tolerance,
            ..Self::default()
        })
    }

    /// Set the size of the initial simplex around the starting point
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Iteration limit
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Minimise `objective` starting from `start`.
    ///
    /// Non-finite objective values are treated as `+inf`, so the objective
    /// may reject points by returning `f64::NAN` or `f64::INFINITY`. Fails
    /// only when the starting point itself is not finite.
    pub fn minimize<F>(&self, mut objective: F, start: &[f64]) -> Result<OptimizeResult>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut eval = |x: &[f64]| {
            let v = objective(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let n = start.len();
        let start_value = eval(start);
        if !start_value.is_finite() {
            return Err(MathError::CalculationError(
                "Objective is not finite at the starting point".to_string(),
            ));
        }
        if n == 0 {
            return Ok(OptimizeResult {
                x: Vec::new(),
                value: start_value,
                iterations: 0,
                converged: true,
            });
        }

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((start.to_vec(), start_value));
        for i in 0..n {
            let mut vertex = start.to_vec();
            vertex[i] += if vertex[i].abs() > 1e-8 {
                self.initial_step * vertex[i].abs().max(1.0)
            } else {
                self.initial_step
            };
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let worst = simplex[n].1;
            let threshold = self.tolerance * (best.abs() + worst.abs()) + ABSOLUTE_TOLERANCE;
            if worst.is_finite() && (worst - best).abs() <= threshold {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
                .collect();
            let toward = |coef: f64, from: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(from.iter())
                    .map(|(c, w)| c + coef * (w - c))
                    .collect()
            };

            let worst_point = simplex[n].0.clone();
            let reflected = toward(-1.0, &worst_point);
            let reflected_value = eval(&reflected);

            if reflected_value < simplex[0].1 {
                let expanded = toward(-2.0, &worst_point);
                let expanded_value = eval(&expanded);
                simplex[n] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
            } else if reflected_value < simplex[n - 1].1 {
                simplex[n] = (reflected, reflected_value);
            } else {
                let contracted = if reflected_value < simplex[n].1 {
                    toward(-0.5, &worst_point)
                } else {
                    toward(0.5, &worst_point)
                };
                let contracted_value = eval(&contracted);

                if contracted_value < simplex[n].1.min(reflected_value) {
                    simplex[n] = (contracted, contracted_value);
                } else {
                    // Shrink toward the best vertex
                    let best_point = simplex[0].0.clone();
                    for vertex in simplex.iter_mut().skip(1) {
                        let shrunk: Vec<f64> = best_point
                            .iter()
                            .zip(vertex.0.iter())
                            .map(|(b, v)| b + 0.5 * (v - b))
                            .collect();
                        let value = eval(&shrunk);
                        *vertex = (shrunk, value);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (x, value) = simplex.swap_remove(0);

        Ok(OptimizeResult {
            x,
            value,
            iterations,
            converged,
        })
    }
}
