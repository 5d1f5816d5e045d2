//! Dense least squares for small regressor counts
//!
//! Design matrices are passed column by column; the regressor count stays in
//! the tens, so the normal equations are solved with a Cholesky factorisation.

use crate::{MathError, Result};

/// Relative ridge added to the Gram diagonal. Keeps all-zero or collinear
/// indicator columns solvable with a near-zero coefficient.
const DIAGONAL_JITTER: f64 = 1e-9;

/// Ordinary least squares coefficients for `y ~ columns`
pub fn least_squares(columns: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
    let k = columns.len();
    if k == 0 {
        return Ok(Vec::new());
    }

    let n = y.len();
    if let Some(bad) = columns.iter().find(|c| c.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Regressor length {} does not match response length {}",
            bad.len(),
            n
        )));
    }
    if n < k {
        return Err(MathError::InsufficientData(format!(
            "{} observations cannot identify {} coefficients",
            n, k
        )));
    }

    let mut gram = vec![vec![0.0; k]; k];
    let mut rhs = vec![0.0; k];
    for i in 0..k {
        rhs[i] = dot(&columns[i], y);
        for j in 0..=i {
            let value = dot(&columns[i], &columns[j]);
            gram[i][j] = value;
            gram[j][i] = value;
        }
    }

    let scale = (0..k).map(|i| gram[i][i]).fold(1.0_f64, f64::max);
    for (i, row) in gram.iter_mut().enumerate() {
        row[i] += DIAGONAL_JITTER * scale;
    }

    cholesky_solve(&gram, &rhs)
}

/// Solve `a x = b` for a symmetric positive definite `a`
pub fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Matrix must be square and match the right-hand side".to_string(),
        ));
    }

    // Lower triangular factor
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|m| l[i][m] * l[j][m]).sum();
            if i == j {
                let pivot = a[i][i] - sum;
                if pivot <= 0.0 || !pivot.is_finite() {
                    return Err(MathError::CalculationError(
                        "Matrix is not positive definite".to_string(),
                    ));
                }
                l[i][j] = pivot.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }

    // Forward substitution: l z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|m| l[i][m] * z[m]).sum();
        z[i] = (b[i] - sum) / l[i][i];
    }

    // Back substitution: l' x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|m| l[m][i] * x[m]).sum();
        x[i] = (z[i] - sum) / l[i][i];
    }

    Ok(x)
}

/// Dot product of two equally long slices
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
