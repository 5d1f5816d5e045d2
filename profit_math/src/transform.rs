//! Parameter transforms that keep ARMA polynomials stationary/invertible
//!
//! An unconstrained vector `r` is mapped to partial autocorrelations
//! `kappa = r / sqrt(1 + r^2)` in `(-1, 1)` and then through the
//! Durbin-Levinson recursion to AR coefficients. Every point of `R^p` maps
//! to a stationary `1 - phi1 B - ... - phip B^p`, so an unconstrained
//! optimizer can search freely.

/// Map unconstrained values to coefficients of a stationary AR polynomial
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained
        .iter()
        .map(|r| r / (1.0 + r * r).sqrt())
        .collect();

    let mut phi: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, kappa) in partials.iter().enumerate() {
        let mut next: Vec<f64> = (0..k).map(|j| phi[j] - kappa * phi[k - 1 - j]).collect();
        next.push(*kappa);
        phi = next;
    }

    phi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_coefficient() {
        let phi = constrain_stationary(&[0.0]);
        assert_eq!(phi, vec![0.0]);

        let phi = constrain_stationary(&[1000.0]);
        assert!(phi[0] < 1.0 && phi[0] > 0.99);
    }

    #[test]
    fn test_last_coefficient_is_partial_autocorrelation() {
        let r = [0.7, -1.3, 0.2];
        let phi = constrain_stationary(&r);
        assert_eq!(phi.len(), 3);
        assert_relative_eq!(phi[2], 0.2 / (1.04f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_ar2_is_stationary() {
        // Stationarity triangle for AR(2): |phi2| < 1, phi2 + phi1 < 1, phi2 - phi1 < 1
        for r1 in [-5.0, -0.5, 0.0, 0.5, 5.0] {
            for r2 in [-5.0, -0.5, 0.0, 0.5, 5.0] {
                let phi = constrain_stationary(&[r1, r2]);
                assert!(phi[1].abs() < 1.0);
                assert!(phi[1] + phi[0] < 1.0);
                assert!(phi[1] - phi[0] < 1.0);
            }
        }
    }
}
