//! Least squares solvers.
//!
//! The forecaster solves one penalized regression per fit:
//!
//! ```text
//! minimize ||y - X β||² + Σ λ_j β_j²
//! ```
//!
//! Implementation choices:
//! - The ridge term is folded into the design by appending `sqrt(λ_j) e_j` rows
//!   (and zeros to `y`), which turns the problem into plain least squares.
//! - We solve with SVD so tall and rank-deficient designs are handled. One-hot
//!   event columns are collinear with the intercept by construction; the
//!   penalty rows are what makes the split between them well defined.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge-penalized least squares problem.
///
/// `penalties[j]` is `λ_j` for column `j`; zero leaves the column unpenalized.
///
/// # Panics
/// Panics if `penalties.len() != x.ncols()` or `y.len() != x.nrows()`.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    assert_eq!(penalties.len(), x.ncols(), "one penalty per column");
    assert_eq!(y.len(), x.nrows(), "one target per row");

    let penalized: Vec<(usize, f64)> = penalties
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, lambda)| lambda > 0.0)
        .collect();

    if penalized.is_empty() {
        return solve_least_squares(x, y);
    }

    let n = x.nrows();
    let k = x.ncols();
    let mut aug = DMatrix::zeros(n + penalized.len(), k);
    aug.view_mut((0, 0), (n, k)).copy_from(x);
    for (row, &(col, lambda)) in penalized.iter().enumerate() {
        aug[(n + row, col)] = lambda.sqrt();
    }

    let mut y_aug = DVector::zeros(n + penalized.len());
    y_aug.rows_mut(0, n).copy_from(y);

    solve_least_squares(&aug, &y_aug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ridge_resolves_collinear_indicator_into_intercept() {
        // Intercept and an all-ones indicator are identical columns. Penalizing
        // only the indicator pushes the level into the intercept.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let y = DVector::from_row_slice(&[4.0, 4.0, 4.0]);

        let beta = solve_ridge(&x, &y, &[0.0, 1e-3]).unwrap();
        assert!((beta[0] - 4.0).abs() < 1e-6, "intercept {}", beta[0]);
        assert!(beta[1].abs() < 1e-6, "indicator {}", beta[1]);
    }

    #[test]
    fn ridge_with_zero_penalties_matches_plain_least_squares() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 3.0, 5.0]);

        let a = solve_ridge(&x, &y, &[0.0, 0.0]).unwrap();
        let b = solve_least_squares(&x, &y).unwrap();
        assert!((a - b).norm() < 1e-12);
    }
}
