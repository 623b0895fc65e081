//! Least squares solver.
//!
//! The trend line solves a small linear regression problem of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! where each row of the design matrix is `[1, i]`.
//!
//! Implementation choices:
//! - We use SVD so the tall (more rows than columns) system is solved directly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is tiny (2 columns), so SVD cost is negligible.

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

/// Design matrix `[1, i]` for `i = 0..n`.
pub fn index_design_matrix(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, 2, |row, col| if col == 0 { 1.0 } else { row as f64 })
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
    fn index_design_matrix_has_intercept_and_position() {
        let x = index_design_matrix(3);
        assert_eq!(x.nrows(), 3);
        assert_eq!(x[(0, 0)], 1.0);
        assert_eq!(x[(2, 0)], 1.0);
        assert_eq!(x[(0, 1)], 0.0);
        assert_eq!(x[(2, 1)], 2.0);
    }
}
