//! Linear trend over the monthly series.
//!
//! The line is fitted against the position index `0..n`, not calendar time, so
//! gaps between months are treated as contiguous.

use log::warn;
use nalgebra::DVector;

use crate::domain::{MonthlyPoint, TrendLine};
use crate::math::{index_design_matrix, solve_least_squares};

/// Fit `units ≈ slope * i + intercept` by ordinary least squares.
///
/// - no points: `None`
/// - one point: a flat line through that point
pub fn fit_trend(points: &[MonthlyPoint]) -> Option<TrendLine> {
    match points {
        [] => None,
        [only] => Some(TrendLine {
            slope: 0.0,
            intercept: only.units_sold,
            n: 1,
        }),
        _ => {
            let n = points.len();
            let x = index_design_matrix(n);
            let y = DVector::from_iterator(n, points.iter().map(|p| p.units_sold));
            let Some(beta) = solve_least_squares(&x, &y) else {
                warn!("trend fit failed on {n} monthly points");
                return None;
            };
            Some(TrendLine {
                slope: beta[1],
                intercept: beta[0],
                n,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> Vec<MonthlyPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| MonthlyPoint {
                month: NaiveDate::from_ymd_opt(2023, i as u32 + 1, 1).unwrap(),
                units_sold: v,
            })
            .collect()
    }

    #[test]
    fn two_points_give_exact_line() {
        let t = fit_trend(&series(&[10.0, 20.0])).unwrap();
        assert!((t.slope - 10.0).abs() < 1e-9);
        assert!((t.intercept - 10.0).abs() < 1e-9);
        assert_eq!(t.n, 2);
    }

    #[test]
    fn noisy_points_match_closed_form() {
        let values = [3.0, 7.0, 4.0, 9.0, 11.0];
        let t = fit_trend(&series(&values)).unwrap();

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;
        let sxy: f64 = values.iter().enumerate().map(|(i, y)| (i as f64 - x_mean) * (y - y_mean)).sum();
        let sxx: f64 = (0..values.len()).map(|i| (i as f64 - x_mean).powi(2)).sum();
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        assert!((t.slope - slope).abs() < 1e-9);
        assert!((t.intercept - intercept).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(fit_trend(&[]).is_none());
        let t = fit_trend(&series(&[42.0])).unwrap();
        assert_eq!(t.slope, 0.0);
        assert_eq!(t.intercept, 42.0);
    }

    #[test]
    fn fit_is_deterministic() {
        let s = series(&[5.0, 1.0, 8.0, 2.0, 9.0, 3.0]);
        assert_eq!(fit_trend(&s), fit_trend(&s));
    }
}
