//! Type coercion of validated text rows.
//!
//! Year and month follow the run's `InvalidPeriodPolicy`. Units, revenue and
//! cost that do not parse become `None` regardless of policy.

use log::{debug, warn};

use crate::domain::{
    COL_COST, COL_MONTH, COL_REVENUE, COL_UNITS, COL_YEAR, InvalidPeriodPolicy, RawSalesRow,
    RowIssue, SalesRecord,
};

/// Output of coercion: kept records plus every coercion issue.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<SalesRecord>,
    pub issues: Vec<RowIssue>,
    /// Rows removed because of `InvalidPeriodPolicy::Drop`.
    pub dropped: usize,
}

pub fn normalize_rows(rows: &[RawSalesRow], policy: InvalidPeriodPolicy) -> Normalized {
    let mut out = Normalized {
        records: Vec::with_capacity(rows.len()),
        ..Normalized::default()
    };

    for row in rows {
        let year = parse_period(&row.year);
        let month = parse_period(&row.month);

        if year.is_none() {
            out.issues.push(issue(row.line, COL_YEAR, &row.year));
        }
        if month.is_none() {
            out.issues.push(issue(row.line, COL_MONTH, &row.month));
        }

        let (year, month) = match (year, month, policy) {
            (Some(y), Some(m), _) => (y, m),
            (y, m, InvalidPeriodPolicy::ZeroFill) => (y.unwrap_or(0), m.unwrap_or(0)),
            (_, _, InvalidPeriodPolicy::Drop) => {
                warn!("line {}: dropping row with invalid year/month", row.line);
                out.dropped += 1;
                continue;
            }
        };

        let units_sold = parse_amount(&row.units_sold);
        let revenue = parse_amount(&row.revenue);
        let cost = parse_amount(&row.cost);
        for (value, raw, column) in [
            (units_sold, &row.units_sold, COL_UNITS),
            (revenue, &row.revenue, COL_REVENUE),
            (cost, &row.cost, COL_COST),
        ] {
            if value.is_none() {
                out.issues.push(issue(row.line, column, raw));
            }
        }

        out.records.push(SalesRecord {
            line: row.line,
            branch: row.branch.clone(),
            product: row.product.clone(),
            year,
            month,
            units_sold,
            revenue,
            cost,
        });
    }

    out
}

/// Parse a year/month cell: an integer, or a finite decimal truncated toward zero.
pub fn parse_period(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i32>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if !v.is_finite() || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v.trunc() as i32)
}

/// Parse a numeric amount; non-finite values count as missing.
pub fn parse_amount(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn issue(line: usize, column: &str, raw: &str) -> RowIssue {
    debug!("line {line}: cannot coerce `{column}` value '{raw}'");
    RowIssue {
        line,
        column: Some(column.to_string()),
        message: format!("Invalid `{column}` value '{raw}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(year: &str, month: &str, units: &str, revenue: &str, cost: &str) -> RawSalesRow {
        RawSalesRow {
            line: 2,
            branch: "A".to_string(),
            product: "X".to_string(),
            year: year.to_string(),
            month: month.to_string(),
            units_sold: units.to_string(),
            revenue: revenue.to_string(),
            cost: cost.to_string(),
        }
    }

    #[test]
    fn parse_period_accepts_integers_and_decimals() {
        assert_eq!(parse_period("2023"), Some(2023));
        assert_eq!(parse_period(" 7 "), Some(7));
        assert_eq!(parse_period("2023.0"), Some(2023));
        assert_eq!(parse_period("3.9"), Some(3));
        assert_eq!(parse_period("trece"), None);
        assert_eq!(parse_period(""), None);
        assert_eq!(parse_period("NaN"), None);
    }

    #[test]
    fn zero_fill_keeps_row_with_zero_month() {
        let out = normalize_rows(&[raw("2023", "trece", "10", "100", "60")], InvalidPeriodPolicy::ZeroFill);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].year, 2023);
        assert_eq!(out.records[0].month, 0);
        assert_eq!(out.dropped, 0);
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].column.as_deref(), Some("Mes"));
    }

    #[test]
    fn drop_policy_removes_row() {
        let out = normalize_rows(
            &[raw("x", "1", "10", "100", "60"), raw("2023", "2", "1", "1", "1")],
            InvalidPeriodPolicy::Drop,
        );
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].month, 2);
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn bad_amounts_become_missing_not_zero() {
        let out = normalize_rows(&[raw("2023", "1", "abc", "", "inf")], InvalidPeriodPolicy::ZeroFill);
        let r = &out.records[0];
        assert_eq!(r.units_sold, None);
        assert_eq!(r.revenue, None);
        assert_eq!(r.cost, None);
        assert_eq!(out.issues.len(), 3);
    }
}
