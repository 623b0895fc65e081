//! Monthly units-sold series.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{MonthlyPoint, SalesRecord};

/// Build the `(year, month, 1)` key for a record.
///
/// Returns `None` for year `<= 0` (the zero-fill sentinel) and for months
/// outside `1..=12`; such rows are left out of the monthly series.
pub fn month_key(year: i32, month: i32) -> Option<NaiveDate> {
    if year < 1 {
        return None;
    }
    let month = u32::try_from(month).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Sum units sold per calendar month, ascending by month.
///
/// Missing unit values contribute nothing; a month whose rows all lack units
/// still appears with a total of zero.
pub fn aggregate_monthly(records: &[&SalesRecord]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        let Some(key) = month_key(r.year, r.month) else {
            continue;
        };
        *months.entry(key).or_insert(0.0) += r.units_sold.unwrap_or(0.0);
    }

    months
        .into_iter()
        .map(|(month, units_sold)| MonthlyPoint { month, units_sold })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, month: i32, units: Option<f64>) -> SalesRecord {
        SalesRecord {
            line: 2,
            branch: "A".to_string(),
            product: "X".to_string(),
            year,
            month,
            units_sold: units,
            revenue: Some(1.0),
            cost: Some(1.0),
        }
    }

    #[test]
    fn month_key_rejects_sentinels_and_out_of_range() {
        assert!(month_key(2023, 1).is_some());
        assert!(month_key(2023, 12).is_some());
        assert!(month_key(2023, 0).is_none());
        assert!(month_key(2023, 13).is_none());
        assert!(month_key(2023, -1).is_none());
        assert!(month_key(0, 5).is_none());
    }

    #[test]
    fn groups_by_month_and_sorts_ascending() {
        let rows = vec![
            record(2023, 2, Some(20.0)),
            record(2023, 1, Some(10.0)),
            record(2023, 2, Some(5.0)),
            record(2022, 12, Some(1.0)),
        ];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let series = aggregate_monthly(&refs);
        let labels: Vec<String> = series.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2022-12", "2023-01", "2023-02"]);
        assert_eq!(series[2].units_sold, 25.0);
    }

    #[test]
    fn undated_rows_are_excluded() {
        let rows = vec![record(2023, 1, Some(10.0)), record(2023, 0, Some(99.0))];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        let series = aggregate_monthly(&refs);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].units_sold, 10.0);
    }

    #[test]
    fn missing_units_contribute_nothing() {
        let rows = vec![record(2023, 1, None), record(2023, 1, Some(4.0))];
        let refs: Vec<&SalesRecord> = rows.iter().collect();
        assert_eq!(aggregate_monthly(&refs)[0].units_sold, 4.0);
    }
}
