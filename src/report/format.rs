//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{MonthlyPoint, ProductAnnotation, ProductMetric, TrendLine};

/// Format the run summary (source, selection, policies, row accounting).
pub fn format_run_summary(source: &str, run: &AnalysisOutput) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Sales Analysis by Product ===\n");
    out.push_str(&format!("File: {source}\n"));
    out.push_str(&format!("Branch: {}\n", run.config.branch.label()));
    out.push_str(&format!(
        "Averages: {} | invalid year/month: {}\n",
        run.config.average.display_name(),
        run.config.invalid_period.display_name(),
    ));
    out.push_str(&format!(
        "Rows: read={} | used={} | selected={} | dropped={} | issues={}\n",
        run.rows_read,
        run.rows_used,
        run.rows_selected,
        run.rows_dropped,
        run.row_issues.len(),
    ));
    out.push_str(&format!(
        "Units: selected={} | dated={}\n",
        fmt_units(run.units_selected),
        fmt_units(run.units_dated),
    ));

    out
}

/// Format the product metrics table.
pub fn format_product_table(products: &[ProductMetric]) -> String {
    let mut out = String::new();
    out.push_str("Summary by product:\n");
    push_row(
        &mut out,
        format!("{:<24} {:>14} {:>14} {:>14}", "product", "avg_price", "avg_margin", "units"),
    );
    push_row(&mut out, format!("{:-<24} {:-<14} {:-<14} {:-<14}", "", "", "", ""));

    for p in products {
        push_row(
            &mut out,
            format!(
                "{:<24} {:>14} {:>14} {:>14}",
                truncate(&p.product, 24),
                fmt_opt(p.average_unit_price, 2),
                fmt_opt(p.average_margin, 4),
                fmt_units(p.total_units_sold),
            ),
        );
    }

    out
}

/// Format the monthly series with fitted trend values.
pub fn format_monthly_table(monthly: &[MonthlyPoint], trend: Option<&TrendLine>) -> String {
    let mut out = String::new();
    out.push_str("Monthly units sold:\n");
    push_row(&mut out, format!("{:<8} {:>12} {:>12}", "month", "units", "trend"));
    push_row(&mut out, format!("{:-<8} {:-<12} {:-<12}", "", "", ""));

    for (i, p) in monthly.iter().enumerate() {
        push_row(
            &mut out,
            format!(
                "{:<8} {:>12} {:>12}",
                p.label(),
                fmt_units(p.units_sold),
                fmt_opt(trend.map(|t| t.predict(i)), 2),
            ),
        );
    }

    out
}

/// One line describing the fitted trend.
pub fn format_trend(trend: Option<&TrendLine>) -> String {
    match trend {
        Some(t) => format!(
            "Trend: slope={:.4} units/month | intercept={:.4} | n={}\n",
            t.slope, t.intercept, t.n
        ),
        None => "Trend: n/a (no dated rows)\n".to_string(),
    }
}

/// Per-product callouts shown next to the chart.
pub fn format_annotations(annotations: &[ProductAnnotation]) -> String {
    let mut out = String::new();
    for a in annotations {
        out.push_str(&format!(
            "-> {} | avg price: {} | avg margin: {}\n",
            a.product,
            fmt_opt(a.average_unit_price, 2),
            fmt_percent(a.average_margin),
        ));
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

/// Not-computable values print as `NaN`, like the table they came from.
fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "NaN".to_string(),
    }
}

fn fmt_percent(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "NaN".to_string(),
    }
}

fn fmt_units(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn product_table_snapshot() {
        let products = vec![
            ProductMetric {
                product: "X".to_string(),
                average_unit_price: Some(280.0 / 30.0),
                average_margin: Some(120.0 / 280.0),
                total_units_sold: 30.0,
            },
            ProductMetric {
                product: "Y".to_string(),
                average_unit_price: None,
                average_margin: Some(0.5),
                total_units_sold: 2.5,
            },
        ];
        let expected = concat!(
            "Summary by product:\n",
            "product                       avg_price     avg_margin          units\n",
            "------------------------ -------------- -------------- --------------\n",
            "X                                  9.33         0.4286             30\n",
            "Y                                   NaN         0.5000           2.50\n",
        );
        assert_eq!(format_product_table(&products), expected);
    }

    #[test]
    fn monthly_table_includes_trend_values() {
        let monthly = vec![
            MonthlyPoint { month: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), units_sold: 10.0 },
            MonthlyPoint { month: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(), units_sold: 20.0 },
        ];
        let trend = TrendLine { slope: 10.0, intercept: 10.0, n: 2 };
        let txt = format_monthly_table(&monthly, Some(&trend));
        assert!(txt.contains("2023-01            10        10.00"));
        assert!(txt.contains("2023-02            20        20.00"));
    }

    #[test]
    fn annotations_show_margin_as_percent() {
        let notes = vec![ProductAnnotation {
            product: "X".to_string(),
            average_unit_price: Some(9.3333),
            average_margin: Some(0.428571),
        }];
        assert_eq!(
            format_annotations(&notes),
            "-> X | avg price: 9.33 | avg margin: 42.86%\n"
        );
    }

    #[test]
    fn missing_trend_is_reported() {
        assert_eq!(format_trend(None), "Trend: n/a (no dated rows)\n");
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
