//! Shared "analysis pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! text rows -> coercion -> branch filter -> {product metrics, monthly series} -> trend
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use log::info;

use crate::analysis::{
    aggregate_monthly, aggregate_products, annotations, filter_branch, fit_trend, month_key,
    normalize_rows,
};
use crate::domain::{
    AnalysisConfig, MonthlyPoint, ProductAnnotation, ProductMetric, ReportFile, RowIssue,
    SalesRecord, TrendLine,
};
use crate::io::ingest::SalesTable;

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub config: AnalysisConfig,
    pub rows_read: usize,
    /// Records that survived coercion (before the branch filter).
    pub rows_used: usize,
    /// Records remaining after the branch filter.
    pub rows_selected: usize,
    /// Rows removed by `InvalidPeriodPolicy::Drop`.
    pub rows_dropped: usize,
    /// Ingest issues followed by coercion issues.
    pub row_issues: Vec<RowIssue>,
    pub products: Vec<ProductMetric>,
    pub monthly: Vec<MonthlyPoint>,
    pub trend: Option<TrendLine>,
    pub annotations: Vec<ProductAnnotation>,
    /// Units sold over the selected rows.
    pub units_selected: f64,
    /// Units sold over the selected rows that have a valid month.
    pub units_dated: f64,
}

impl AnalysisOutput {
    /// Snapshot suitable for `io::report_file`.
    pub fn to_report_file(&self, source: &str) -> ReportFile {
        ReportFile {
            tool: "sales".to_string(),
            source: source.to_string(),
            config: self.config.clone(),
            products: self.products.clone(),
            monthly: self.monthly.clone(),
            trend: self.trend,
            annotations: self.annotations.clone(),
        }
    }
}

/// Execute the full aggregation pipeline over an already-loaded table.
pub fn run_analysis(table: &SalesTable, config: &AnalysisConfig) -> AnalysisOutput {
    // 1) Coerce text rows per the invalid-period policy.
    let normalized = normalize_rows(&table.rows, config.invalid_period);

    // 2) Restrict to the selected branch.
    let selected = filter_branch(&normalized.records, &config.branch);

    // 3) Aggregate.
    let products = aggregate_products(&selected, config.average);
    let monthly = aggregate_monthly(&selected);

    // 4) Fit the trend on the ordered monthly series.
    let trend = fit_trend(&monthly);

    let mut row_issues = table.row_issues.clone();
    row_issues.extend(normalized.issues);

    info!(
        "analysis: branch={} average={} invalid-period={} rows={} selected={} products={} months={}",
        config.branch.label(),
        config.average.display_name(),
        config.invalid_period.display_name(),
        normalized.records.len(),
        selected.len(),
        products.len(),
        monthly.len()
    );

    AnalysisOutput {
        config: config.clone(),
        rows_read: table.rows_read,
        rows_used: normalized.records.len(),
        rows_selected: selected.len(),
        rows_dropped: normalized.dropped,
        row_issues,
        annotations: annotations(&products),
        products,
        monthly,
        trend,
        units_selected: sum_units(selected.iter().copied()),
        units_dated: sum_units(
            selected
                .iter()
                .copied()
                .filter(|r| month_key(r.year, r.month).is_some()),
        ),
    }
}

fn sum_units<'a>(records: impl Iterator<Item = &'a SalesRecord>) -> f64 {
    records.filter_map(|r| r.units_sold).sum()
}
