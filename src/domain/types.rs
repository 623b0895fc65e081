//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const COL_BRANCH: &str = "Sucursal";
pub const COL_PRODUCT: &str = "Producto";
pub const COL_YEAR: &str = "Año";
pub const COL_MONTH: &str = "Mes";
pub const COL_UNITS: &str = "Unidades_vendidas";
pub const COL_REVENUE: &str = "Ingreso_total";
pub const COL_COST: &str = "Costo_total";

/// Columns every input file must carry (exact header match).
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_BRANCH,
    COL_PRODUCT,
    COL_YEAR,
    COL_MONTH,
    COL_UNITS,
    COL_REVENUE,
    COL_COST,
];

/// How per-product averages are computed.
///
/// The same policy always applies to both the unit price and the margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AveragePolicy {
    /// Ratio of group sums: `Σrevenue / Σunits` and `(Σrevenue − Σcost) / Σrevenue`.
    Weighted,
    /// Mean of per-row ratios: `mean(revenue / units)` and `mean((revenue − cost) / revenue)`.
    Simple,
}

impl AveragePolicy {
    pub fn display_name(self) -> &'static str {
        match self {
            AveragePolicy::Weighted => "revenue-weighted",
            AveragePolicy::Simple => "simple mean",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            AveragePolicy::Weighted => AveragePolicy::Simple,
            AveragePolicy::Simple => AveragePolicy::Weighted,
        }
    }
}

/// What happens to a row whose year or month does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidPeriodPolicy {
    /// Substitute `0` and keep the row (it still counts toward product metrics).
    #[value(name = "zero-fill")]
    ZeroFill,
    /// Remove the row before any aggregation.
    Drop,
}

impl InvalidPeriodPolicy {
    pub fn display_name(self) -> &'static str {
        match self {
            InvalidPeriodPolicy::ZeroFill => "zero-fill",
            InvalidPeriodPolicy::Drop => "drop",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            InvalidPeriodPolicy::ZeroFill => InvalidPeriodPolicy::Drop,
            InvalidPeriodPolicy::Drop => InvalidPeriodPolicy::ZeroFill,
        }
    }
}

/// Branch restriction for a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchSelection {
    #[default]
    All,
    Only(String),
}

impl BranchSelection {
    /// Label shown in selectors for the "no restriction" choice.
    pub const ALL_LABEL: &'static str = "All";

    /// `None` and the literal `All` both mean "every branch".
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => BranchSelection::All,
            Some(v) if v == Self::ALL_LABEL => BranchSelection::All,
            Some(v) => BranchSelection::Only(v.to_string()),
        }
    }

    pub fn matches(&self, branch: &str) -> bool {
        match self {
            BranchSelection::All => true,
            BranchSelection::Only(name) => name == branch,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BranchSelection::All => Self::ALL_LABEL,
            BranchSelection::Only(name) => name,
        }
    }
}

/// A CSV row as text, after schema validation but before type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSalesRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub branch: String,
    pub product: String,
    pub year: String,
    pub month: String,
    pub units_sold: String,
    pub revenue: String,
    pub cost: String,
}

/// A normalized sales row.
///
/// Numeric amounts that failed to parse are `None` and are skipped by every
/// sum and mean; they are never read as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub line: usize,
    pub branch: String,
    pub product: String,
    pub year: i32,
    pub month: i32,
    pub units_sold: Option<f64>,
    pub revenue: Option<f64>,
    pub cost: Option<f64>,
}

/// A row-level problem encountered while reading or coercing input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub line: usize,
    /// Offending column, when the issue is tied to one field.
    pub column: Option<String>,
    pub message: String,
}

/// Aggregate metrics for one product.
///
/// `None` means "not computable" (zero denominator or no usable values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetric {
    pub product: String,
    pub average_unit_price: Option<f64>,
    pub average_margin: Option<f64>,
    pub total_units_sold: f64,
}

/// Units sold in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub units_sold: f64,
}

impl MonthlyPoint {
    pub fn label(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }

    /// Months since January of year 0; a calendar x axis for charts.
    pub fn ordinal(&self) -> f64 {
        (self.month.year() as f64) * 12.0 + self.month.month0() as f64
    }
}

/// Least-squares line fitted against the position index `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    /// Number of monthly points the line was fitted on.
    pub n: usize,
}

impl TrendLine {
    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// Fitted values at every index the line was fitted on.
    pub fn fitted(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.predict(i)).collect()
    }
}

/// Values a chart callout needs for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAnnotation {
    pub product: String,
    pub average_unit_price: Option<f64>,
    pub average_margin: Option<f64>,
}

/// The explicit request object for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub branch: BranchSelection,
    pub average: AveragePolicy,
    pub invalid_period: InvalidPeriodPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            branch: BranchSelection::All,
            average: AveragePolicy::Weighted,
            invalid_period: InvalidPeriodPolicy::ZeroFill,
        }
    }
}

/// A full `sales report` configuration as understood by the app layer.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub csv_path: PathBuf,
    pub analysis: AnalysisConfig,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_products: Option<PathBuf>,
    pub export_monthly: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved analysis report (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub source: String,
    pub config: AnalysisConfig,
    pub products: Vec<ProductMetric>,
    pub monthly: Vec<MonthlyPoint>,
    pub trend: Option<TrendLine>,
    pub annotations: Vec<ProductAnnotation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_selection_treats_all_label_as_no_filter() {
        assert_eq!(BranchSelection::from_option(None), BranchSelection::All);
        assert_eq!(BranchSelection::from_option(Some("All")), BranchSelection::All);
        assert_eq!(
            BranchSelection::from_option(Some(" Norte ")),
            BranchSelection::Only("Norte".to_string())
        );
    }

    #[test]
    fn branch_selection_matches_exact_text() {
        let sel = BranchSelection::Only("Norte".to_string());
        assert!(sel.matches("Norte"));
        assert!(!sel.matches("norte"));
        assert!(BranchSelection::All.matches("anything"));
    }

    #[test]
    fn trend_line_predicts_on_index() {
        let t = TrendLine { slope: 10.0, intercept: 10.0, n: 3 };
        assert_eq!(t.fitted(), vec![10.0, 20.0, 30.0]);
    }
}
