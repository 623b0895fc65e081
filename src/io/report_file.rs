//! Read/write JSON analysis reports.
//!
//! A report is the "portable" result of a run:
//! - the analysis configuration it was produced with
//! - product metrics and annotations
//! - the monthly series and fitted trend, for re-plotting without the CSV
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::ReportFile;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid report JSON: {e}")))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use crate::domain::{AnalysisConfig, BranchSelection, ProductMetric, ReportFile, TrendLine};

    #[test]
    fn not_computable_metrics_serialize_as_null() {
        let report = ReportFile {
            tool: "sales".to_string(),
            source: "x.csv".to_string(),
            config: AnalysisConfig {
                branch: BranchSelection::Only("Norte".to_string()),
                ..AnalysisConfig::default()
            },
            products: vec![ProductMetric {
                product: "X".to_string(),
                average_unit_price: None,
                average_margin: Some(0.25),
                total_units_sold: 0.0,
            }],
            monthly: Vec::new(),
            trend: Some(TrendLine { slope: 1.0, intercept: 2.0, n: 3 }),
            annotations: Vec::new(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["products"][0]["average_unit_price"].is_null());
        assert_eq!(json["config"]["branch"]["only"], "Norte");
        assert_eq!(json["config"]["invalid_period"], "zero-fill");

        let back: ReportFile = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
