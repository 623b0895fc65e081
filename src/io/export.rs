//! Export products and the monthly series to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.
//! Not-computable metrics are written as empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{MonthlyPoint, ProductMetric, TrendLine};
use crate::error::AppError;

/// Write per-product metrics to a CSV file.
pub fn write_products_csv(path: &Path, products: &[ProductMetric]) -> Result<(), AppError> {
    write_products(create(path)?, products)
}

/// Write the monthly series (with fitted trend values) to a CSV file.
pub fn write_monthly_csv(path: &Path, monthly: &[MonthlyPoint], trend: Option<&TrendLine>) -> Result<(), AppError> {
    write_monthly(create(path)?, monthly, trend)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_products<W: Write>(out: W, products: &[ProductMetric]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["product", "average_unit_price", "average_margin", "total_units_sold"])
        .map_err(header_err)?;

    for p in products {
        wtr.write_record([
            p.product.clone(),
            fmt_opt(p.average_unit_price),
            fmt_opt(p.average_margin),
            p.total_units_sold.to_string(),
        ])
        .map_err(row_err)?;
    }

    flush(wtr)
}

fn write_monthly<W: Write>(out: W, monthly: &[MonthlyPoint], trend: Option<&TrendLine>) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["month", "units_sold", "trend"])
        .map_err(header_err)?;

    for (i, p) in monthly.iter().enumerate() {
        wtr.write_record([
            p.month.to_string(),
            p.units_sold.to_string(),
            fmt_opt(trend.map(|t| t.predict(i))),
        ])
        .map_err(row_err)?;
    }

    flush(wtr)
}

fn flush<W: Write>(mut wtr: csv::Writer<W>) -> Result<(), AppError> {
    wtr.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))
}

fn header_err(e: csv::Error) -> AppError {
    AppError::io(format!("Failed to write export CSV header: {e}"))
}

fn row_err(e: csv::Error) -> AppError {
    AppError::io(format!("Failed to write export CSV row: {e}"))
}

/// Not-computable values become empty cells.
fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.10}")).unwrap_or_default()
}
