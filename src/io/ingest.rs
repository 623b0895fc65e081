//! CSV ingest and schema validation.
//!
//! This module is responsible for turning an uploaded sales CSV into text rows
//! whose columns are known to exist. Type coercion happens later (see
//! `analysis::normalize`) so the invalid-period policy can be chosen per run.
//!
//! Design goals:
//! - **Strict schema** for required columns (one error listing all of them, exit code 2)
//! - **Row-level validation** (skip unparseable records, but report what happened)
//! - **Deterministic behavior** (rows and branches keep file order)

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use crate::domain::{
    BranchSelection, COL_BRANCH, COL_COST, COL_MONTH, COL_PRODUCT, COL_REVENUE, COL_UNITS, COL_YEAR, RawSalesRow,
    REQUIRED_COLUMNS, RowIssue,
};
use crate::error::AppError;

/// Ingest output: validated text rows + branch list + row issues.
#[derive(Debug, Clone)]
pub struct SalesTable {
    pub rows: Vec<RawSalesRow>,
    /// Distinct non-empty branch values in order of first appearance.
    pub branches: Vec<String>,
    pub row_issues: Vec<RowIssue>,
    pub rows_read: usize,
}

impl SalesTable {
    /// Options for a branch selector: `All` followed by every branch.
    pub fn branch_options(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.branches.len() + 1);
        out.push(BranchSelection::ALL_LABEL.to_string());
        out.extend(self.branches.iter().cloned());
        out
    }

    /// Selection for a position in `branch_options`: 0 is `All`.
    ///
    /// Positions map to branches directly, so a branch named "All" still filters.
    pub fn branch_selection(&self, idx: usize) -> BranchSelection {
        match idx.checked_sub(1).and_then(|i| self.branches.get(i)) {
            Some(branch) => BranchSelection::Only(branch.clone()),
            None => BranchSelection::All,
        }
    }

    /// Position of a selection in `branch_options`, if the file has it.
    pub fn branch_index(&self, selection: &BranchSelection) -> Option<usize> {
        match selection {
            BranchSelection::All => Some(0),
            BranchSelection::Only(name) => self.branches.iter().position(|b| b == name).map(|i| i + 1),
        }
    }
}

/// Open and read a sales CSV from disk.
pub fn load_sales_csv(path: &Path) -> Result<SalesTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = read_sales_csv(file)?;
    info!(
        "loaded '{}': {} rows read, {} usable, {} branch(es)",
        path.display(),
        table.rows_read,
        table.rows.len(),
        table.branches.len()
    );
    Ok(table)
}

/// Read a sales CSV from any reader.
pub fn read_sales_csv<R: Read>(reader: R) -> Result<SalesTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let columns = resolve_columns(&header_map)?;

    let mut rows = Vec::new();
    let mut row_issues = Vec::new();
    let mut branches = Vec::new();
    let mut seen_branches = HashSet::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; file lines are 1-based.
        let fallback_line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("line {fallback_line}: CSV parse error: {e}");
                row_issues.push(RowIssue {
                    line: fallback_line,
                    column: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        let row = columns.extract(&record, line);
        // Blank branches stay in the data (they count under `All`) but are not selectable.
        if !row.branch.is_empty() && seen_branches.insert(row.branch.clone()) {
            branches.push(row.branch.clone());
        }
        rows.push(row);
    }

    Ok(SalesTable {
        rows,
        branches,
        row_issues,
        rows_read,
    })
}

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    branch: usize,
    product: usize,
    year: usize,
    month: usize,
    units: usize,
    revenue: usize,
    cost: usize,
}

impl ColumnIndex {
    fn extract(&self, record: &StringRecord, line: usize) -> RawSalesRow {
        RawSalesRow {
            line,
            branch: get_field(record, self.branch).to_string(),
            product: get_field(record, self.product).to_string(),
            year: get_field(record, self.year).to_string(),
            month: get_field(record, self.month).to_string(),
            units_sold: get_field(record, self.units).to_string(),
            revenue: get_field(record, self.revenue).to_string(),
            cost: get_field(record, self.cost).to_string(),
        }
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM; left
    // in place it makes `Sucursal` look missing.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<ColumnIndex, AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::missing_columns(&missing));
    }

    let idx = |name: &str| header_map[name];
    Ok(ColumnIndex {
        branch: idx(COL_BRANCH),
        product: idx(COL_PRODUCT),
        year: idx(COL_YEAR),
        month: idx(COL_MONTH),
        units: idx(COL_UNITS),
        revenue: idx(COL_REVENUE),
        cost: idx(COL_COST),
    })
}

fn get_field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}
