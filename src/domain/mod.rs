//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration enums (`AveragePolicy`, `InvalidPeriodPolicy`, `BranchSelection`)
//! - input rows before and after coercion (`RawSalesRow`, `SalesRecord`)
//! - aggregation outputs (`ProductMetric`, `MonthlyPoint`, `TrendLine`, etc.)

pub mod types;

pub use types::*;
