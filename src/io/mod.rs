//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - product/monthly CSV exports (`export`)
//! - JSON report read/write (`report_file`)

pub mod export;
pub mod ingest;
pub mod report_file;

pub use export::*;
pub use ingest::*;
pub use report_file::*;
