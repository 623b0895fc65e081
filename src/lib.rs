//! `sales-trend` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - the aggregation pipeline is testable without spawning processes
//! - the CLI report and the TUI share one implementation
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
