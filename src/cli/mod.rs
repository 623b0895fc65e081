//! Command-line parsing for the sales analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{AveragePolicy, InvalidPeriodPolicy};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales analysis by product: metrics and monthly trend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print product metrics, the monthly series and trend, and optionally plot/export.
    Report(ReportArgs),
    /// List the branch selector options for a file ("All" plus every branch).
    Branches(SourceArgs),
    /// Plot a previously exported JSON report.
    Plot(PlotArgs),
    /// Write a synthetic sales CSV in the expected input format.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `sales report`, but lets you
    /// switch branch and policies live.
    Tui(AnalysisArgs),
}

/// Input file selection.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Sales CSV to analyze. When omitted, pick one interactively.
    #[arg(short = 'f', long = "file", value_name = "CSV", env = "SALES_CSV")]
    pub file: Option<PathBuf>,
}

/// Options shared by every command that runs the pipeline.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Restrict to one branch (`All` for every branch).
    #[arg(short = 'b', long, env = "SALES_BRANCH")]
    pub branch: Option<String>,

    /// How per-product averages are computed.
    #[arg(long, value_enum, default_value_t = AveragePolicy::Weighted, env = "SALES_AVERAGE")]
    pub average: AveragePolicy,

    /// What to do with rows whose year or month is not numeric.
    #[arg(long, value_enum, default_value_t = InvalidPeriodPolicy::ZeroFill, env = "SALES_INVALID_PERIOD")]
    pub invalid_period: InvalidPeriodPolicy,
}

/// Options for `sales report`.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export product metrics to CSV.
    #[arg(long = "export-products", value_name = "CSV")]
    pub export_products: Option<PathBuf>,

    /// Export the monthly series (with trend) to CSV.
    #[arg(long = "export-monthly", value_name = "CSV")]
    pub export_monthly: Option<PathBuf>,

    /// Export the full report (config + metrics + series + trend) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved report.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Report JSON file produced by `sales report --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for synthetic data generation.
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of branches.
    #[arg(long, default_value_t = 3)]
    pub branches: usize,

    /// Number of products.
    #[arg(long, default_value_t = 4)]
    pub products: usize,

    /// Number of consecutive months.
    #[arg(long, default_value_t = 12)]
    pub months: usize,

    /// Year of the first month.
    #[arg(long, default_value_t = 2023)]
    pub start_year: i32,

    /// First month (1-12).
    #[arg(long, default_value_t = 1)]
    pub start_month: u32,

    /// Monthly volume growth relative to the base (0.02 = +2%/month).
    #[arg(long, default_value_t = 0.02)]
    pub growth: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_flags_parse_into_policies() {
        let cli = Cli::try_parse_from([
            "sales",
            "report",
            "-f",
            "ventas.csv",
            "--branch",
            "Norte",
            "--average",
            "simple",
            "--invalid-period",
            "drop",
            "--no-plot",
        ])
        .unwrap();

        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.analysis.source.file, Some(PathBuf::from("ventas.csv")));
        assert_eq!(args.analysis.branch.as_deref(), Some("Norte"));
        assert_eq!(args.analysis.average, AveragePolicy::Simple);
        assert_eq!(args.analysis.invalid_period, InvalidPeriodPolicy::Drop);
        assert!(args.no_plot);
    }

    #[test]
    fn zero_fill_is_the_default_period_policy() {
        let cli = Cli::try_parse_from(["sales", "tui", "-f", "x.csv"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui command");
        };
        assert_eq!(args.invalid_period, InvalidPeriodPolicy::ZeroFill);
        assert_eq!(args.average, AveragePolicy::Weighted);
    }
}
