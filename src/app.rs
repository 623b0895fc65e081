//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - resolves and loads the sales CSV
//! - runs the aggregation pipeline
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use crate::cli::{AnalysisArgs, Command, PlotArgs, ReportArgs, SampleArgs, SourceArgs};
use crate::data::{SampleConfig, generate_sample, write_sample_csv};
use crate::domain::{AnalysisConfig, BranchSelection, ReportConfig};
use crate::error::AppError;
use crate::io::ingest::load_sales_csv;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; explicit flags and the process environment still apply.
    let _ = dotenvy::dotenv();

    // We want `sales` and `sales -f ventas.csv` to behave like `sales tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log output would corrupt the screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging();
    }

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Branches(args) => handle_branches(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let csv_path = crate::cli::picker::resolve_csv_path(args.analysis.source.file.as_deref())?;
    let config = report_config_from_args(&args, csv_path);

    let table = load_sales_csv(&config.csv_path)?;
    let run = pipeline::run_analysis(&table, &config.analysis);
    let source = config.csv_path.display().to_string();

    println!("{}", crate::report::format_run_summary(&source, &run));
    println!("{}", crate::report::format_product_table(&run.products));
    println!("{}", crate::report::format_monthly_table(&run.monthly, run.trend.as_ref()));
    print!("{}", crate::report::format_trend(run.trend.as_ref()));

    if config.plot {
        println!();
        let plot = crate::plot::render_ascii_plot(
            &run.monthly,
            run.trend.as_ref(),
            config.plot_width,
            config.plot_height,
        );
        print!("{plot}");
        if !run.monthly.is_empty() {
            print!("{}", crate::report::format_annotations(&run.annotations));
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_products {
        crate::io::export::write_products_csv(path, &run.products)?;
        info!("wrote product metrics to '{}'", path.display());
    }
    if let Some(path) = &config.export_monthly {
        crate::io::export::write_monthly_csv(path, &run.monthly, run.trend.as_ref())?;
        info!("wrote monthly series to '{}'", path.display());
    }
    if let Some(path) = &config.export_json {
        crate::io::report_file::write_report_json(path, &run.to_report_file(&source))?;
        info!("wrote report to '{}'", path.display());
    }

    Ok(())
}

fn handle_branches(args: SourceArgs) -> Result<(), AppError> {
    let csv_path = crate::cli::picker::resolve_csv_path(args.file.as_deref())?;
    let table = load_sales_csv(&csv_path)?;
    for option in table.branch_options() {
        println!("{option}");
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::report_file::read_report_json(&args.report)?;
    let plot = crate::plot::render_ascii_plot_from_report(&report, args.width, args.height);
    print!("{plot}");
    print!("{}", crate::report::format_trend(report.trend.as_ref()));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        branches: args.branches,
        products: args.products,
        months: args.months,
        start_year: args.start_year,
        start_month: args.start_month,
        growth: args.growth,
        seed: args.seed,
    };
    let rows = generate_sample(&config)?;
    write_sample_file(&args.out, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

fn write_sample_file(path: &Path, rows: &[crate::data::SampleRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    write_sample_csv(file, rows)
}

fn handle_tui(args: AnalysisArgs) -> Result<(), AppError> {
    let csv_path = crate::cli::picker::resolve_csv_path(args.source.file.as_deref())?;
    let config = analysis_config_from_args(&args);
    crate::tui::run(csv_path, config)
}

pub fn analysis_config_from_args(args: &AnalysisArgs) -> AnalysisConfig {
    AnalysisConfig {
        branch: BranchSelection::from_option(args.branch.as_deref()),
        average: args.average,
        invalid_period: args.invalid_period,
    }
}

pub fn report_config_from_args(args: &ReportArgs, csv_path: PathBuf) -> ReportConfig {
    ReportConfig {
        csv_path,
        analysis: analysis_config_from_args(&args.analysis),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_products: args.export_products.clone(),
        export_monthly: args.export_monthly.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `sales` defaults to `sales tui`.
///
/// Rules:
/// - `sales`                        -> `sales tui`
/// - `sales -f ventas.csv ...`      -> `sales tui -f ventas.csv ...`
/// - `sales --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "report" | "branches" | "plot" | "sample" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["sales"])), argv(&["sales", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["sales", "-f", "v.csv"])),
            argv(&["sales", "tui", "-f", "v.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["sales", "report"])), argv(&["sales", "report"]));
        assert_eq!(rewrite_args(argv(&["sales", "--help"])), argv(&["sales", "--help"]));
    }

    #[test]
    fn all_branch_flag_means_no_filter() {
        let args = AnalysisArgs {
            source: SourceArgs { file: None },
            branch: Some("All".to_string()),
            average: crate::domain::AveragePolicy::Simple,
            invalid_period: crate::domain::InvalidPeriodPolicy::Drop,
        };
        let config = analysis_config_from_args(&args);
        assert_eq!(config.branch, BranchSelection::All);
        assert_eq!(config.average, crate::domain::AveragePolicy::Simple);
    }
}
