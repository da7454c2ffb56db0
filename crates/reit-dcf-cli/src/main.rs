mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::valuation::{DcfArgs, DebtServiceArgs, ForecastArgs, IrrArgs, SensitivityArgs};

/// REIT discounted cash flow valuation
#[derive(Parser)]
#[command(
    name = "reitdcf",
    version,
    about = "REIT discounted cash flow valuation",
    long_about = "Projects fund-level distributable cash from a basket of income-producing \
                  assets, discounts it to NAV, and derives fair value per unit, IRR, \
                  price-to-NAV and dividend yield. Also runs one-way sensitivity sweeps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full DCF valuation from a parameter file or stdin
    Dcf(DcfArgs),
    /// Solve the IRR of a cash-flow vector against a purchase price
    Irr(IrrArgs),
    /// Project a single asset's EBITDA
    Forecast(ForecastArgs),
    /// Show the yearly debt service schedule for a fund
    DebtService(DebtServiceArgs),
    /// Sweep one valuation input and report IRR and fair value per step
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dcf(args) => commands::valuation::run_dcf(args),
        Commands::Irr(args) => commands::valuation::run_irr(args),
        Commands::Forecast(args) => commands::valuation::run_forecast(args),
        Commands::DebtService(args) => commands::valuation::run_debt_service(args),
        Commands::Sensitivity(args) => commands::valuation::run_sensitivity(args),
        Commands::Version => {
            println!("reitdcf {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
