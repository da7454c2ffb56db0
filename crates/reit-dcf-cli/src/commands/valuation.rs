use clap::Args;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use reit_dcf_core::valuation::{
    self, calculate_debt_payment_at, calculate_ebitda_forecast, solve_irr, DcfOptions, IrrConfig,
    SensitivityInput, ValuationParams, DEFAULT_FORECAST_YEARS,
};

use super::{parse_as_of, parse_number_list};
use crate::input;

/// Solver and clock flags shared by the valuation commands
#[derive(Args)]
pub struct SolverArgs {
    /// Measure debt maturities from this instant (YYYY-MM-DD or RFC 3339) instead of now
    #[arg(long)]
    pub as_of: Option<String>,

    /// Initial IRR guess
    #[arg(long, default_value_t = 0.10, allow_hyphen_values = true)]
    pub irr_guess: f64,

    /// Stop the IRR solve once the Newton step is smaller than this
    #[arg(long, default_value_t = 1e-6)]
    pub irr_tolerance: f64,

    /// Iteration cap for the IRR solve
    #[arg(long, default_value_t = 1000)]
    pub irr_max_iterations: u32,
}

impl SolverArgs {
    fn options(&self, forecast_years: u32) -> Result<DcfOptions, Box<dyn std::error::Error>> {
        let options = DcfOptions {
            forecast_years,
            as_of: parse_as_of(self.as_of.as_deref())?,
            irr: IrrConfig {
                initial_guess: self.irr_guess,
                tolerance: self.irr_tolerance,
                max_iterations: self.irr_max_iterations,
            },
        };
        options.validate()?;
        Ok(options)
    }
}

/// Arguments for a full DCF valuation
#[derive(Args)]
pub struct DcfArgs {
    /// Path to a JSON or YAML file with the valuation parameters
    #[arg(long)]
    pub input: Option<String>,

    /// Projection years
    #[arg(long, default_value_t = DEFAULT_FORECAST_YEARS)]
    pub years: u32,

    #[command(flatten)]
    pub solver: SolverArgs,
}

/// Arguments for a standalone IRR solve
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct IrrArgs {
    /// Comma-separated cash flows received at the end of years 1..n
    #[arg(long)]
    pub cash_flows: String,

    /// Price paid today
    #[arg(long)]
    pub price: f64,

    /// Fail instead of returning the last iterate when the solve does not converge
    #[arg(long)]
    pub strict: bool,

    #[arg(long, default_value_t = 0.10)]
    pub guess: f64,

    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,

    #[arg(long, default_value_t = 1000)]
    pub max_iterations: u32,
}

/// Arguments for a single-asset EBITDA projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ForecastArgs {
    /// Period-0 EBITDA
    #[arg(long)]
    pub base_ebitda: f64,

    /// Annual growth rate (e.g. 0.03 for 3%)
    #[arg(long)]
    pub growth_rate: f64,

    #[arg(long, default_value_t = DEFAULT_FORECAST_YEARS)]
    pub years: u32,
}

/// Arguments for the debt service schedule
#[derive(Args)]
pub struct DebtServiceArgs {
    /// Path to a JSON or YAML file with the valuation parameters
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, default_value_t = DEFAULT_FORECAST_YEARS)]
    pub years: u32,

    /// Measure maturities from this instant instead of now
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for a one-way sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a JSON or YAML file with the base-case valuation parameters
    #[arg(long)]
    pub input: Option<String>,

    /// Input to sweep: discountRate, taxRate, ebitdaToCashRatio or growthRate
    #[arg(long)]
    pub parameter: String,

    /// Comma-separated adjustments added to the baseline (e.g. "-0.01,0,0.01")
    #[arg(long, allow_hyphen_values = true)]
    pub range: String,

    #[command(flatten)]
    pub solver: SolverArgs,
}

fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_structured(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input file is required (or pipe JSON on stdin)".into())
    }
}

pub fn run_dcf(args: DcfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: ValuationParams = load(args.input.as_deref())?;
    let options = args.solver.options(args.years)?;
    let result = valuation::run_valuation(&params, &options)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flows = parse_number_list("cash_flows", &args.cash_flows)?;
    let config = IrrConfig {
        initial_guess: args.guess,
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    };
    let solution = solve_irr(&flows, args.price, &config);
    if args.strict {
        solution.into_result()?;
    }
    Ok(json!({ "result": solution }))
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = calculate_ebitda_forecast(args.base_ebitda, args.growth_rate, args.years)
        .into_iter()
        .enumerate()
        .map(|(i, ebitda)| json!({ "year": i + 1, "ebitda": ebitda }))
        .collect();
    Ok(json!({ "results": rows }))
}

pub fn run_debt_service(args: DebtServiceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: ValuationParams = load(args.input.as_deref())?;
    let now = parse_as_of(args.as_of.as_deref())?.unwrap_or_else(chrono::Utc::now);
    let rows: Vec<Value> = (0..args.years)
        .map(|year| {
            let payment = calculate_debt_payment_at(&params.debts, year, now);
            json!({
                "year": year + 1,
                "principal": payment.principal,
                "interest": payment.interest,
            })
        })
        .collect();
    Ok(json!({ "results": rows }))
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: ValuationParams = load(args.input.as_deref())?;
    let input = SensitivityInput {
        params,
        parameter: args.parameter.parse()?,
        range: parse_number_list("range", &args.range)?,
        options: args.solver.options(DEFAULT_FORECAST_YEARS)?,
    };
    let result = valuation::run_sensitivity(&input)?;
    Ok(serde_json::to_value(result)?)
}
