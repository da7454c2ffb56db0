use napi::Result as NapiResult;
use napi_derive::napi;

use reit_dcf_core::valuation::{self, DcfOptions, SensitivityInput, ValuationParams};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_params(params_json: &str) -> NapiResult<ValuationParams> {
    serde_json::from_str(params_json).map_err(to_napi_error)
}

fn parse_options(options_json: Option<String>) -> NapiResult<DcfOptions> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(to_napi_error),
        None => Ok(DcfOptions::default()),
    }
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

/// Raw `ValuationResult` JSON; non-finite figures come back as `null`.
#[napi]
pub fn calculate_dcf(params_json: String, forecast_years: Option<u32>) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let years = forecast_years.unwrap_or(valuation::DEFAULT_FORECAST_YEARS);
    let output = valuation::calculate_dcf(&params, years);
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Enveloped report with warnings, solver diagnostics and display figures.
#[napi]
pub fn run_valuation(params_json: String, options_json: Option<String>) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let options = parse_options(options_json)?;
    let output = valuation::run_valuation(&params, &options).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_irr(cash_flows: Vec<f64>, current_price: f64) -> f64 {
    valuation::calculate_irr(&cash_flows, current_price)
}

#[napi]
pub fn calculate_ebitda_forecast(base_ebitda: f64, growth_rate: f64, years: u32) -> Vec<f64> {
    valuation::calculate_ebitda_forecast(base_ebitda, growth_rate, years)
}

/// `debt_service_json` is `{ "principal": .., "interest": .. }`.
#[napi]
pub fn calculate_distributable_cash(
    total_ebitda: f64,
    debt_service_json: String,
    params_json: String,
) -> NapiResult<f64> {
    let debt_service: valuation::DebtPayment =
        serde_json::from_str(&debt_service_json).map_err(to_napi_error)?;
    let params = parse_params(&params_json)?;
    Ok(valuation::calculate_distributable_cash(
        total_ebitda,
        &debt_service,
        &params,
    ))
}

/// `as_of` is an optional RFC 3339 or `YYYY-MM-DD` instant; absent means now.
#[napi]
pub fn calculate_debt_payment(
    debts_json: String,
    year: u32,
    as_of: Option<String>,
) -> NapiResult<String> {
    let debts: Vec<valuation::Debt> = serde_json::from_str(&debts_json).map_err(to_napi_error)?;
    let payment = match as_of {
        Some(raw) => {
            let now = reit_dcf_core::parse_instant(&raw).map_err(to_napi_error)?;
            valuation::calculate_debt_payment_at(&debts, year, now)
        }
        None => valuation::calculate_debt_payment(&debts, year),
    };
    serde_json::to_string(&payment).map_err(to_napi_error)
}

#[napi]
pub fn years_diff(start: String, end: String) -> NapiResult<i64> {
    let start = reit_dcf_core::parse_instant(&start).map_err(to_napi_error)?;
    let end = reit_dcf_core::parse_instant(&end).map_err(to_napi_error)?;
    Ok(valuation::years_diff(start, end))
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

/// Bare `[{ value, irr, fairValue }]` rows over the default horizon.
#[napi]
pub fn sensitivity_analysis(
    params_json: String,
    parameter_name: String,
    range: Vec<f64>,
) -> NapiResult<String> {
    let params = parse_params(&params_json)?;
    let parameter: valuation::SensitivityParameter =
        parameter_name.parse().map_err(to_napi_error)?;
    let points = valuation::sensitivity_analysis(&params, &parameter, &range);
    serde_json::to_string(&points).map_err(to_napi_error)
}

/// `input_json` is `{ params, parameter, range, options? }`.
#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = valuation::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
