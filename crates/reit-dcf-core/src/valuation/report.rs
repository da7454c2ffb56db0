use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput};
use crate::ReitDcfResult;

use super::dcf::{project, DcfOptions};
use super::params::{ValuationParams, ValuationResult};
use super::summary::{ValuationSummary, DISPLAY_DECIMALS};

/// A DCF result together with solver diagnostics and display figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationReport {
    pub valuation: ValuationResult,
    pub irr_converged: bool,
    pub irr_iterations: u32,
    pub summary: ValuationSummary,
}

/// Run a DCF valuation and wrap it in the standard computation envelope,
/// collecting warnings about anything a reader should not take at face value.
pub fn run_valuation(
    params: &ValuationParams,
    options: &DcfOptions,
) -> ReitDcfResult<ComputationOutput<ValuationReport>> {
    let start = Instant::now();
    options.validate()?;

    // Pin the clock once so the warnings and the projection agree on "now".
    let options = DcfOptions {
        as_of: Some(options.now()),
        ..options.clone()
    };
    let now = options.now();
    let mut warnings: Vec<String> = Vec::new();

    if params.discount_rate <= -1.0 {
        warnings.push(format!(
            "Discount rate {} is at or below -100%; discounted figures are undefined",
            params.discount_rate
        ));
    }

    for (i, debt) in params.debts.iter().enumerate() {
        if debt.maturity_date < now {
            let label = debt.name.clone().unwrap_or_else(|| format!("debt[{i}]"));
            warnings.push(format!(
                "{label} matured on {}; it is still amortised over the elapsed years",
                debt.maturity_date.date_naive()
            ));
        }
    }

    let (valuation, irr) = project(params, &options);

    if !irr.converged {
        warnings.push(format!(
            "IRR did not converge within {} iterations; {} is the last iterate",
            irr.iterations, irr.rate
        ));
    }

    let summary = ValuationSummary::from_result(&valuation, DISPLAY_DECIMALS);
    for field in summary.missing_fields() {
        warnings.push(format!("{field} is not a finite number"));
    }

    let report = ValuationReport {
        valuation,
        irr_converged: irr.converged,
        irr_iterations: irr.iterations,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "REIT DCF: straight-line debt service, residual value at horizon, Newton-Raphson IRR",
        &serde_json::json!({
            "forecast_years": options.forecast_years,
            "as_of": now.to_rfc3339(),
            "discount_rate": params.discount_rate,
            "irr_initial_guess": options.irr.initial_guess,
            "irr_tolerance": options.irr.tolerance,
            "irr_max_iterations": options.irr.max_iterations,
        }),
        warnings,
        elapsed,
        report,
    ))
}
