use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput};
use crate::ReitDcfResult;

use super::dcf::{calculate_dcf_with, DcfOptions, DEFAULT_FORECAST_YEARS};
use super::params::{SensitivityPoint, ValuationParams};

/// Baseline growth used when there is no asset to read one from.
const FALLBACK_GROWTH_RATE: f64 = 0.03;

/// Input that a sensitivity sweep perturbs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SensitivityParameter {
    DiscountRate,
    TaxRate,
    EbitdaToCashRatio,
    /// Applied to every asset, baseline read from the first one
    GrowthRate,
    /// Unknown names sweep nothing: inputs stay as-is and the baseline is 0
    Unrecognized(String),
}

impl SensitivityParameter {
    pub fn name(&self) -> &str {
        match self {
            Self::DiscountRate => "discountRate",
            Self::TaxRate => "taxRate",
            Self::EbitdaToCashRatio => "ebitdaToCashRatio",
            Self::GrowthRate => "growthRate",
            Self::Unrecognized(name) => name,
        }
    }

    fn baseline(&self, params: &ValuationParams) -> f64 {
        match self {
            Self::DiscountRate => params.discount_rate,
            Self::TaxRate => params.tax_rate,
            Self::EbitdaToCashRatio => params.ebitda_to_cash_ratio,
            Self::GrowthRate => params
                .assets
                .first()
                .map_or(FALLBACK_GROWTH_RATE, |a| a.growth_rate),
            Self::Unrecognized(_) => 0.0,
        }
    }

    fn apply(&self, params: &mut ValuationParams, value: f64) {
        match self {
            Self::DiscountRate => params.discount_rate = value,
            Self::TaxRate => params.tax_rate = value,
            Self::EbitdaToCashRatio => params.ebitda_to_cash_ratio = value,
            Self::GrowthRate => {
                for asset in &mut params.assets {
                    asset.growth_rate = value;
                }
            }
            Self::Unrecognized(_) => {}
        }
    }
}

impl FromStr for SensitivityParameter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "discountRate" | "discount_rate" => Self::DiscountRate,
            "taxRate" | "tax_rate" => Self::TaxRate,
            "ebitdaToCashRatio" | "ebitda_to_cash_ratio" => Self::EbitdaToCashRatio,
            "growthRate" | "growth_rate" => Self::GrowthRate,
            other => Self::Unrecognized(other.to_string()),
        })
    }
}

impl fmt::Display for SensitivityParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SensitivityParameter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SensitivityParameter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Self>().map_err(|never| match never {})
    }
}

/// Re-run the valuation once per adjustment, shifting `parameter` by it.
///
/// Every run uses the default ten-year horizon and the system clock.
pub fn sensitivity_analysis(
    params: &ValuationParams,
    parameter: &SensitivityParameter,
    range: &[f64],
) -> Vec<SensitivityPoint> {
    sensitivity_analysis_with(params, parameter, range, &DcfOptions::default())
}

/// [`sensitivity_analysis`] with a pinned clock and solver settings.
/// `options.forecast_years` is ignored.
pub fn sensitivity_analysis_with(
    params: &ValuationParams,
    parameter: &SensitivityParameter,
    range: &[f64],
    options: &DcfOptions,
) -> Vec<SensitivityPoint> {
    let options = DcfOptions {
        forecast_years: DEFAULT_FORECAST_YEARS,
        as_of: Some(options.now()),
        irr: options.irr,
    };
    let baseline = parameter.baseline(params);

    range
        .iter()
        .map(|adjustment| {
            let value = baseline + adjustment;
            let mut adjusted = params.clone();
            parameter.apply(&mut adjusted, value);
            let result = calculate_dcf_with(&adjusted, &options);
            SensitivityPoint {
                value,
                irr: result.irr,
                fair_value: result.fair_value,
            }
        })
        .collect()
}

/// Request shape for an enveloped sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityInput {
    pub params: ValuationParams,
    pub parameter: SensitivityParameter,
    pub range: Vec<f64>,
    #[serde(default)]
    pub options: DcfOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityOutput {
    pub parameter: SensitivityParameter,
    pub baseline: f64,
    pub results: Vec<SensitivityPoint>,
}

/// Sweep wrapped in the standard computation envelope.
pub fn run_sensitivity(input: &SensitivityInput) -> ReitDcfResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    input.options.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    if let SensitivityParameter::Unrecognized(name) = &input.parameter {
        tracing::warn!(parameter = %name, "unrecognised sensitivity parameter");
        warnings.push(format!(
            "Unrecognised parameter '{name}'; inputs were left unchanged for every run"
        ));
    }

    let results = sensitivity_analysis_with(&input.params, &input.parameter, &input.range, &input.options);

    for point in &results {
        if !point.irr.is_finite() || !point.fair_value.is_finite() {
            warnings.push(format!(
                "{} = {}: valuation produced non-finite figures",
                input.parameter, point.value
            ));
        }
    }

    let output = SensitivityOutput {
        parameter: input.parameter.clone(),
        baseline: input.parameter.baseline(&input.params),
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-way DCF sensitivity (10-year horizon)",
        &serde_json::json!({
            "parameter": input.parameter.name(),
            "range": input.range,
        }),
        warnings,
        elapsed,
        output,
    ))
}
