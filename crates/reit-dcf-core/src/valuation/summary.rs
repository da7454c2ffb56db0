use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::params::ValuationResult;

/// Default number of decimal places for displayed figures.
pub const DISPLAY_DECIMALS: u32 = 4;

/// Headline figures ready for display.
///
/// Each field is `None` when the underlying value is NaN, infinite or too
/// large for a `Decimal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSummary {
    pub irr: Option<Decimal>,
    pub fair_value: Option<Decimal>,
    #[serde(rename = "priceToNAV")]
    pub price_to_nav: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
    pub nav: Option<Decimal>,
    pub forecast_years: usize,
}

impl ValuationSummary {
    pub fn from_result(result: &ValuationResult, decimals: u32) -> Self {
        Self {
            irr: to_display(result.irr, decimals),
            fair_value: to_display(result.fair_value, decimals),
            price_to_nav: to_display(result.price_to_nav, decimals),
            dividend_yield: to_display(result.dividend_yield, decimals),
            nav: to_display(result.total_cash_flow, decimals),
            forecast_years: result.cash_flows.len(),
        }
    }

    /// Names of headline figures that could not be displayed.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("irr", self.irr.is_none()),
            ("fairValue", self.fair_value.is_none()),
            ("priceToNAV", self.price_to_nav.is_none()),
            ("dividendYield", self.dividend_yield.is_none()),
            ("nav", self.nav.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Round a finite `f64` to `decimals` places, half away from zero.
pub fn to_display(value: f64, decimals: u32) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
}
