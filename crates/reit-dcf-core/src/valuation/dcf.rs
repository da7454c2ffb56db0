use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReitDcfError;
use crate::types::{Money, Rate};
use crate::ReitDcfResult;

use super::irr::{solve_irr, IrrConfig, IrrSolution};
use super::params::{CashFlow, Debt, DebtPayment, ValuationParams, ValuationResult};

/// Projection horizon used when the caller does not pick one.
pub const DEFAULT_FORECAST_YEARS: u32 = 10;

const MS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Run-level settings for a DCF valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DcfOptions {
    pub forecast_years: u32,
    /// Instant debt maturities are measured from; `None` reads the system clock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
    pub irr: IrrConfig,
}

impl Default for DcfOptions {
    fn default() -> Self {
        Self {
            forecast_years: DEFAULT_FORECAST_YEARS,
            as_of: None,
            irr: IrrConfig::default(),
        }
    }
}

impl DcfOptions {
    pub fn with_forecast_years(forecast_years: u32) -> Self {
        Self {
            forecast_years,
            ..Self::default()
        }
    }

    pub fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.as_of = Some(now);
        self
    }

    /// The instant this run measures debt maturities against.
    pub fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }

    /// Checks solver settings only; valuation inputs are never validated.
    pub fn validate(&self) -> ReitDcfResult<()> {
        if !self.irr.tolerance.is_finite() || self.irr.tolerance <= 0.0 {
            return Err(ReitDcfError::InvalidInput {
                field: "irr.tolerance".into(),
                reason: "Tolerance must be a positive finite number".into(),
            });
        }
        if self.irr.max_iterations == 0 {
            return Err(ReitDcfError::InvalidInput {
                field: "irr.max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project, discount and summarise a fund over `forecast_years`, measuring
/// debt maturities against the system clock.
pub fn calculate_dcf(params: &ValuationParams, forecast_years: u32) -> ValuationResult {
    calculate_dcf_with(params, &DcfOptions::with_forecast_years(forecast_years))
}

/// [`calculate_dcf`] with an explicit clock and solver settings.
pub fn calculate_dcf_with(params: &ValuationParams, options: &DcfOptions) -> ValuationResult {
    project(params, options).0
}

/// Shared body of the DCF entry points; also hands back the IRR diagnostics.
pub(crate) fn project(params: &ValuationParams, options: &DcfOptions) -> (ValuationResult, IrrSolution) {
    let now = options.now();
    let n_years = options.forecast_years;
    let one_plus_r = 1.0 + params.discount_rate;

    let _span = tracing::debug_span!(
        "calculate_dcf",
        assets = params.assets.len(),
        debts = params.debts.len(),
        forecast_years = n_years
    )
    .entered();

    let mut cash_flows = Vec::with_capacity(n_years as usize);
    let mut total_npv = 0.0;

    for year in 0..n_years {
        let total_ebitda: Money = params
            .assets
            .iter()
            .map(|a| a.base_ebitda * (1.0 + a.growth_rate).powi(year as i32))
            .sum();

        let debt_service = calculate_debt_payment_at(&params.debts, year, now);
        let distributable_cash = calculate_distributable_cash(total_ebitda, &debt_service, params);
        let npv = distributable_cash / one_plus_r.powi(year as i32 + 1);

        cash_flows.push(CashFlow {
            year: year + 1,
            ebitda: total_ebitda,
            distributable_cash,
            npv,
        });
        total_npv += npv;
    }

    let total_residual_value = params.total_residual_value();
    let residual_npv = total_residual_value / one_plus_r.powi(n_years as i32);
    total_npv += residual_npv;

    let fair_value = total_npv / params.total_shares;

    // The residual is solved as an extra period after the last projected year.
    let irr_flows: Vec<Money> = cash_flows
        .iter()
        .map(|cf| cf.distributable_cash)
        .chain(std::iter::once(total_residual_value))
        .collect();
    let irr = solve_irr(&irr_flows, params.current_price, &options.irr);

    let market_cap = params.market_cap();
    let first_year_cash = cash_flows
        .first()
        .map_or(f64::NAN, |cf| cf.distributable_cash);
    let dividend_yield = first_year_cash / market_cap;
    let price_to_nav = market_cap / total_npv;

    tracing::debug!(
        nav = total_npv,
        residual_npv,
        fair_value,
        irr = irr.rate,
        "dcf projection complete"
    );

    let result = ValuationResult {
        irr: irr.rate,
        fair_value,
        price_to_nav,
        dividend_yield,
        cash_flows,
        total_cash_flow: total_npv,
        asset_details: params.assets.clone(),
    };
    (result, irr)
}

/// `base · (1+growth)^i` for `i = 0..years`.
pub fn calculate_ebitda_forecast(base_ebitda: Money, growth_rate: Rate, years: u32) -> Vec<Money> {
    (0..years)
        .map(|i| base_ebitda * (1.0 + growth_rate).powi(i as i32))
        .collect()
}

/// Cash available to unit holders in one year.
///
/// Operating expense and interest reduce the taxable base and are then
/// deducted again alongside the tax itself. Downstream figures rely on this
/// exact formula.
pub fn calculate_distributable_cash(
    total_ebitda: Money,
    debt_service: &DebtPayment,
    params: &ValuationParams,
) -> Money {
    let operating_cash_flow = total_ebitda * params.ebitda_to_cash_ratio;
    let pre_tax_cash_flow = operating_cash_flow - debt_service.interest - params.operating_expense;
    let tax = nan_preserving_max(0.0, pre_tax_cash_flow * params.tax_rate);

    operating_cash_flow
        - debt_service.principal
        - debt_service.interest
        - params.operating_expense
        - tax
}

/// Debt service for projection year `year` (0-based) against the system clock.
pub fn calculate_debt_payment(debts: &[Debt], year: u32) -> DebtPayment {
    calculate_debt_payment_at(debts, year, Utc::now())
}

/// Straight-line principal over the years left to maturity, with interest on
/// the original principal less the instalments assumed paid so far.
pub fn calculate_debt_payment_at(debts: &[Debt], year: u32, now: DateTime<Utc>) -> DebtPayment {
    let year_f = f64::from(year);
    let mut payment = DebtPayment::default();

    for debt in debts {
        let years_remaining = years_diff(now, debt.maturity_date);
        if i64::from(year) >= years_remaining {
            continue;
        }
        let principal_per_year = debt.principal / years_remaining as f64;
        let outstanding = debt.principal - principal_per_year * year_f;
        payment.principal += principal_per_year;
        payment.interest += outstanding * debt.interest_rate;
    }

    payment
}

/// Whole years between two instants: `ceil(|end - start| / 365 days)`.
///
/// Direction is ignored and leap days are not special-cased; one millisecond
/// already counts as a full year.
pub fn years_diff(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds().unsigned_abs() as f64;
    (millis / MS_PER_YEAR).ceil() as i64
}

/// `max` that lets NaN through instead of discarding it.
fn nan_preserving_max(floor: f64, value: f64) -> f64 {
    if value.is_nan() {
        value
    } else {
        value.max(floor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
