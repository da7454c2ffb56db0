//! REIT/ABS fund valuation: multi-asset cash-flow projection, discounting to
//! NAV, IRR against the market price, and one-way sensitivity sweeps.
//!
//! The calculations are plain functions over an in-memory [`ValuationParams`];
//! nothing here performs I/O. Degenerate inputs (zero shares, all-zero cash
//! flows, an empty horizon) surface as NaN or infinite figures, never as errors.

pub mod dcf;
pub mod irr;
pub mod params;
pub mod report;
pub mod sensitivity;
pub mod summary;

pub use dcf::{
    calculate_dcf, calculate_dcf_with, calculate_debt_payment, calculate_debt_payment_at,
    calculate_distributable_cash, calculate_ebitda_forecast, years_diff, DcfOptions,
    DEFAULT_FORECAST_YEARS,
};
pub use irr::{calculate_irr, npv_at, solve_irr, IrrConfig, IrrSolution};
pub use params::{
    Asset, CashFlow, Debt, DebtPayment, SensitivityPoint, ValuationParams, ValuationResult,
};
pub use report::{run_valuation, ValuationReport};
pub use sensitivity::{
    run_sensitivity, sensitivity_analysis, sensitivity_analysis_with, SensitivityInput,
    SensitivityOutput, SensitivityParameter,
};
pub use summary::ValuationSummary;
