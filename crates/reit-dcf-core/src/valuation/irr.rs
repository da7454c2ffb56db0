use serde::{Deserialize, Serialize};

use crate::error::ReitDcfError;
use crate::types::{Money, Rate};
use crate::ReitDcfResult;

const DEFAULT_GUESS: Rate = 0.10;
const DEFAULT_TOLERANCE: f64 = 1e-6;
const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Newton-Raphson settings for the IRR solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrrConfig {
    pub initial_guess: Rate,
    /// Stop once successive iterates differ by less than this
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_GUESS,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Outcome of an IRR solve, including whether the step criterion was met.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrSolution {
    pub rate: Rate,
    pub iterations: u32,
    pub converged: bool,
    /// Size of the final Newton step
    pub last_step: f64,
}

impl IrrSolution {
    /// Turn a capped, non-converged solve into an error.
    pub fn into_result(self) -> ReitDcfResult<Rate> {
        if self.converged {
            Ok(self.rate)
        } else {
            Err(ReitDcfError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: self.iterations,
                last_delta: self.last_step,
            })
        }
    }
}

/// Internal rate of return against an upfront `current_price`.
///
/// Solves `-price + Σ cf_i / (1+r)^(i+1) = 0` with the default settings.
/// On hitting the iteration cap the last iterate is returned as-is, so treat
/// the value as advisory; use [`solve_irr`] to see whether it converged.
pub fn calculate_irr(cash_flows: &[Money], current_price: Money) -> Rate {
    solve_irr(cash_flows, current_price, &IrrConfig::default()).rate
}

/// Newton-Raphson IRR solve with explicit settings.
///
/// A zero derivative (all flows zero) yields NaN or an infinite step, which
/// is carried through rather than reported as an error.
pub fn solve_irr(cash_flows: &[Money], current_price: Money, config: &IrrConfig) -> IrrSolution {
    let mut rate = config.initial_guess;
    let mut last_step = f64::NAN;

    for i in 0..config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cash_flows, current_price, rate);
        let next = rate - npv / dnpv;
        last_step = (next - rate).abs();

        tracing::trace!(iteration = i, rate, npv, dnpv, "irr step");

        if last_step < config.tolerance {
            return IrrSolution {
                rate: next,
                iterations: i + 1,
                converged: true,
                last_step,
            };
        }
        rate = next;
    }

    tracing::warn!(
        iterations = config.max_iterations,
        rate,
        last_step,
        "IRR solve hit the iteration cap without converging"
    );

    IrrSolution {
        rate,
        iterations: config.max_iterations,
        converged: false,
        last_step,
    }
}

/// The IRR objective: `-price + Σ cf_i / (1+r)^(i+1)`.
///
/// Plugging a solved rate back in should give (close to) zero.
pub fn npv_at(rate: Rate, cash_flows: &[Money], current_price: Money) -> Money {
    npv_and_derivative(cash_flows, current_price, rate).0
}

/// Objective and its derivative `-Σ (i+1)·cf_i / (1+r)^(i+2)`.
fn npv_and_derivative(cash_flows: &[Money], current_price: Money, rate: Rate) -> (f64, f64) {
    let one_plus_r = 1.0 + rate;
    let mut npv = -current_price;
    let mut dnpv = 0.0;

    for (i, cf) in cash_flows.iter().enumerate() {
        let t = (i + 1) as i32;
        npv += cf / one_plus_r.powi(t);
        dnpv -= f64::from(t) * cf / one_plus_r.powi(t + 1);
    }

    (npv, dnpv)
}
