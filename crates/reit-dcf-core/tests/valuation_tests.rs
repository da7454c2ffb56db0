use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use reit_dcf_core::valuation::{
    calculate_dcf, calculate_dcf_with, calculate_debt_payment_at, calculate_ebitda_forecast,
    calculate_irr, npv_at, sensitivity_analysis_with, solve_irr, Asset, DcfOptions, Debt,
    DebtPayment, IrrConfig, SensitivityParameter, ValuationParams,
};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
}

fn asset(base_ebitda: f64, growth_rate: f64, residual_value: f64) -> Asset {
    Asset {
        name: None,
        base_ebitda,
        growth_rate,
        residual_value,
        maturity_date: Utc.with_ymd_and_hms(2045, 12, 31, 0, 0, 0).unwrap(),
    }
}

/// The fund used by the end-to-end scenarios.
fn scenario_params() -> ValuationParams {
    ValuationParams {
        current_price: 50.0,
        total_shares: 100.0,
        assets: vec![asset(1000.0, 0.03, 5000.0)],
        ebitda_to_cash_ratio: 0.85,
        operating_expense: 50.0,
        debts: vec![],
        tax_rate: 0.25,
        discount_rate: 0.07,
    }
}

fn options(forecast_years: u32) -> DcfOptions {
    DcfOptions::with_forecast_years(forecast_years).as_of(as_of())
}

// ===========================================================================
// EBITDA forecast (P1)
// ===========================================================================

#[test]
fn test_forecast_flat_growth_is_constant() {
    let forecast = calculate_ebitda_forecast(750.0, 0.0, 6);
    assert!(forecast.iter().all(|v| *v == 750.0));
}

#[test]
fn test_forecast_zero_years_is_empty() {
    assert!(calculate_ebitda_forecast(750.0, 0.05, 0).is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_forecast_monotone_in_growth_sign(
        base in 1.0f64..1_000_000.0,
        growth_bp in -5_000i32..5_000,
        years in 2u32..30,
    ) {
        let growth = f64::from(growth_bp) / 10_000.0;
        let forecast = calculate_ebitda_forecast(base, growth, years);
        prop_assert_eq!(forecast.len(), years as usize);
        for pair in forecast.windows(2) {
            if growth > 0.0 {
                prop_assert!(pair[1] > pair[0]);
            } else if growth < 0.0 {
                prop_assert!(pair[1] < pair[0]);
            } else {
                prop_assert_eq!(pair[1], pair[0]);
            }
        }
    }

    // P2: whenever the solver converges, the rate is a root of the objective.
    #[test]
    fn prop_converged_irr_is_a_root(
        flows in prop::collection::vec(0.0f64..500.0, 1..12),
        terminal in 100.0f64..5_000.0,
        price in 50.0f64..3_000.0,
    ) {
        let mut flows = flows;
        flows.push(terminal);
        let solution = solve_irr(&flows, price, &IrrConfig::default());
        if solution.converged {
            prop_assert!(npv_at(solution.rate, &flows, price).abs() < 1e-3);
        }
    }
}

// ===========================================================================
// IRR
// ===========================================================================

#[test]
fn test_irr_bond_like_flows() {
    // Price 100, 5% coupon for 4 years then principal in a fifth entry
    let flows = [5.0, 5.0, 5.0, 5.0, 100.0];
    let rate = calculate_irr(&flows, 100.0);
    assert!(npv_at(rate, &flows, 100.0).abs() < 1e-3);
}

#[test]
fn test_irr_negative_when_underwater() {
    // Pay 1000, get back 900 over three years
    let rate = calculate_irr(&[300.0, 300.0, 300.0], 1000.0);
    assert!(rate < 0.0);
    assert!(npv_at(rate, &[300.0, 300.0, 300.0], 1000.0).abs() < 1e-3);
}

#[test]
fn test_irr_empty_flows_not_finite() {
    assert!(!calculate_irr(&[], 100.0).is_finite());
}

// ===========================================================================
// Distributable cash (P3)
// ===========================================================================

#[test]
fn test_single_asset_no_frictions_distributes_cash_ratio() {
    let params = ValuationParams {
        assets: vec![asset(1200.0, 0.0, 0.0)],
        operating_expense: 0.0,
        tax_rate: 0.0,
        ..scenario_params()
    };
    let result = calculate_dcf_with(&params, &options(5));
    for cf in &result.cash_flows {
        assert_eq!(cf.distributable_cash, 1200.0 * 0.85);
    }
}

#[test]
fn test_taxed_year_follows_documented_formula() {
    let params = scenario_params();
    let result = calculate_dcf_with(&params, &options(1));
    let ocf = 1000.0 * 0.85;
    let tax = ((ocf - 50.0) * 0.25_f64).max(0.0);
    let documented = ocf - 0.0 - 0.0 - 50.0 - tax;
    assert_eq!(result.cash_flows[0].distributable_cash, documented);
}

// ===========================================================================
// Residual value boundary (P4)
// ===========================================================================

#[test]
fn test_residual_only_fund() {
    let params = ValuationParams {
        assets: vec![asset(0.0, 0.05, 3000.0), asset(0.0, -0.02, 2000.0)],
        operating_expense: 0.0,
        ..scenario_params()
    };
    let result = calculate_dcf_with(&params, &options(8));
    assert!(result.cash_flows.iter().all(|cf| cf.distributable_cash == 0.0));
    assert_eq!(result.total_cash_flow, 5000.0 / 1.07_f64.powi(8));
}

// ===========================================================================
// Sensitivity pass-through (P5)
// ===========================================================================

#[test]
fn test_zero_shift_sensitivity_equals_direct_valuation() {
    let params = scenario_params();
    let direct = calculate_dcf_with(&params, &options(10));
    let sweep = sensitivity_analysis_with(
        &params,
        &SensitivityParameter::DiscountRate,
        &[0.0],
        &options(10),
    );
    assert!((sweep[0].irr - direct.irr).abs() < 1e-12);
    assert!((sweep[0].fair_value - direct.fair_value).abs() < 1e-12);
}

#[test]
fn test_ebitda_ratio_sweep_is_monotone() {
    let params = scenario_params();
    let sweep = sensitivity_analysis_with(
        &params,
        &SensitivityParameter::EbitdaToCashRatio,
        &[-0.2, -0.1, 0.0, 0.1],
        &options(10),
    );
    let values: Vec<f64> = sweep.iter().map(|p| p.fair_value).collect();
    assert!(values.windows(2).all(|w| w[1] > w[0]), "{values:?}");
}

// ===========================================================================
// End-to-end scenarios
// ===========================================================================

#[test]
fn test_scenario_a_three_year_projection() {
    let result = calculate_dcf_with(&scenario_params(), &options(3));
    assert_eq!(result.cash_flows.len(), 3);
    assert_eq!(result.cash_flows[0].ebitda, 1000.0);
    assert!((result.cash_flows[1].ebitda - 1030.0).abs() < 1e-9);
    assert!((result.cash_flows[2].ebitda - 1060.9).abs() < 1e-9);
    assert!(result.fair_value > 0.0);
}

#[test]
fn test_scenario_a_with_system_clock() {
    // No debts, so the clock cannot influence the figures
    let pinned = calculate_dcf_with(&scenario_params(), &options(3));
    let live = calculate_dcf(&scenario_params(), 3);
    assert_eq!(pinned, live);
}

#[test]
fn test_scenario_b_zero_year_horizon() {
    let result = calculate_dcf_with(&scenario_params(), &options(0));
    assert!(result.cash_flows.is_empty());
    assert_eq!(result.total_cash_flow, 5000.0);
    assert!(result.dividend_yield.is_nan());
}

#[test]
fn test_scenario_c_debt_maturing_now_is_excluded() {
    let debts = vec![Debt {
        name: None,
        principal: 10_000.0,
        interest_rate: 0.06,
        maturity_date: as_of(),
    }];
    for year in 0..10 {
        assert_eq!(
            calculate_debt_payment_at(&debts, year, as_of()),
            DebtPayment {
                principal: 0.0,
                interest: 0.0
            }
        );
    }
}

#[test]
fn test_debt_maturing_tomorrow_counts_as_one_year() {
    let debts = vec![Debt {
        name: None,
        principal: 1000.0,
        interest_rate: 0.05,
        maturity_date: as_of() + Duration::days(1),
    }];
    let y0 = calculate_debt_payment_at(&debts, 0, as_of());
    assert_eq!(y0.principal, 1000.0);
    assert_eq!(y0.interest, 50.0);
    assert_eq!(calculate_debt_payment_at(&debts, 1, as_of()), DebtPayment::default());
}

#[test]
fn test_total_growth_collapse_does_not_panic() {
    let params = ValuationParams {
        assets: vec![asset(1000.0, -1.0, 0.0)],
        ..scenario_params()
    };
    let result = calculate_dcf_with(&params, &options(4));
    assert_eq!(result.cash_flows[0].ebitda, 1000.0);
    assert!(result.cash_flows[1..].iter().all(|cf| cf.ebitda == 0.0));
}

#[test]
fn test_valuation_from_web_json() {
    let json = r#"{
        "currentPrice": 8.4,
        "totalShares": 1000000,
        "assets": [
            {"baseEBITDA": 420000, "growthRate": 0.025, "residualValue": 6500000, "maturityDate": "2046-06-30"},
            {"baseEBITDA": 180000, "growthRate": 0.015, "residualValue": 2100000, "maturityDate": "2041-03-31"}
        ],
        "ebitdaToCashRatio": 0.9,
        "operatingExpense": 35000,
        "debts": [
            {"principal": 1500000, "interestRate": 0.042, "maturityDate": "2031-10-18T09:30:00Z"}
        ],
        "taxRate": 0.0,
        "discountRate": 0.065
    }"#;
    let params: ValuationParams = serde_json::from_str(json).unwrap();
    let result = calculate_dcf_with(&params, &options(10));

    // Five whole years to maturity: 300k principal per year for years 1-5
    let y1 = calculate_debt_payment_at(&params.debts, 0, as_of());
    assert_eq!(y1.principal, 300_000.0);

    assert_eq!(result.cash_flows.len(), 10);
    assert!(result.cash_flows[5].distributable_cash > result.cash_flows[4].distributable_cash);
    assert!(result.fair_value.is_finite());
    assert!(result.price_to_nav > 0.0);
    assert_eq!(result.asset_details, params.assets);
}
