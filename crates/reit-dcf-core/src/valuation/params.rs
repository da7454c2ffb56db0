use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{flexible_instant, Money, Rate};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// An income-producing asset held by the fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Optional label, echoed back untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Period-0 EBITDA
    #[serde(rename = "baseEBITDA", alias = "baseEbitda", alias = "base_ebitda")]
    pub base_ebitda: Money,
    /// Annual compounded EBITDA growth
    #[serde(alias = "growth_rate")]
    pub growth_rate: Rate,
    /// Terminal value realised at the end of the forecast horizon
    #[serde(alias = "residual_value")]
    pub residual_value: Money,
    /// Descriptive only; the projection never reads it
    #[serde(with = "flexible_instant", alias = "maturity_date")]
    pub maturity_date: DateTime<Utc>,
}

/// A fund-level borrowing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub principal: Money,
    #[serde(alias = "interest_rate")]
    pub interest_rate: Rate,
    #[serde(with = "flexible_instant", alias = "maturity_date")]
    pub maturity_date: DateTime<Utc>,
}

/// Everything the engine needs for one valuation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationParams {
    /// Market price per unit today
    #[serde(alias = "current_price")]
    pub current_price: Money,
    /// Outstanding units
    #[serde(alias = "total_shares")]
    pub total_shares: f64,
    pub assets: Vec<Asset>,
    /// Fraction of consolidated EBITDA convertible to operating cash
    #[serde(alias = "ebitda_to_cash_ratio")]
    pub ebitda_to_cash_ratio: Rate,
    /// Flat annual charge at the fund level
    #[serde(alias = "operating_expense")]
    pub operating_expense: Money,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(alias = "tax_rate")]
    pub tax_rate: Rate,
    /// Applied to every projected year; undefined at or below -100%
    #[serde(alias = "discount_rate")]
    pub discount_rate: Rate,
}

impl ValuationParams {
    /// Current market capitalisation (price × units).
    pub fn market_cap(&self) -> Money {
        self.current_price * self.total_shares
    }

    pub fn total_residual_value(&self) -> Money {
        self.assets.iter().map(|a| a.residual_value).sum()
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One projected year (1-indexed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub year: u32,
    pub ebitda: Money,
    pub distributable_cash: Money,
    /// `distributable_cash` discounted to today
    pub npv: Money,
}

/// Aggregate debt service for a single projected year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub principal: Money,
    pub interest: Money,
}

/// Output of a DCF run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub irr: Rate,
    pub fair_value: Money,
    #[serde(rename = "priceToNAV")]
    pub price_to_nav: f64,
    pub dividend_yield: Rate,
    pub cash_flows: Vec<CashFlow>,
    /// Discounted cash flows plus discounted residual value, i.e. NAV
    pub total_cash_flow: Money,
    pub asset_details: Vec<Asset>,
}

/// One row of a sensitivity sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityPoint {
    /// Baseline plus the adjustment that produced this row
    pub value: f64,
    pub irr: Rate,
    pub fair_value: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_params_from_web_payload() {
        let payload = serde_json::json!({
            "currentPrice": 50,
            "totalShares": 100,
            "assets": [{
                "baseEBITDA": 1000,
                "growthRate": 0.03,
                "residualValue": 5000,
                "maturityDate": "2035-12-31"
            }],
            "ebitdaToCashRatio": 0.85,
            "operatingExpense": 50,
            "taxRate": 0.25,
            "discountRate": 0.07
        });
        let params: ValuationParams = serde_json::from_value(payload).unwrap();
        assert_eq!(params.assets.len(), 1);
        assert!(params.debts.is_empty());
        assert_eq!(
            params.assets[0].maturity_date,
            Utc.with_ymd_and_hms(2035, 12, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(params.market_cap(), 5000.0);
        assert_eq!(params.total_residual_value(), 5000.0);
    }

    #[test]
    fn test_params_accept_snake_case() {
        let payload = serde_json::json!({
            "current_price": 10,
            "total_shares": 1,
            "assets": [],
            "ebitda_to_cash_ratio": 1.0,
            "operating_expense": 0,
            "debts": [{
                "principal": 100,
                "interest_rate": 0.05,
                "maturity_date": "2030-01-01T00:00:00Z"
            }],
            "tax_rate": 0,
            "discount_rate": 0.1
        });
        let params: ValuationParams = serde_json::from_value(payload).unwrap();
        assert_eq!(params.debts[0].interest_rate, 0.05);
    }

    #[test]
    fn test_missing_assets_rejected() {
        let payload = serde_json::json!({
            "currentPrice": 50,
            "totalShares": 100,
            "ebitdaToCashRatio": 0.85,
            "operatingExpense": 50,
            "taxRate": 0.25,
            "discountRate": 0.07
        });
        assert!(serde_json::from_value::<ValuationParams>(payload).is_err());
    }

    #[test]
    fn test_non_finite_result_serialises_as_null() {
        let result = ValuationResult {
            irr: f64::NAN,
            fair_value: 1.0,
            price_to_nav: f64::INFINITY,
            dividend_yield: f64::NAN,
            cash_flows: vec![],
            total_cash_flow: 0.0,
            asset_details: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["irr"].is_null());
        assert!(json["priceToNAV"].is_null());
        assert_eq!(json["fairValue"], 1.0);
    }
}
