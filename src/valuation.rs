//! Collateral valuation.
//!
//! Converts heterogeneous holdings into USD value and risk-weighted borrowing power.
//! Rows and sums are produced in symbol order so the output is reproducible to the
//! last digit.

use crate::config::RiskParameters;
use crate::ledger::CollateralLedger;
use crate::price_feed::PriceSnapshot;
use crate::types::Asset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One valued holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValuation {
    pub asset: Asset,
    pub amount: Decimal,
    pub price: Decimal,
    pub value: Decimal,
    pub ltv_ratio: Decimal,
    pub credit_contribution: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub total_collateral_value_usd: Decimal,
    pub max_credit_line_usd: Decimal,
    pub per_asset: Vec<AssetValuation>,
}

/// Value every non-dust holding at the given prices.
///
/// An asset priced at zero is still listed, contributing nothing. Values too large for
/// a Decimal saturate at `Decimal::MAX`.
pub fn revalue(
    ledger: &CollateralLedger,
    prices: &PriceSnapshot,
    params: &RiskParameters,
) -> ValuationResult {
    let mut result = ValuationResult::default();

    for (asset, amount) in ledger.iter() {
        let price = prices.get(asset);
        let ltv_ratio = params.ltv_ratio(asset).unwrap_or(Decimal::ZERO);
        let value = amount.checked_mul(price).unwrap_or(Decimal::MAX);
        let credit_contribution = value.checked_mul(ltv_ratio).unwrap_or(Decimal::MAX);

        result.total_collateral_value_usd = saturating_sum(result.total_collateral_value_usd, value);
        result.max_credit_line_usd = saturating_sum(result.max_credit_line_usd, credit_contribution);
        result.per_asset.push(AssetValuation {
            asset: asset.clone(),
            amount,
            price,
            value,
            ltv_ratio,
            credit_contribution,
        });
    }

    result
}

fn saturating_sum(total: Decimal, value: Decimal) -> Decimal {
    total.checked_add(value).unwrap_or(Decimal::MAX)
}
