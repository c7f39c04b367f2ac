//! Liquidation planning.
//!
//! When an account breaches the liquidation line, collateral is sold in the configured
//! priority order until the proceeds cover the debt plus a slippage buffer. Planning is
//! a pure fold over the priority list; the resulting sells are applied to the ledger in
//! one step by the caller.
//!
//! Assets without a positive price cannot be valued and are skipped. If everything
//! sellable is exhausted before the target is met, the plan simply stops short and the
//! remaining debt stays on the account.

use crate::config::RiskParameters;
use crate::ledger::CollateralLedger;
use crate::price_feed::PriceSnapshot;
use crate::types::{is_dust, Asset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single forced sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellOrder {
    pub asset: Asset,
    pub quantity: Decimal,
    pub price: Decimal,
    pub value: Decimal,
    // whole holding sold rather than a fraction of it
    pub exhausted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidationPlan {
    pub debt: Decimal,
    pub target: Decimal,
    pub sells: Vec<SellOrder>,
    pub liquidated_value: Decimal,
}

impl LiquidationPlan {
    pub fn is_empty(&self) -> bool {
        self.sells.is_empty()
    }

    /// Debt left after proceeds are applied.
    pub fn residual_debt(&self) -> Decimal {
        (self.debt - self.liquidated_value).max(Decimal::ZERO)
    }

    /// True when the sellable collateral could not reach the target.
    pub fn fell_short(&self) -> bool {
        self.liquidated_value < self.target
    }
}

/// Sale proceeds required to clear `debt` after execution cost.
pub fn liquidation_target(debt: Decimal, slippage_buffer: Decimal) -> Decimal {
    debt.checked_div(Decimal::ONE - slippage_buffer).unwrap_or(Decimal::MAX)
}

pub fn plan_liquidation(
    debt: Decimal,
    ledger: &CollateralLedger,
    prices: &PriceSnapshot,
    params: &RiskParameters,
) -> LiquidationPlan {
    if debt <= Decimal::ZERO {
        return LiquidationPlan::default();
    }

    let target = liquidation_target(debt, params.slippage_buffer());

    let (liquidated_value, sells) = params.liquidation_priority.iter().fold(
        (Decimal::ZERO, Vec::new()),
        |(liquidated, mut sells), asset| {
            if liquidated >= target {
                return (liquidated, sells);
            }
            let held = ledger.quantity(asset);
            let price = prices.get(asset);
            if is_dust(held) || price <= Decimal::ZERO {
                return (liquidated, sells);
            }

            let remaining_needed = target - liquidated;
            let available_value = held.checked_mul(price).unwrap_or(Decimal::MAX);

            let order = if available_value >= remaining_needed {
                SellOrder {
                    asset: asset.clone(),
                    quantity: remaining_needed
                        .checked_div(price)
                        .map_or(held, |qty| qty.min(held)),
                    price,
                    value: remaining_needed,
                    exhausted: false,
                }
            } else {
                SellOrder {
                    asset: asset.clone(),
                    quantity: held,
                    price,
                    value: available_value,
                    exhausted: true,
                }
            };

            let liquidated = liquidated.checked_add(order.value).unwrap_or(Decimal::MAX);
            sells.push(order);
            (liquidated, sells)
        },
    );

    LiquidationPlan {
        debt,
        target,
        sells,
        liquidated_value,
    }
}

/// Apply the sells to the ledger. Returns the total quantity actually removed per order.
pub fn apply_plan(plan: &LiquidationPlan, ledger: &mut CollateralLedger) -> Vec<Decimal> {
    plan.sells
        .iter()
        .map(|sell| {
            let quantity = if sell.exhausted {
                ledger.quantity(&sell.asset)
            } else {
                sell.quantity
            };
            ledger.withdraw_saturating(&sell.asset, quantity)
        })
        .collect()
}
