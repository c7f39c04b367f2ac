//! Liquidation execution.

use super::core::CreditAccount;
use super::results::LiquidationResult;
use crate::events::{EventPayload, LiquidationEvent, ResidualDebtEvent};
use crate::liquidation::{apply_plan, plan_liquidation, LiquidationPlan};
use crate::margin::HealthState;
use crate::price_feed::PriceOracle;
use rust_decimal::Decimal;

impl<O: PriceOracle> CreditAccount<O> {
    /// Run a liquidation against the current price snapshot.
    ///
    /// Caller-driven: this does not check health first, and no other operation
    /// triggers it. Sells are applied in one step, debt is reduced by the proceeds
    /// (floored at zero), then the account is fully revalued.
    pub fn liquidate(&mut self) -> LiquidationResult {
        let debt_before = self.state.utilized_credit_usd;
        if debt_before <= Decimal::ZERO {
            tracing::info!(account = %self.config.label, "no debt to liquidate");
            return LiquidationResult {
                plan: LiquidationPlan::default(),
                debt_before,
                debt_after: debt_before,
                health_after: self.health(),
            };
        }

        let plan = plan_liquidation(debt_before, &self.ledger, &self.prices, &self.params);
        tracing::info!(
            account = %self.config.label,
            debt = %debt_before,
            target = %plan.target,
            "liquidation started"
        );

        for (sell, removed) in plan.sells.iter().zip(apply_plan(&plan, &mut self.ledger)) {
            tracing::info!(
                account = %self.config.label,
                asset = %sell.asset,
                quantity = %removed,
                value = %sell.value,
                "collateral liquidated"
            );
        }

        let debt_after = (debt_before - plan.liquidated_value).max(Decimal::ZERO);
        self.state.utilized_credit_usd = debt_after;

        self.emit_event(EventPayload::Liquidation(LiquidationEvent {
            debt_before,
            target: plan.target,
            liquidated_value: plan.liquidated_value,
            debt_after,
            sells: plan.sells.clone(),
        }));

        if debt_after > Decimal::ZERO {
            tracing::warn!(
                account = %self.config.label,
                remaining = %debt_after,
                "collateral exhausted before debt was covered"
            );
            self.emit_event(EventPayload::ResidualDebt(ResidualDebtEvent {
                remaining_debt: debt_after,
                shortfall: plan.target - plan.liquidated_value,
            }));
        }

        self.revalue();

        LiquidationResult {
            plan,
            debt_before,
            debt_after,
            health_after: self.health(),
        }
    }

    /// Liquidate only when the account is currently critical.
    pub fn liquidate_if_critical(&mut self) -> Option<LiquidationResult> {
        if self.health() == HealthState::Critical {
            Some(self.liquidate())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RiskParameters;
    use crate::engine::CreditAccount;
    use crate::events::EventPayload;
    use crate::margin::HealthState;
    use crate::price_feed::StaticPriceOracle;
    use crate::types::Asset;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn account_with_debt() -> CreditAccount<StaticPriceOracle> {
        let oracle = StaticPriceOracle::new("fixture")
            .with_price(Asset::usdc(), dec!(1))
            .with_price(Asset::eth(), dec!(2000));
        let mut account = CreditAccount::new(RiskParameters::default(), oracle).unwrap();
        account.add_collateral(&Asset::usdc(), dec!(500)).unwrap();
        account.add_collateral(&Asset::eth(), dec!(1)).unwrap();
        account.spend(dec!(1470)).unwrap();
        account
    }

    #[test]
    fn no_debt_is_noop() {
        let oracle = StaticPriceOracle::new("fixture").with_price(Asset::usdc(), dec!(1));
        let mut account = CreditAccount::new(RiskParameters::default(), oracle).unwrap();
        account.add_collateral(&Asset::usdc(), dec!(100)).unwrap();
        let events_before = account.events().len();

        let result = account.liquidate();

        assert!(result.plan.is_empty());
        assert_eq!(result.debt_after, Decimal::ZERO);
        assert_eq!(account.ledger().quantity(&Asset::usdc()), dec!(100));
        assert_eq!(account.events().len(), events_before);
    }

    #[test]
    fn sells_in_priority_order_and_clears_debt() {
        let mut account = account_with_debt();

        let result = account.liquidate();

        // target 1500: all 500 USDC then 1000 worth of ETH
        assert_eq!(result.plan.target, dec!(1500));
        assert_eq!(result.plan.sells.len(), 2);
        assert_eq!(result.plan.sells[0].asset, Asset::usdc());
        assert_eq!(result.plan.sells[1].asset, Asset::eth());
        assert_eq!(result.debt_after, Decimal::ZERO);
        assert_eq!(account.utilized_credit(), Decimal::ZERO);
        assert_eq!(account.ledger().quantity(&Asset::usdc()), Decimal::ZERO);
        assert_eq!(account.ledger().quantity(&Asset::eth()), dec!(0.5));
        assert_eq!(account.total_collateral_value(), dec!(1000));
        assert_eq!(result.health_after, HealthState::Healthy);
    }

    #[test]
    fn exhaustion_leaves_residual_debt() {
        let mut account = account_with_debt();
        account.set_price(Asset::eth(), dec!(500));
        account.reprice();
        assert_eq!(account.health(), HealthState::Critical);

        let result = account.liquidate();

        // only 1000 of collateral against 1470 of debt
        assert_eq!(result.liquidated_value(), dec!(1000));
        assert_eq!(result.debt_after, dec!(470));
        assert!(result.has_residual_debt());
        assert!(account.ledger().is_empty());
        assert_eq!(account.current_ltv(), Decimal::ZERO);
        assert!(account
            .events()
            .iter()
            .any(|e| matches!(e.payload, EventPayload::ResidualDebt(_))));
    }

    #[test]
    fn liquidate_if_critical_respects_health() {
        let mut account = account_with_debt();
        assert_eq!(account.health(), HealthState::Healthy);
        assert!(account.liquidate_if_critical().is_none());
        assert_eq!(account.utilized_credit(), dec!(1470));

        account.set_price(Asset::eth(), dec!(1000));
        account.reprice();
        assert_eq!(account.health(), HealthState::Critical);
        assert!(account.liquidate_if_critical().is_some());
        assert_eq!(account.utilized_credit(), Decimal::ZERO);
    }
}
