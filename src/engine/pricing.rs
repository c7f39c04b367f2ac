//! Revaluation and price updates.

use super::core::{CreditAccount, CreditState};
use crate::events::{EventPayload, OracleDegradedEvent, PriceOverriddenEvent, RevaluedEvent};
use crate::price_feed::{fetch_prices_or_zero, OracleError, PriceOracle};
use crate::types::Asset;
use crate::valuation::{self, ValuationResult};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

impl<O: PriceOracle> CreditAccount<O> {
    /// Full revaluation: fetch fresh prices for every held asset, then recompute.
    ///
    /// Never fails. An unavailable oracle prices everything at zero and the
    /// degradation is logged and recorded as an event.
    pub fn revalue(&mut self) {
        let assets: BTreeSet<Asset> = self.ledger.assets().cloned().collect();
        let (snapshot, err) = fetch_prices_or_zero(&self.oracle, &assets);

        if let Some(err) = err {
            tracing::warn!(account = %self.config.label, error = %err, "price fetch failed, valuing at zero");
            let OracleError::Unavailable { oracle, reason } = err;
            self.emit_event(EventPayload::OracleDegraded(OracleDegradedEvent {
                oracle,
                reason,
                assets_zeroed: assets.into_iter().collect(),
            }));
        }

        self.prices = snapshot;
        let result = valuation::revalue(&self.ledger, &self.prices, &self.params);
        self.apply_valuation(result, true);
    }

    /// Recompute from the current snapshot without fetching. Used after prices are
    /// injected with [`CreditAccount::set_price`].
    pub fn reprice(&mut self) {
        let result = valuation::revalue(&self.ledger, &self.prices, &self.params);
        self.apply_valuation(result, false);
    }

    /// Overwrite one price in the snapshot. Derived state is untouched until the
    /// next [`CreditAccount::reprice`] or [`CreditAccount::revalue`].
    pub fn set_price(&mut self, asset: Asset, price: Decimal) {
        let old_price = self.prices.get(&asset);
        self.prices.set(asset.clone(), price);
        let new_price = self.prices.get(&asset);

        tracing::info!(account = %self.config.label, %asset, %old_price, %new_price, "price overridden");
        self.emit_event(EventPayload::PriceOverridden(PriceOverriddenEvent {
            asset,
            old_price,
            new_price,
        }));
    }

    // the only place the five scalars are written after a valuation
    fn apply_valuation(&mut self, result: ValuationResult, fetched: bool) {
        for row in &result.per_asset {
            tracing::debug!(
                account = %self.config.label,
                asset = %row.asset,
                amount = %row.amount,
                price = %row.price,
                value = %row.value,
                credit = %row.credit_contribution,
                "valued holding"
            );
        }

        self.state = CreditState::from_valuation(&result, self.state.utilized_credit_usd);
        self.valuation = result;

        tracing::info!(
            account = %self.config.label,
            total_collateral = %self.state.total_collateral_value_usd,
            max_credit_line = %self.state.max_credit_line_usd,
            available = %self.state.available_credit_usd,
            ltv = %self.state.current_ltv,
            "revalued"
        );

        self.emit_event(EventPayload::Revalued(RevaluedEvent {
            total_collateral_value: self.state.total_collateral_value_usd,
            max_credit_line: self.state.max_credit_line_usd,
            current_ltv: self.state.current_ltv,
            fetched,
        }));
        self.track_health();
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RiskParameters;
    use crate::engine::CreditAccount;
    use crate::events::EventPayload;
    use crate::price_feed::StaticPriceOracle;
    use crate::types::Asset;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn account() -> CreditAccount<StaticPriceOracle> {
        let oracle = StaticPriceOracle::new("fixture")
            .with_price(Asset::btc(), dec!(60000))
            .with_price(Asset::usdc(), dec!(1));
        let mut account = CreditAccount::new(RiskParameters::default(), oracle).unwrap();
        account.add_collateral(&Asset::btc(), dec!(0.1)).unwrap();
        account.add_collateral(&Asset::usdc(), dec!(1000)).unwrap();
        account
    }

    #[test]
    fn revalue_pulls_fresh_prices() {
        let mut account = account();
        assert_eq!(account.total_collateral_value(), dec!(7000));

        account.oracle_mut().set_price(Asset::btc(), dec!(50000));
        account.revalue();

        assert_eq!(account.prices().get(&Asset::btc()), dec!(50000));
        assert_eq!(account.total_collateral_value(), dec!(6000));
        assert_eq!(account.max_credit_line(), dec!(3900));
    }

    #[test]
    fn revalue_twice_is_idempotent() {
        let mut account = account();
        account.spend(dec!(500)).unwrap();

        account.revalue();
        let first = account.state();
        account.revalue();
        assert_eq!(account.state(), first);
    }

    #[test]
    fn oracle_outage_degrades_to_zero() {
        let mut account = account();
        account.spend(dec!(1000)).unwrap();
        account.oracle_mut().set_healthy(false);

        account.revalue();

        assert_eq!(account.total_collateral_value(), Decimal::ZERO);
        assert_eq!(account.max_credit_line(), Decimal::ZERO);
        assert_eq!(account.available_credit(), Decimal::ZERO);
        assert_eq!(account.current_ltv(), Decimal::ZERO);
        assert_eq!(account.utilized_credit(), dec!(1000));
        assert_eq!(account.ledger().quantity(&Asset::btc()), dec!(0.1));
        assert!(account
            .events()
            .iter()
            .any(|e| matches!(e.payload, EventPayload::OracleDegraded(_))));
    }

    #[test]
    fn injected_price_applies_on_reprice_only() {
        let mut account = account();
        let before = account.state();

        account.set_price(Asset::btc(), dec!(30000));
        assert_eq!(account.state(), before);

        account.reprice();
        assert_eq!(account.total_collateral_value(), dec!(4000));
        assert_eq!(account.prices().get(&Asset::btc()), dec!(30000));
    }

    #[test]
    fn negative_injected_price_reads_zero() {
        let mut account = account();
        account.set_price(Asset::btc(), dec!(-1));
        account.reprice();
        assert_eq!(account.total_collateral_value(), dec!(1000));
    }
}
