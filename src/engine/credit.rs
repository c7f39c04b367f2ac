//! Collateral deposits, credit draws and repayments.

use super::core::{CreditAccount, CreditState};
use super::results::{EngineError, RepayOutcome};
use crate::events::{
    CollateralDepositedEvent, CreditRepaidEvent, CreditSpentEvent, EventPayload, SpendRejectedEvent,
};
use crate::margin::loan_to_value;
use crate::price_feed::PriceOracle;
use crate::types::Asset;
use rust_decimal::Decimal;

impl<O: PriceOracle> CreditAccount<O> {
    /// Deposit collateral and run a full revaluation. Returns the new held quantity.
    ///
    /// Nothing is mutated when the asset is unsupported or the amount is not positive.
    pub fn add_collateral(&mut self, asset: &Asset, amount: Decimal) -> Result<Decimal, EngineError> {
        let new_quantity = match self.ledger.deposit(asset, amount, &self.params) {
            Ok(quantity) => quantity,
            Err(e) => {
                tracing::warn!(account = %self.config.label, %asset, %amount, error = %e, "deposit rejected");
                return Err(e.into());
            }
        };

        tracing::info!(account = %self.config.label, %asset, %amount, %new_quantity, "collateral added");
        self.emit_event(EventPayload::CollateralDeposited(CollateralDepositedEvent {
            asset: asset.clone(),
            amount,
            new_quantity,
        }));

        self.revalue();
        Ok(new_quantity)
    }

    /// Draw on the credit line. Does not fetch prices; LTV is recomputed against the
    /// collateral value from the last valuation.
    pub fn spend(&mut self, amount_usd: Decimal) -> Result<CreditState, EngineError> {
        if amount_usd <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount(amount_usd));
        }

        let available = self.state.available_credit_usd;
        if amount_usd > available {
            tracing::info!(account = %self.config.label, requested = %amount_usd, %available, "spend rejected");
            self.emit_event(EventPayload::SpendRejected(SpendRejectedEvent {
                requested: amount_usd,
                available_credit: available,
            }));
            return Err(EngineError::InsufficientCredit {
                requested: amount_usd,
                available,
            });
        }

        let utilized = self.state.utilized_credit_usd + amount_usd;
        self.state = CreditState {
            utilized_credit_usd: utilized,
            available_credit_usd: available - amount_usd,
            current_ltv: loan_to_value(utilized, self.state.total_collateral_value_usd),
            ..self.state
        };

        tracing::info!(
            account = %self.config.label,
            amount = %amount_usd,
            utilized = %self.state.utilized_credit_usd,
            available = %self.state.available_credit_usd,
            ltv = %self.state.current_ltv,
            "credit spent"
        );
        self.emit_event(EventPayload::CreditSpent(CreditSpentEvent {
            amount: amount_usd,
            utilized_credit: self.state.utilized_credit_usd,
            available_credit: self.state.available_credit_usd,
            current_ltv: self.state.current_ltv,
        }));
        self.track_health();

        Ok(self.state)
    }

    /// Repay up to the outstanding balance, then run a full revaluation.
    pub fn repay(&mut self, amount_usd: Decimal) -> RepayOutcome {
        let repayment = amount_usd.min(self.state.utilized_credit_usd);
        if repayment <= Decimal::ZERO {
            tracing::info!(account = %self.config.label, amount = %amount_usd, "nothing to repay");
            return RepayOutcome::NothingToRepay;
        }

        self.state.utilized_credit_usd -= repayment;
        let remaining = self.state.utilized_credit_usd;

        tracing::info!(account = %self.config.label, repaid = %repayment, %remaining, "credit repaid");
        self.emit_event(EventPayload::CreditRepaid(CreditRepaidEvent {
            amount: repayment,
            utilized_credit: remaining,
        }));

        self.revalue();
        RepayOutcome::Repaid {
            amount: repayment,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RiskParameters;
    use crate::engine::{CreditAccount, EngineError, RepayOutcome};
    use crate::events::EventPayload;
    use crate::margin::HealthState;
    use crate::price_feed::StaticPriceOracle;
    use crate::types::Asset;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn oracle() -> StaticPriceOracle {
        StaticPriceOracle::new("fixture")
            .with_price(Asset::eth(), dec!(2000))
            .with_price(Asset::usdc(), dec!(1))
    }

    fn funded_account() -> CreditAccount<StaticPriceOracle> {
        let mut account = CreditAccount::new(RiskParameters::default(), oracle()).unwrap();
        account.add_collateral(&Asset::eth(), dec!(1)).unwrap();
        account
    }

    #[test]
    fn add_collateral_revalues() {
        let account = funded_account();
        assert_eq!(account.total_collateral_value(), dec!(2000));
        assert_eq!(account.max_credit_line(), dec!(1200));
        assert_eq!(account.available_credit(), dec!(1200));
    }

    #[test]
    fn unsupported_deposit_leaves_account_untouched() {
        let mut account = funded_account();
        let before = account.state();
        let events_before = account.events().len();

        let result = account.add_collateral(&Asset::new("DOGE"), dec!(100));

        assert!(matches!(result, Err(EngineError::UnsupportedAsset(_))));
        assert_eq!(account.state(), before);
        assert_eq!(account.events().len(), events_before);
        assert_eq!(account.ledger().len(), 1);
    }

    #[test]
    fn non_positive_deposit_rejected() {
        let mut account = funded_account();
        let result = account.add_collateral(&Asset::eth(), dec!(-1));
        assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
        assert_eq!(account.ledger().quantity(&Asset::eth()), dec!(1));
    }

    #[test]
    fn oversized_deposit_values_without_overflow() {
        let oracle = StaticPriceOracle::new("fixture").with_price(Asset::btc(), dec!(10000000000));
        let mut account = CreditAccount::new(RiskParameters::default(), oracle).unwrap();

        account
            .add_collateral(&Asset::btc(), dec!(100000000000000000000))
            .unwrap();

        assert_eq!(account.total_collateral_value(), Decimal::MAX);
        assert!(account.max_credit_line() > Decimal::ZERO);
        account.spend(dec!(1000000)).unwrap();
        assert_eq!(account.health(), HealthState::Healthy);
    }

    #[test]
    fn spend_updates_credit_without_fetch() {
        let mut account = funded_account();
        account.oracle_mut().set_price(Asset::eth(), dec!(1000));

        let state = account.spend(dec!(500)).unwrap();

        // still valued at the old snapshot
        assert_eq!(state.total_collateral_value_usd, dec!(2000));
        assert_eq!(state.utilized_credit_usd, dec!(500));
        assert_eq!(state.available_credit_usd, dec!(700));
        assert_eq!(state.current_ltv, dec!(0.25));
    }

    #[test]
    fn spend_beyond_available_fails() {
        let mut account = funded_account();
        let result = account.spend(dec!(1200.01));

        assert!(matches!(result, Err(EngineError::InsufficientCredit { .. })));
        assert_eq!(account.utilized_credit(), Decimal::ZERO);
        assert!(matches!(
            account.events().last().map(|e| &e.payload),
            Some(EventPayload::SpendRejected(_))
        ));
    }

    #[test]
    fn spend_exact_available_succeeds() {
        let mut account = funded_account();
        account.spend(dec!(1200)).unwrap();
        assert_eq!(account.available_credit(), Decimal::ZERO);
    }

    #[test]
    fn spend_rejects_non_positive() {
        let mut account = funded_account();
        assert!(matches!(account.spend(Decimal::ZERO), Err(EngineError::InvalidAmount(_))));
        assert!(matches!(account.spend(dec!(-5)), Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn spend_into_margin_call_is_announced() {
        let mut params = RiskParameters::default();
        params.assets[1].ltv_ratio = dec!(0.95); // ETH
        let mut account = CreditAccount::new(params, oracle()).unwrap();
        account.add_collateral(&Asset::eth(), dec!(1)).unwrap();

        account.spend(dec!(1600)).unwrap();

        assert_eq!(account.health(), HealthState::MarginCall);
        assert!(account
            .events()
            .iter()
            .any(|e| matches!(&e.payload, EventPayload::HealthChanged(h) if h.to == HealthState::MarginCall)));
    }

    #[test]
    fn repay_caps_at_outstanding() {
        let mut account = funded_account();
        account.spend(dec!(300)).unwrap();

        let outcome = account.repay(dec!(1000));

        assert_eq!(
            outcome,
            RepayOutcome::Repaid {
                amount: dec!(300),
                remaining: Decimal::ZERO
            }
        );
        assert_eq!(account.available_credit(), dec!(1200));
    }

    #[test]
    fn repay_revalues_with_fresh_prices() {
        let mut account = funded_account();
        account.spend(dec!(400)).unwrap();
        account.oracle_mut().set_price(Asset::eth(), dec!(1000));

        account.repay(dec!(100));

        assert_eq!(account.total_collateral_value(), dec!(1000));
        assert_eq!(account.current_ltv(), dec!(0.3));
    }

    #[test]
    fn repay_without_debt_is_noop() {
        let mut account = funded_account();
        let events_before = account.events().len();

        assert_eq!(account.repay(dec!(100)), RepayOutcome::NothingToRepay);
        assert_eq!(account.events().len(), events_before);
    }

    #[test]
    fn repay_non_positive_is_noop() {
        let mut account = funded_account();
        account.spend(dec!(100)).unwrap();

        assert_eq!(account.repay(Decimal::ZERO), RepayOutcome::NothingToRepay);
        assert_eq!(account.repay(dec!(-10)), RepayOutcome::NothingToRepay);
        assert_eq!(account.utilized_credit(), dec!(100));
    }
}
