// 8.0 engine/core.rs: the credit account. owns the ledger, the price snapshot, the
// risk regime and the five scalar fields derived from them.

use super::config::EngineConfig;
use super::results::{AccountStatus, EngineError};
use crate::config::RiskParameters;
use crate::events::{Event, EventId, EventPayload, HealthChangedEvent};
use crate::ledger::CollateralLedger;
use crate::margin::{available_credit, evaluate_health, loan_to_value, HealthState};
use crate::price_feed::{PriceOracle, PriceSnapshot};
use crate::types::Timestamp;
use crate::valuation::ValuationResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/** 8.1: scalar credit state. always replaced as a whole after a valuation pass */
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditState {
    pub utilized_credit_usd: Decimal,
    pub total_collateral_value_usd: Decimal,
    pub max_credit_line_usd: Decimal,
    pub available_credit_usd: Decimal,
    pub current_ltv: Decimal,
}

impl CreditState {
    pub fn from_valuation(valuation: &ValuationResult, utilized_credit_usd: Decimal) -> Self {
        Self {
            utilized_credit_usd,
            total_collateral_value_usd: valuation.total_collateral_value_usd,
            max_credit_line_usd: valuation.max_credit_line_usd,
            available_credit_usd: available_credit(valuation.max_credit_line_usd, utilized_credit_usd),
            current_ltv: loan_to_value(utilized_credit_usd, valuation.total_collateral_value_usd),
        }
    }
}

/** 8.2: the account. all state lives here */
#[derive(Debug)]
pub struct CreditAccount<O> {
    pub(super) config: EngineConfig,
    pub(super) params: RiskParameters,
    pub(super) oracle: O,
    pub(super) ledger: CollateralLedger,
    pub(super) prices: PriceSnapshot,
    pub(super) valuation: ValuationResult,
    pub(super) state: CreditState,
    pub(super) last_health: HealthState,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
}

impl<O: PriceOracle> CreditAccount<O> {
    pub fn new(params: RiskParameters, oracle: O) -> Result<Self, EngineError> {
        Self::with_config(EngineConfig::default(), params, oracle)
    }

    pub fn with_config(
        config: EngineConfig,
        params: RiskParameters,
        oracle: O,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self {
            config,
            params,
            oracle,
            ledger: CollateralLedger::new(),
            prices: PriceSnapshot::new(),
            valuation: ValuationResult::default(),
            state: CreditState::default(),
            last_health: HealthState::Healthy,
            events: Vec::new(),
            next_event_id: 1,
        })
    }

    pub fn params(&self) -> &RiskParameters {
        &self.params
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn ledger(&self) -> &CollateralLedger {
        &self.ledger
    }

    pub fn prices(&self) -> &PriceSnapshot {
        &self.prices
    }

    pub fn valuation(&self) -> &ValuationResult {
        &self.valuation
    }

    pub fn state(&self) -> CreditState {
        self.state
    }

    pub fn utilized_credit(&self) -> Decimal {
        self.state.utilized_credit_usd
    }

    pub fn total_collateral_value(&self) -> Decimal {
        self.state.total_collateral_value_usd
    }

    pub fn max_credit_line(&self) -> Decimal {
        self.state.max_credit_line_usd
    }

    pub fn available_credit(&self) -> Decimal {
        self.state.available_credit_usd
    }

    pub fn current_ltv(&self) -> Decimal {
        self.state.current_ltv
    }

    pub fn health(&self) -> HealthState {
        evaluate_health(self.state.utilized_credit_usd, self.state.current_ltv, &self.params)
    }

    pub fn status(&self) -> AccountStatus {
        AccountStatus {
            label: self.config.label.clone(),
            holdings: self.ledger.holdings(),
            prices: self.prices.clone(),
            valuation: self.valuation.clone(),
            state: self.state,
            health: self.health(),
        }
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), Timestamp::now(), payload);
        self.next_event_id += 1;

        tracing::debug!(account = %self.config.label, id = event.id.0, payload = ?event.payload, "event");

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }

    // emits on transitions only; a margin call is announced once, not on every operation
    pub(super) fn track_health(&mut self) {
        let current = self.health();
        if current == self.last_health {
            return;
        }

        let ltv = self.state.current_ltv;
        match current {
            HealthState::Healthy => {
                tracing::info!(account = %self.config.label, %ltv, "account health restored");
            }
            HealthState::MarginCall => {
                tracing::warn!(
                    account = %self.config.label,
                    %ltv,
                    threshold = %self.params.margin_call_ltv,
                    "margin call: add collateral or repay"
                );
            }
            HealthState::Critical => {
                tracing::warn!(
                    account = %self.config.label,
                    %ltv,
                    threshold = %self.params.liquidation_ltv,
                    "critical health: account eligible for liquidation"
                );
            }
        }

        self.emit_event(EventPayload::HealthChanged(HealthChangedEvent {
            from: self.last_health,
            to: current,
            current_ltv: ltv,
        }));
        self.last_health = current;
    }
}
