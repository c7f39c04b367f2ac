// 7.0: every state change on the account produces an event. used for audit trails and
// for making silent outcomes (oracle degradation, residual debt) observable after the fact.

use crate::liquidation::SellOrder;
use crate::margin::HealthState;
use crate::types::{Asset, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Collateral events
    CollateralDeposited(CollateralDepositedEvent),

    // Credit events
    CreditSpent(CreditSpentEvent),
    SpendRejected(SpendRejectedEvent),
    CreditRepaid(CreditRepaidEvent),

    // Price events
    Revalued(RevaluedEvent),
    OracleDegraded(OracleDegradedEvent),
    PriceOverridden(PriceOverriddenEvent),

    // Risk events
    HealthChanged(HealthChangedEvent),
    Liquidation(LiquidationEvent),
    ResidualDebt(ResidualDebtEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralDepositedEvent {
    pub asset: Asset,
    pub amount: Decimal,
    pub new_quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditSpentEvent {
    pub amount: Decimal,
    pub utilized_credit: Decimal,
    pub available_credit: Decimal,
    pub current_ltv: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendRejectedEvent {
    pub requested: Decimal,
    pub available_credit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRepaidEvent {
    pub amount: Decimal,
    pub utilized_credit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevaluedEvent {
    pub total_collateral_value: Decimal,
    pub max_credit_line: Decimal,
    pub current_ltv: Decimal,
    // false when the pass reused the current snapshot instead of fetching
    pub fetched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleDegradedEvent {
    pub oracle: String,
    pub reason: String,
    pub assets_zeroed: Vec<Asset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOverriddenEvent {
    pub asset: Asset,
    pub old_price: Decimal,
    pub new_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChangedEvent {
    pub from: HealthState,
    pub to: HealthState,
    pub current_ltv: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub debt_before: Decimal,
    pub target: Decimal,
    pub liquidated_value: Decimal,
    pub debt_after: Decimal,
    pub sells: Vec<SellOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidualDebtEvent {
    pub remaining_debt: Decimal,
    pub shortfall: Decimal,
}
