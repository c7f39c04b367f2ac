// 8.0.2: result types and errors for account operations.

use super::core::CreditState;
use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::liquidation::LiquidationPlan;
use crate::margin::HealthState;
use crate::price_feed::PriceSnapshot;
use crate::types::Asset;
use crate::valuation::ValuationResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepayOutcome {
    Repaid { amount: Decimal, remaining: Decimal },
    NothingToRepay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationResult {
    pub plan: LiquidationPlan,
    pub debt_before: Decimal,
    pub debt_after: Decimal,
    pub health_after: HealthState,
}

impl LiquidationResult {
    pub fn liquidated_value(&self) -> Decimal {
        self.plan.liquidated_value
    }

    /// Debt the collateral could not cover.
    pub fn has_residual_debt(&self) -> bool {
        self.debt_after > Decimal::ZERO
    }
}

/// Point-in-time view of the account, the structured form of a status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub label: String,
    pub holdings: Vec<(Asset, Decimal)>,
    /// Current snapshot, including injected prices not yet applied by a reprice.
    pub prices: PriceSnapshot,
    pub valuation: ValuationResult,
    pub state: CreditState,
    pub health: HealthState,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{0} is not supported as collateral")]
    UnsupportedAsset(Asset),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Insufficient credit: requested {requested}, available {available}")]
    InsufficientCredit { requested: Decimal, available: Decimal },

    #[error("Insufficient {asset} collateral: requested {requested}, available {available}")]
    InsufficientCollateral {
        asset: Asset,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnsupportedAsset(asset) => EngineError::UnsupportedAsset(asset),
            LedgerError::InvalidAmount(amount) => EngineError::InvalidAmount(amount),
            LedgerError::InsufficientCollateral {
                asset,
                requested,
                available,
            } => EngineError::InsufficientCollateral {
                asset,
                requested,
                available,
            },
        }
    }
}
