//! Collateral ledger.
//!
//! Tracks how much of each supported asset the account holds. Quantities are never
//! negative. Holdings at or below the dust threshold are skipped by iteration and
//! pruned on withdrawal. Iteration is always in symbol order.
//!
//! The ledger does not revalue itself. Callers decide when prices are refreshed.

use crate::config::RiskParameters;
use crate::types::{is_dust, Asset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollateralLedger {
    holdings: BTreeMap<Asset, Decimal>,
}

impl CollateralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(
        &mut self,
        asset: &Asset,
        amount: Decimal,
        params: &RiskParameters,
    ) -> Result<Decimal, LedgerError> {
        if !params.is_supported(asset) {
            return Err(LedgerError::UnsupportedAsset(asset.clone()));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        // sub-dust entries are kept so small deposits accumulate; iter() hides them
        let new_quantity = self
            .quantity(asset)
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        self.holdings.insert(asset.clone(), new_quantity);
        Ok(new_quantity)
    }

    /// Strict withdrawal: fails rather than removing more than is held.
    pub fn withdraw(
        &mut self,
        asset: &Asset,
        amount: Decimal,
        params: &RiskParameters,
    ) -> Result<Decimal, LedgerError> {
        if !params.is_supported(asset) {
            return Err(LedgerError::UnsupportedAsset(asset.clone()));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let held = self.quantity(asset);
        if amount > held {
            return Err(LedgerError::InsufficientCollateral {
                asset: asset.clone(),
                requested: amount,
                available: held,
            });
        }

        self.withdraw_saturating(asset, amount);
        Ok(self.quantity(asset))
    }

    /// Removes up to `amount`, clamped at the held quantity. Returns what was actually removed.
    pub fn withdraw_saturating(&mut self, asset: &Asset, amount: Decimal) -> Decimal {
        let Some(held) = self.holdings.get_mut(asset) else {
            return Decimal::ZERO;
        };

        let removed = amount.max(Decimal::ZERO).min(*held);
        *held -= removed;

        if is_dust(*held) {
            self.holdings.remove(asset);
        }
        removed
    }

    pub fn quantity(&self, asset: &Asset) -> Decimal {
        self.holdings.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Holdings sorted by asset symbol.
    pub fn holdings(&self) -> Vec<(Asset, Decimal)> {
        self.iter().map(|(asset, qty)| (asset.clone(), qty)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Asset, Decimal)> {
        self.holdings
            .iter()
            .filter(|(_, qty)| !is_dust(**qty))
            .map(|(asset, qty)| (asset, *qty))
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.iter().map(|(asset, _)| asset)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{0} is not supported as collateral")]
    UnsupportedAsset(Asset),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Insufficient {asset} collateral: requested {requested}, available {available}")]
    InsufficientCollateral {
        asset: Asset,
        requested: Decimal,
        available: Decimal,
    },
}
