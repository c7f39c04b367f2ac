// Price Feed Integration
//
// This module abstracts where collateral prices come from. The account is agnostic
// to whether prices come from CoinGecko, an exchange, or a test fixture. Any source
// implements `PriceOracle`; a failing source degrades to zero prices instead of
// failing the valuation.

use crate::types::Asset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Last observed USD price per asset. A missing entry reads as zero (unknown).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    prices: BTreeMap<Asset, Decimal>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with every requested asset priced at zero.
    pub fn zeroed<'a>(assets: impl IntoIterator<Item = &'a Asset>) -> Self {
        let mut snapshot = Self::new();
        for asset in assets {
            snapshot.set(asset.clone(), Decimal::ZERO);
        }
        snapshot
    }

    pub fn get(&self, asset: &Asset) -> Decimal {
        self.prices.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Negative prices are meaningless here and are stored as zero.
    pub fn set(&mut self, asset: Asset, price: Decimal) {
        self.prices.insert(asset, price.max(Decimal::ZERO));
    }

    pub fn contains(&self, asset: &Asset) -> bool {
        self.prices.contains_key(asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Asset, Decimal)> {
        self.prices.iter().map(|(a, p)| (a, *p))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn clear(&mut self) {
        self.prices.clear();
    }
}

impl FromIterator<(Asset, Decimal)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (Asset, Decimal)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (asset, price) in iter {
            snapshot.set(asset, price);
        }
        snapshot
    }
}

/// Errors a price source can report. Never propagated out of a revaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Price oracle {oracle} unavailable: {reason}")]
    Unavailable { oracle: String, reason: String },
}

/// Trait for price sources. Implement this to integrate a specific market data API.
///
/// Implementations should return an entry for every requested asset, using zero for
/// anything they cannot price, and reserve `Err` for a failure of the whole source.
pub trait PriceOracle {
    /// Human readable name, used in logs and events
    fn name(&self) -> &str;

    /// Fetch current USD prices for the requested assets (could block on I/O)
    fn get_prices(&self, assets: &BTreeSet<Asset>) -> Result<PriceSnapshot, OracleError>;
}

impl<T: PriceOracle + ?Sized> PriceOracle for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_prices(&self, assets: &BTreeSet<Asset>) -> Result<PriceSnapshot, OracleError> {
        (**self).get_prices(assets)
    }
}

/// Fetch prices, degrading any failure to zero prices for the requested assets.
///
/// The returned snapshot always has an entry for every requested asset and nothing
/// else. The error, if any, is handed back so the caller can record the degradation.
pub fn fetch_prices_or_zero<O: PriceOracle + ?Sized>(
    oracle: &O,
    assets: &BTreeSet<Asset>,
) -> (PriceSnapshot, Option<OracleError>) {
    if assets.is_empty() {
        return (PriceSnapshot::new(), None);
    }

    match oracle.get_prices(assets) {
        Ok(fetched) => {
            let snapshot = assets
                .iter()
                .map(|asset| (asset.clone(), fetched.get(asset)))
                .collect();
            (snapshot, None)
        }
        Err(err) => (PriceSnapshot::zeroed(assets), Some(err)),
    }
}

/// Fixed price table, used by tests and the simulation binary.
#[derive(Debug, Clone)]
pub struct StaticPriceOracle {
    name: String,
    prices: BTreeMap<Asset, Decimal>,
    healthy: bool,
}

impl StaticPriceOracle {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prices: BTreeMap::new(),
            healthy: true,
        }
    }

    pub fn with_price(mut self, asset: Asset, price: Decimal) -> Self {
        self.set_price(asset, price);
        self
    }

    pub fn set_price(&mut self, asset: Asset, price: Decimal) {
        self.prices.insert(asset, price);
    }

    /// Drop an asset from the table so it prices at zero.
    pub fn remove_price(&mut self, asset: &Asset) {
        self.prices.remove(asset);
    }

    pub fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }
}

impl PriceOracle for StaticPriceOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_prices(&self, assets: &BTreeSet<Asset>) -> Result<PriceSnapshot, OracleError> {
        if !self.healthy {
            return Err(OracleError::Unavailable {
                oracle: self.name.clone(),
                reason: "source marked unhealthy".to_string(),
            });
        }

        Ok(assets
            .iter()
            .map(|asset| {
                let price = self.prices.get(asset).copied().unwrap_or(Decimal::ZERO);
                (asset.clone(), price)
            })
            .collect())
    }
}
