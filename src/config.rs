// 2.0 config.rs: risk regime in one place. per-asset LTV, thresholds, sell order.
// 2.1 constructed explicitly and handed to the account; nothing here is global or mutable
// after validation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::Asset;

// Borrowing power of a single collateral asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRiskConfig {
    pub asset: Asset,
    // Fraction of USD value that counts toward the credit line, in (0, 1]
    pub ltv_ratio: Decimal,
}

impl AssetRiskConfig {
    pub fn new(asset: Asset, ltv_ratio: Decimal) -> Self {
        Self { asset, ltv_ratio }
    }
}

/** 2.2: liquidation execution settings. the buffer over-sells to cover execution cost */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationParams {
    // target = debt / (1 - slippage_buffer)
    pub slippage_buffer: Decimal,
}

impl Default for LiquidationParams {
    fn default() -> Self {
        Self {
            slippage_buffer: dec!(0.02), // 2%
        }
    }
}

// Complete risk regime for a boost account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    // Supported collateral and its LTV ratio. anything not listed is rejected on deposit
    pub assets: Vec<AssetRiskConfig>,
    // LTV at which the account enters margin call
    pub margin_call_ltv: Decimal,
    // LTV at which the account becomes eligible for liquidation
    pub liquidation_ltv: Decimal,
    // Sell order during liquidation, first listed is sold first
    pub liquidation_priority: Vec<Asset>,
    #[serde(default)]
    pub liquidation: LiquidationParams,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            assets: vec![
                AssetRiskConfig::new(Asset::btc(), dec!(0.60)),
                AssetRiskConfig::new(Asset::eth(), dec!(0.60)),
                AssetRiskConfig::new(Asset::usdc(), dec!(0.90)),
                AssetRiskConfig::new(Asset::matic(), dec!(0.55)),
            ],
            margin_call_ltv: dec!(0.75),
            liquidation_ltv: dec!(0.85),
            liquidation_priority: vec![Asset::usdc(), Asset::eth(), Asset::matic(), Asset::btc()],
            liquidation: LiquidationParams::default(),
        }
    }
}

impl RiskParameters {
    // Build and validate a regime in one step
    pub fn new(
        assets: Vec<AssetRiskConfig>,
        margin_call_ltv: Decimal,
        liquidation_ltv: Decimal,
        liquidation_priority: Vec<Asset>,
        liquidation: LiquidationParams,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            assets,
            margin_call_ltv,
            liquidation_ltv,
            liquidation_priority,
            liquidation,
        };
        params.validate()?;
        Ok(params)
    }

    // Tighter preset: lower borrowing power and earlier warnings
    pub fn conservative() -> Self {
        let mut params = Self::default();
        for asset in &mut params.assets {
            asset.ltv_ratio = match asset.asset.symbol() {
                "USDC" => dec!(0.85),
                "MATIC" => dec!(0.40),
                _ => dec!(0.50),
            };
        }
        params.margin_call_ltv = dec!(0.65);
        params.liquidation_ltv = dec!(0.75);
        params.liquidation.slippage_buffer = dec!(0.03);
        params
    }

    // Parse a regime from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    // Validate the regime for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut supported = BTreeSet::new();
        for entry in &self.assets {
            if entry.ltv_ratio <= Decimal::ZERO || entry.ltv_ratio > Decimal::ONE {
                return Err(ConfigError::InvalidLtvRatio {
                    asset: entry.asset.clone(),
                    ratio: entry.ltv_ratio,
                });
            }
            if !supported.insert(entry.asset.clone()) {
                return Err(ConfigError::DuplicateAsset(entry.asset.clone()));
            }
        }

        if self.margin_call_ltv <= Decimal::ZERO || self.margin_call_ltv >= self.liquidation_ltv {
            return Err(ConfigError::InvalidThresholds {
                margin_call_ltv: self.margin_call_ltv,
                liquidation_ltv: self.liquidation_ltv,
            });
        }

        // priority must be a permutation of the supported set
        let mut seen = BTreeSet::new();
        for asset in &self.liquidation_priority {
            if !supported.contains(asset) {
                return Err(ConfigError::InvalidPriority {
                    reason: format!("{asset} is not a supported collateral asset"),
                });
            }
            if !seen.insert(asset.clone()) {
                return Err(ConfigError::InvalidPriority {
                    reason: format!("{asset} appears more than once"),
                });
            }
        }
        if let Some(missing) = supported.difference(&seen).next() {
            return Err(ConfigError::InvalidPriority {
                reason: format!("{missing} is missing and could never be liquidated"),
            });
        }

        let buffer = self.liquidation.slippage_buffer;
        if buffer < Decimal::ZERO || buffer >= Decimal::ONE {
            return Err(ConfigError::InvalidSlippage(buffer));
        }

        Ok(())
    }

    pub fn is_supported(&self, asset: &Asset) -> bool {
        self.assets.iter().any(|a| &a.asset == asset)
    }

    pub fn ltv_ratio(&self, asset: &Asset) -> Option<Decimal> {
        self.assets
            .iter()
            .find(|a| &a.asset == asset)
            .map(|a| a.ltv_ratio)
    }

    pub fn supported_assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().map(|a| &a.asset)
    }

    pub fn slippage_buffer(&self) -> Decimal {
        self.liquidation.slippage_buffer
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("LTV ratio {ratio} for {asset} must be in (0, 1]")]
    InvalidLtvRatio { asset: Asset, ratio: Decimal },

    #[error("Asset {0} is configured more than once")]
    DuplicateAsset(Asset),

    #[error("Thresholds must satisfy 0 < margin call ({margin_call_ltv}) < liquidation ({liquidation_ltv})")]
    InvalidThresholds {
        margin_call_ltv: Decimal,
        liquidation_ltv: Decimal,
    },

    #[error("Invalid liquidation priority: {reason}")]
    InvalidPriority { reason: String },

    #[error("Slippage buffer {0} must be in [0, 1)")]
    InvalidSlippage(Decimal),

    #[error("Could not parse risk parameters: {0}")]
    Parse(String),
}
