// 1.0: primitives shared by every module. asset symbols, timestamps, the dust threshold.
// quantities, prices and USD amounts stay plain Decimal; the asset is the only newtype
// because it is the key everything else is indexed by.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Holdings at or below this quantity are treated as zero and pruned.
pub const DUST_THRESHOLD: Decimal = dec!(0.000000001);

// 1.1: collateral asset symbol. normalized to upper case so "btc" and "BTC" are one key.
// ordering is by symbol, which is what makes every iteration over holdings deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Asset(String);

impl Asset {
    pub fn new(symbol: &str) -> Self {
        Self(symbol.trim().to_ascii_uppercase())
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }

    pub fn btc() -> Self {
        Self::new("BTC")
    }

    pub fn eth() -> Self {
        Self::new("ETH")
    }

    pub fn usdc() -> Self {
        Self::new("USDC")
    }

    pub fn matic() -> Self {
        Self::new("MATIC")
    }
}

impl From<String> for Asset {
    fn from(symbol: String) -> Self {
        Self::new(&symbol)
    }
}

impl From<&str> for Asset {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.0
    }
}

impl FromStr for Asset {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// 1.2: millisecond timestamp. only used to stamp audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

/// True when a quantity is small enough to be considered an empty holding.
pub fn is_dust(quantity: Decimal) -> bool {
    quantity <= DUST_THRESHOLD
}
