// boost-core: crypto-collateralized credit line engine.
// valuation-first architecture: collateral value and LTV health drive everything else.
// all computation is deterministic; the price oracle is the only injected I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Asset, Timestamp, dust threshold
//   2.x  config.rs: risk regime: per-asset LTV, thresholds, liquidation priority
//   3.x  ledger.rs: collateral holdings per asset
//   4.x  price_feed.rs: price snapshot, oracle trait, zero-price degradation
//   5.x  valuation.rs: USD value and credit line from holdings + prices
//   5.1  margin.rs: LTV, available credit, health classification
//   6.x  liquidation.rs: priority-ordered liquidation planning
//   7.x  events.rs: state transition events for audit
//   8.x  engine/: credit account: deposits, spend, repay, revaluation, liquidation

pub mod config;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod liquidation;
pub mod margin;
pub mod price_feed;
pub mod types;
pub mod valuation;

// re exports for convenience
pub use config::{AssetRiskConfig, ConfigError, LiquidationParams, RiskParameters};
pub use engine::*;
pub use events::*;
pub use ledger::{CollateralLedger, LedgerError};
pub use liquidation::*;
pub use margin::*;
pub use price_feed::{
    fetch_prices_or_zero, OracleError, PriceOracle, PriceSnapshot, StaticPriceOracle,
};
pub use types::*;
pub use valuation::{revalue, AssetValuation, ValuationResult};
