// 8.0: credit account engine. coordinates collateral deposits, credit draws and
// repayments, price revaluation, health tracking and liquidation.
// single writer: every operation takes &mut self and runs to completion.

mod config;
mod core;
mod credit;
mod liquidations;
mod pricing;
mod results;

pub use config::EngineConfig;
pub use core::{CreditAccount, CreditState};
pub use results::{AccountStatus, EngineError, LiquidationResult, RepayOutcome};
