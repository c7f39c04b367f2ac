//! Credit utilization and account health.
//!
//! LTV is utilized credit over total collateral value. Health is a pure function of
//! that ratio against the two configured thresholds: below the margin call line the
//! account is healthy, between the lines it is in margin call, and at or above the
//! liquidation line it is critical.

use crate::config::RiskParameters;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    MarginCall,
    Critical,
}

impl HealthState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthState::Healthy)
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, HealthState::Critical)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthState::Healthy => "healthy",
            HealthState::MarginCall => "margin call",
            HealthState::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Zero whenever there is no collateral value to divide by. Saturates at `Decimal::MAX`
/// when debt dwarfs a near-worthless collateral value.
pub fn loan_to_value(utilized_credit: Decimal, total_collateral_value: Decimal) -> Decimal {
    if total_collateral_value > Decimal::ZERO {
        utilized_credit
            .checked_div(total_collateral_value)
            .unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

pub fn available_credit(max_credit_line: Decimal, utilized_credit: Decimal) -> Decimal {
    (max_credit_line - utilized_credit).max(Decimal::ZERO)
}

pub fn evaluate_health(
    utilized_credit: Decimal,
    current_ltv: Decimal,
    params: &RiskParameters,
) -> HealthState {
    if utilized_credit <= Decimal::ZERO || current_ltv < params.margin_call_ltv {
        HealthState::Healthy
    } else if current_ltv < params.liquidation_ltv {
        HealthState::MarginCall
    } else {
        HealthState::Critical
    }
}

/// How far LTV can rise before the account reaches the liquidation line.
pub fn liquidation_headroom(current_ltv: Decimal, params: &RiskParameters) -> Decimal {
    (params.liquidation_ltv - current_ltv).max(Decimal::ZERO)
}
