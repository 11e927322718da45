use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The direction of a trade that was actually recorded against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// The action recommended by the advisor. Unlike `TradeSide`, advice may
/// also instruct the caller to do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdviceAction {
    Buy,
    Sell,
    Hold,
}

impl AdviceAction {
    /// Returns the ledger side this action maps to, or `None` for `Hold`.
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            AdviceAction::Buy => Some(TradeSide::Buy),
            AdviceAction::Sell => Some(TradeSide::Sell),
            AdviceAction::Hold => None,
        }
    }
}

impl FromStr for AdviceAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(AdviceAction::Buy),
            "sell" => Ok(AdviceAction::Sell),
            "hold" => Ok(AdviceAction::Hold),
            other => Err(CoreError::InvalidInput(
                "action".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// The risk annotation attached to a piece of advice. Informational only;
/// the executor does not act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(CoreError::InvalidInput(
                "risk_level".to_string(),
                other.to_string(),
            )),
        }
    }
}
