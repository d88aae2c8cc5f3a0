use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Profit,
    Loss,
    /// Exit batch failed after retry; the position may still be open at the
    /// broker and needs manual intervention.
    Unresolved,
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeOutcome::Profit => write!(f, "profit"),
            TradeOutcome::Loss => write!(f, "loss"),
            TradeOutcome::Unresolved => write!(f, "unresolved"),
        }
    }
}

impl FromStr for TradeOutcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "profit" => Ok(TradeOutcome::Profit),
            "loss" => Ok(TradeOutcome::Loss),
            "unresolved" => Ok(TradeOutcome::Unresolved),
            _ => Err(format!("Unknown trade outcome: {s}")),
        }
    }
}

/// Why the monitor loop released a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Timeout,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::Timeout => write!(f, "timeout"),
        }
    }
}

impl FromStr for ExitReason {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stop_loss" => Ok(ExitReason::StopLoss),
            "take_profit" => Ok(ExitReason::TakeProfit),
            "timeout" => Ok(ExitReason::Timeout),
            _ => Err(format!("Unknown exit reason: {s}")),
        }
    }
}

/// Terminal summary of one completed short trade. Created exactly once per
/// entered-and-exited position, immutable, handed to the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub ticker: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: u64,
    /// Positive = profit on the short (covered below entry).
    pub profit_loss: f64,
    pub days_held: f64,
    pub outcome: TradeOutcome,
    pub exit_reason: ExitReason,
    pub recorded_at: DateTime<Utc>,
}

impl TradeRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: String,
        entry_price: f64,
        exit_price: f64,
        shares: u64,
        days_held: f64,
        exit_reason: ExitReason,
        exit_succeeded: bool,
    ) -> Self {
        let profit_loss = (entry_price - exit_price) * shares as f64;
        let outcome = if !exit_succeeded {
            TradeOutcome::Unresolved
        } else if profit_loss >= 0.0 {
            TradeOutcome::Profit
        } else {
            TradeOutcome::Loss
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticker,
            entry_price,
            exit_price,
            shares,
            profit_loss,
            days_held,
            outcome,
            exit_reason,
            recorded_at: Utc::now(),
        }
    }
}
