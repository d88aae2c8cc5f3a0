use serde::{Deserialize, Serialize};

use crate::domain::values::order_batch::OrderBatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// An open (or just-closed) short position. Created only after a batched
/// entry filled at least one tranche; closed only after the batched exit
/// completes. The stop-loss price always sits strictly above the entry fill
/// (a short loses as price rises) and the take-profit target strictly below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub avg_entry_price: f64,
    pub shares: u64,
    pub stop_loss_price: f64,
    pub status: PositionStatus,
}

impl Position {
    pub fn open(ticker: String, entry_batch: &OrderBatchResult, stop_loss_price: f64) -> Option<Self> {
        let avg = entry_batch.average_fill_price()?;
        Some(Self {
            ticker,
            avg_entry_price: avg,
            shares: entry_batch.filled_shares(),
            stop_loss_price,
            status: PositionStatus::Open,
        })
    }

    pub fn close(&mut self) {
        self.status = PositionStatus::Closed;
    }
}
