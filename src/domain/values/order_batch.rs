//! Tranche sizing for batched entry and exit orders.
//!
//! A position is worked as three sequential partial orders rather than one
//! block. Sizing math lives here as pure functions; the actual placement
//! loop is in the application layer.

use serde::Serialize;

use crate::domain::error::DomainError;

/// Minimum total shares for a batch to be worth splitting at all.
pub const MIN_BATCH_SHARES: u64 = 3;

/// Total shares affordable under the notional cap at the reference price.
/// Fails with `Execution` (insufficient size) below `MIN_BATCH_SHARES`.
pub fn total_shares(notional_cap: f64, reference_price: f64) -> Result<u64, DomainError> {
    if reference_price <= 0.0 {
        return Err(DomainError::Execution(format!(
            "Cannot size order at non-positive reference price {reference_price}"
        )));
    }
    let shares = (notional_cap / reference_price).floor() as u64;
    if shares < MIN_BATCH_SHARES {
        return Err(DomainError::Execution(format!(
            "Insufficient size: {shares} shares (< {MIN_BATCH_SHARES}) at ${reference_price:.2}"
        )));
    }
    Ok(shares)
}

/// Split `total` into tranches by the configured ratios with floor rounding
/// per tranche. The sum may come out below `total` (never above): the final
/// tranche is not re-normalized to absorb rounding, so a share or two of
/// remainder is simply left unplaced.
pub fn split_tranches(total: u64, ratios: &[f64]) -> Vec<u64> {
    ratios
        .iter()
        .map(|r| (total as f64 * r).floor() as u64)
        .collect()
}

/// One sequential partial order within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct Tranche {
    pub index: usize,
    pub shares_requested: u64,
    /// Fill price when the broker accepted the order.
    pub fill_price: Option<f64>,
    /// Broker error for this tranche; later tranches are still attempted.
    pub error: Option<String>,
}

impl Tranche {
    pub fn filled(index: usize, shares: u64, price: f64) -> Self {
        Self {
            index,
            shares_requested: shares,
            fill_price: Some(price),
            error: None,
        }
    }

    pub fn failed(index: usize, shares: u64, error: String) -> Self {
        Self {
            index,
            shares_requested: shares,
            fill_price: None,
            error: Some(error),
        }
    }
}

/// Ordered outcome of one batched entry or exit.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBatchResult {
    pub tranches: Vec<Tranche>,
}

impl OrderBatchResult {
    pub fn new(tranches: Vec<Tranche>) -> Self {
        Self { tranches }
    }

    /// At least one tranche filled.
    pub fn success(&self) -> bool {
        self.tranches.iter().any(|t| t.fill_price.is_some())
    }

    /// Shares actually placed (filled tranches only).
    pub fn filled_shares(&self) -> u64 {
        self.tranches
            .iter()
            .filter(|t| t.fill_price.is_some())
            .map(|t| t.shares_requested)
            .sum()
    }

    /// Mean of the non-zero tranche fill prices. `None` when nothing filled.
    pub fn average_fill_price(&self) -> Option<f64> {
        let fills: Vec<f64> = self
            .tranches
            .iter()
            .filter_map(|t| t.fill_price)
            .filter(|p| *p > 0.0)
            .collect();
        if fills.is_empty() {
            return None;
        }
        Some(fills.iter().sum::<f64>() / fills.len() as f64)
    }
}
