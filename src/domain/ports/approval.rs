use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::DomainError;

/// Terms shown to the human approver.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalRequest {
    pub ticker: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub confidence: u8,
    pub rules_met: u8,
}

/// Human-approval channel port.
///
/// The wait is a bounded sleep-poll cycle; a timeout is a designed rejection,
/// not an error. Only replies received after `sent_at` count.
#[async_trait]
pub trait ApprovalGateway: Send + Sync {
    /// Send the approval request. Returns the send timestamp used to filter
    /// stale replies.
    async fn request_approval(&self, request: &ApprovalRequest) -> Result<DateTime<Utc>, DomainError>;

    /// Poll for an affirmative/negative reply until the timeout elapses.
    /// Timeout or a negative reply both return `false`.
    async fn await_reply(&self, sent_at: DateTime<Utc>, timeout_secs: u64) -> bool;

    /// Fire-and-forget alert (exit signals, stuck-position escalation).
    /// Returns whether the message went out; callers never fail on this.
    async fn notify(&self, message: &str) -> bool;
}
