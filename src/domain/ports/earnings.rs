use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::error::DomainError;

/// Earnings calendar port. `None` means no scheduled date is known; the
/// scan stage simply skips that ticker.
#[async_trait]
pub trait EarningsCalendarGateway: Send + Sync {
    async fn next_earnings_date(&self, ticker: &str) -> Result<Option<NaiveDate>, DomainError>;
}
