/// Market data port: price and volume reads behind one narrow interface.
///
/// Every method is a synchronous-feeling snapshot call; retry and backoff
/// are the adapter's business, never the caller's. Stages that receive an
/// error or `None` abort or skip per their own semantics.
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::DomainError;

/// Recent 5-minute bars for the current session.
#[derive(Debug, Clone, Serialize)]
pub struct IntradaySnapshot {
    /// Closes, oldest first.
    pub prices: Vec<f64>,
    pub volumes: Vec<f64>,
    pub today_high: f64,
    pub current_price: f64,
}

#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Intraday 5-minute window. `None` when the feed failed or returned
    /// fewer than 6 bars; callers treat that as "no signal", not an error.
    async fn intraday_snapshot(&self, ticker: &str) -> Result<Option<IntradaySnapshot>, DomainError>;

    /// Latest traded price.
    async fn current_price(&self, ticker: &str) -> Result<f64, DomainError>;

    /// Most recent daily close, the pre-earnings baseline proxy.
    async fn latest_close(&self, ticker: &str) -> Result<f64, DomainError>;

    /// Daily closes for volatility estimation, oldest first.
    async fn daily_closes(&self, ticker: &str, days: u32) -> Result<Vec<f64>, DomainError>;

    /// Day-over-day percent change of an index ETF (SPY, QQQ, ...).
    async fn index_change(&self, symbol: &str) -> Result<f64, DomainError>;
}
