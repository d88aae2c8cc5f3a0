use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    /// Open or add to the short.
    SellShort,
    /// Cover the short.
    BuyToCover,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::SellShort => write!(f, "sell_short"),
            OrderSide::BuyToCover => write!(f, "buy_to_cover"),
        }
    }
}

/// Broker order port. One market order in, one fill price out; partial-fill
/// and routing mechanics are the adapter's concern.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    async fn place_market_order(
        &self,
        ticker: &str,
        side: OrderSide,
        shares: u64,
    ) -> Result<f64, DomainError>;
}
