//! Paper broker: fills every market order at the feed's current price.
//! Stands in for a real brokerage connection; the port contract (order in,
//! fill price out) is all the pipeline ever sees, so swapping in a live
//! adapter is a wiring change.

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::domain::error::DomainError;
use crate::domain::ports::broker::{BrokerGateway, OrderSide};
use crate::domain::ports::market_data::MarketDataGateway;

pub struct PaperBroker {
    market: Arc<dyn MarketDataGateway>,
}

impl PaperBroker {
    pub fn new(market: Arc<dyn MarketDataGateway>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl BrokerGateway for PaperBroker {
    async fn place_market_order(
        &self,
        ticker: &str,
        side: OrderSide,
        shares: u64,
    ) -> Result<f64, DomainError> {
        if shares == 0 {
            return Err(DomainError::Execution("Zero-share order".into()));
        }

        let price = self.market.current_price(ticker).await.map_err(|e| {
            DomainError::Execution(format!("Paper fill needs a market price: {e}"))
        })?;
        if price <= 0.0 {
            return Err(DomainError::Execution(format!(
                "No usable market price for {ticker}"
            )));
        }

        info!("Paper fill: {side} {shares} {ticker} @ ${price:.2}");
        Ok(price)
    }
}
