//! Position lifecycle: batched entry, the monitoring loop, batched exit.
//!
//! Orders are worked as three sequential tranches with a fixed pause in
//! between: a single block order signals the position to the market, so the
//! size is spread over time at the cost of slippage exposure between
//! tranches. A tranche failure is recorded and the remaining tranches are
//! still attempted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::config::Config;
use crate::domain::entities::run_state::MonitorOutcome;
use crate::domain::entities::trade_record::ExitReason;
use crate::domain::error::DomainError;
use crate::domain::ports::approval::ApprovalGateway;
use crate::domain::ports::broker::{BrokerGateway, OrderSide};
use crate::domain::ports::market_data::MarketDataGateway;
use crate::domain::values::order_batch::{split_tranches, total_shares, OrderBatchResult, Tranche};
use crate::domain::values::stop_loss::take_profit_target;

const SECS_PER_DAY: f64 = 86_400.0;

pub struct PositionLifecycle {
    market: Arc<dyn MarketDataGateway>,
    broker: Arc<dyn BrokerGateway>,
    approval: Arc<dyn ApprovalGateway>,
    config: Config,
}

impl PositionLifecycle {
    pub fn new(
        market: Arc<dyn MarketDataGateway>,
        broker: Arc<dyn BrokerGateway>,
        approval: Arc<dyn ApprovalGateway>,
        config: Config,
    ) -> Self {
        Self {
            market,
            broker,
            approval,
            config,
        }
    }

    /// Open the short in three tranches sized from the notional cap at the
    /// reference price. Fails before placing anything when the cap buys
    /// fewer than 3 shares. Returns the per-tranche outcomes; the caller
    /// checks `success()` (at least one fill) to decide whether a position
    /// exists.
    pub async fn enter_position(
        &self,
        ticker: &str,
        reference_price: f64,
    ) -> Result<OrderBatchResult, DomainError> {
        let total = total_shares(self.config.max_position_notional, reference_price)?;
        info!(
            "Entering short {ticker}: {total} shares at ~${reference_price:.2} in {} tranches",
            self.config.batch_ratios.len()
        );
        Ok(self
            .place_batch(ticker, total, OrderSide::SellShort, false)
            .await)
    }

    /// Poll the open position until an exit condition fires, in strict
    /// priority order: stop-loss, then take-profit, then the maximum holding
    /// period. A failed price fetch is "no signal this tick"; the loop
    /// sleeps and tries again, it never abandons the position.
    pub async fn monitor_position(
        &self,
        ticker: &str,
        entry_price: f64,
        stop_loss: f64,
    ) -> MonitorOutcome {
        let target = take_profit_target(entry_price, self.config.take_profit_pct);
        let max_hold = Duration::from_secs(self.config.max_holding_days as u64 * 86_400);
        let poll = Duration::from_secs(self.config.monitor_poll_secs);
        let start = Instant::now();

        info!(
            "Monitoring {ticker}: short=${entry_price:.2} stop=${stop_loss:.2} target=${target:.2}"
        );

        while start.elapsed() < max_hold {
            let days_held = start.elapsed().as_secs_f64() / SECS_PER_DAY;

            let price = match self.market.current_price(ticker).await {
                Ok(p) if p > 0.0 => p,
                Ok(_) | Err(_) => {
                    warn!("Price fetch gave no signal for {ticker}, retrying next tick");
                    tokio::time::sleep(poll).await;
                    continue;
                }
            };

            if price >= stop_loss {
                let msg = format!("STOP LOSS: {ticker} @ ${price:.2} (stop=${stop_loss:.2})");
                warn!("{msg}");
                self.approval.notify(&msg).await;
                return MonitorOutcome {
                    reason: ExitReason::StopLoss,
                    exit_signal_price: price,
                    days_held,
                };
            }

            if price <= target {
                let msg = format!("TAKE PROFIT: {ticker} @ ${price:.2} (target=${target:.2})");
                info!("{msg}");
                self.approval.notify(&msg).await;
                return MonitorOutcome {
                    reason: ExitReason::TakeProfit,
                    exit_signal_price: price,
                    days_held,
                };
            }

            debug!("Monitoring {ticker}: ${price:.2} | day {days_held:.1}");
            tokio::time::sleep(poll).await;
        }

        // Holding period exhausted. Force the cover at whatever the market gives.
        let price = self.market.current_price(ticker).await.unwrap_or(0.0);
        let msg = format!("TIMEOUT: {ticker} covering now @ ${price:.2}");
        warn!("{msg}");
        self.approval.notify(&msg).await;
        MonitorOutcome {
            reason: ExitReason::Timeout,
            exit_signal_price: price,
            days_held: self.config.max_holding_days as f64,
        }
    }

    /// Cover the short with the same tranche discipline, opposite side.
    /// Exit-side broker failures get one retry per tranche after the
    /// inter-tranche delay; if the whole batch still fails, an alert goes
    /// out and the caller journals the position as unresolved. A stuck
    /// short is never dropped silently.
    pub async fn exit_position(
        &self,
        ticker: &str,
        total_shares: u64,
        reason: ExitReason,
    ) -> OrderBatchResult {
        info!("Covering {ticker}: {total_shares} shares, reason={reason}");
        let batch = self
            .place_batch(ticker, total_shares, OrderSide::BuyToCover, true)
            .await;

        if !batch.success() {
            let msg = format!(
                "EXIT FAILED: {ticker} still short {total_shares} shares after retries; manual cover required"
            );
            error!("{msg}");
            self.approval.notify(&msg).await;
        }
        batch
    }

    async fn place_batch(
        &self,
        ticker: &str,
        total: u64,
        side: OrderSide,
        retry_failed: bool,
    ) -> OrderBatchResult {
        let sizes = split_tranches(total, &self.config.batch_ratios);
        let delay = Duration::from_secs(self.config.tranche_delay_secs);
        let mut tranches = Vec::with_capacity(sizes.len());

        for (index, shares) in sizes.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(delay).await;
            }
            if shares == 0 {
                continue;
            }

            let mut attempt = self.broker.place_market_order(ticker, side, shares).await;
            if attempt.is_err() && retry_failed {
                warn!("Tranche {index} for {ticker} failed, retrying once");
                tokio::time::sleep(delay).await;
                attempt = self.broker.place_market_order(ticker, side, shares).await;
            }

            match attempt {
                Ok(fill) => {
                    info!("Tranche {index}: {side} {shares} {ticker} filled @ ${fill:.2}");
                    tranches.push(Tranche::filled(index, shares, fill));
                }
                Err(e) => {
                    warn!("Tranche {index}: {side} {shares} {ticker} failed: {e}");
                    tranches.push(Tranche::failed(index, shares, e.to_string()));
                }
            }
        }

        OrderBatchResult::new(tranches)
    }
}
