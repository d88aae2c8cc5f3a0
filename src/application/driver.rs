//! 7x24 run driver: the outer loop that decides when the pipeline runs.
//!
//! During market hours: one pipeline pass per tick. A pass that opens a
//! position blocks inside the monitor loop until the position closes, so the
//! driver is naturally serialised: at most one run, and at most one open
//! position, at a time. Off-hours and weekends just sleep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, info};

use crate::application::pipeline::Pipeline;
use crate::config::Config;
use crate::domain::values::market_hours::{is_market_hours, is_weekend};

const OFF_HOURS_SLEEP_SECS: u64 = 1_800;
const WEEKEND_SLEEP_SECS: u64 = 4 * 3_600;

pub struct RunDriver {
    pipeline: Arc<Pipeline>,
    config: Config,
}

impl RunDriver {
    pub fn new(pipeline: Arc<Pipeline>, config: Config) -> Self {
        Self { pipeline, config }
    }

    /// Continuous loop. Never returns; errors inside a pass are logged and
    /// the loop carries on at the next tick.
    pub async fn run_loop(&self) {
        info!("surgefade starting, 7x24 mode");
        loop {
            let now = Utc::now();
            if is_market_hours(now) {
                info!("Market open, running pipeline");
                let state = self.pipeline.run().await;
                match &state.abort {
                    Some(abort) => info!("Pass ended: {abort}"),
                    None => match &state.monitor {
                        Some(m) => info!(
                            "Pass completed a trade on {}: exit={} after {:.1} days",
                            state.ticker, m.reason, m.days_held
                        ),
                        None => error!("Pass ended without abort or trade; check gateways"),
                    },
                }
                tokio::time::sleep(Duration::from_secs(self.config.driver_tick_secs)).await;
            } else if is_weekend(now) {
                info!("Weekend, sleeping");
                tokio::time::sleep(Duration::from_secs(WEEKEND_SLEEP_SECS)).await;
            } else {
                info!("Market closed, sleeping");
                tokio::time::sleep(Duration::from_secs(OFF_HOURS_SLEEP_SECS)).await;
            }
        }
    }
}
