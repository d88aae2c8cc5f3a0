//! Centralised configuration: environment variables, thresholds, constants.
//! All tuneable parameters live here; nothing else reads the environment for
//! strategy settings.

use crate::domain::error::DomainError;
use crate::domain::values::hard_rules::SlowdownThresholds;
use crate::domain::values::stop_loss::StopLossTiers;

/// Default watchlist scanned for upcoming earnings.
pub const DEFAULT_WATCHLIST: [&str; 12] = [
    "TSLA", "AAPL", "NVDA", "META", "GOOGL", "MSFT", "AMZN", "AMD", "QCOM", "WDC", "CRM", "PANW",
];

/// Index ETFs tracked by the market-health gate.
pub const DEFAULT_INDEXES: [&str; 2] = ["SPY", "QQQ"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Stock universe scanned each tick.
    pub watchlist: Vec<String>,
    /// Index symbols for the market-health gate.
    pub indexes: Vec<String>,

    /// Minimum % intraday surge above the pre-earnings close.
    pub surge_threshold_pct: f64,
    /// Minimum % EPS beat to consider.
    pub eps_beat_min_pct: f64,
    /// Hard-rule thresholds for slowdown detection.
    pub slowdown: SlowdownThresholds,
    /// Claude confidence score needed to proceed (slowdown + verification).
    pub ai_confidence_threshold: u8,
    /// Minimum absolute $ gain above baseline before slowdown evaluation.
    pub price_guard_min_gain: f64,

    /// Volatility-tiered stop-loss percentages.
    pub stop_loss: StopLossTiers,
    /// Take-profit distance below entry (0.03 = 3%).
    pub take_profit_pct: f64,

    /// Total notional cap per position, in dollars.
    pub max_position_notional: f64,
    /// 3-batch entry/exit ratio.
    pub batch_ratios: Vec<f64>,
    /// Pause between sequential tranches, seconds.
    pub tranche_delay_secs: u64,

    /// Maximum holding period before a forced cover.
    pub max_holding_days: u32,
    /// Monitor poll interval, seconds.
    pub monitor_poll_secs: u64,
    /// Approval reply window, seconds.
    pub approval_timeout_secs: u64,
    /// How far ahead the earnings scan looks, days.
    pub earnings_window_days: i64,

    /// Driver pause between pipeline passes during market hours, seconds.
    pub driver_tick_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            indexes: DEFAULT_INDEXES.iter().map(|s| s.to_string()).collect(),
            surge_threshold_pct: 8.0,
            eps_beat_min_pct: 10.0,
            slowdown: SlowdownThresholds::default(),
            ai_confidence_threshold: 70,
            price_guard_min_gain: 40.0,
            stop_loss: StopLossTiers::default(),
            take_profit_pct: 0.03,
            max_position_notional: 10_000.0,
            batch_ratios: vec![0.30, 0.30, 0.40],
            tranche_delay_secs: 2,
            max_holding_days: 7,
            monitor_poll_secs: 300,
            approval_timeout_secs: 300,
            earnings_window_days: 7,
            driver_tick_secs: 300,
        }
    }
}

impl Config {
    /// Build from environment variables, falling back to defaults. Only
    /// numeric overrides can fail, and only on unparseable values.
    pub fn from_env() -> Result<Self, DomainError> {
        let mut cfg = Self::default();

        if let Ok(list) = std::env::var("SURGEFADE_WATCHLIST") {
            let tickers: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !tickers.is_empty() {
                cfg.watchlist = tickers;
            }
        }

        cfg.surge_threshold_pct = env_f64("SURGEFADE_SURGE_THRESHOLD", cfg.surge_threshold_pct)?;
        cfg.eps_beat_min_pct = env_f64("SURGEFADE_EPS_BEAT_MIN", cfg.eps_beat_min_pct)?;
        cfg.price_guard_min_gain = env_f64("SURGEFADE_PRICE_GUARD_MIN_GAIN", cfg.price_guard_min_gain)?;
        cfg.max_position_notional = env_f64("SURGEFADE_MAX_POSITION", cfg.max_position_notional)?;
        cfg.take_profit_pct = env_f64("SURGEFADE_TAKE_PROFIT_PCT", cfg.take_profit_pct)?;
        cfg.ai_confidence_threshold =
            env_u64("SURGEFADE_AI_CONFIDENCE", cfg.ai_confidence_threshold as u64)? as u8;
        cfg.max_holding_days = env_u64("SURGEFADE_MAX_DAYS_WAIT_COVER", cfg.max_holding_days as u64)? as u32;
        cfg.monitor_poll_secs = env_u64("SURGEFADE_MONITOR_POLL_SECS", cfg.monitor_poll_secs)?;
        cfg.approval_timeout_secs = env_u64("SURGEFADE_APPROVAL_TIMEOUT_SECS", cfg.approval_timeout_secs)?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.watchlist.is_empty() {
            return Err(DomainError::Config("Watchlist is empty".into()));
        }
        let ratio_sum: f64 = self.batch_ratios.iter().sum();
        if (ratio_sum - 1.0).abs() > 1e-9 {
            return Err(DomainError::Config(format!(
                "Batch ratios must sum to 1.0, got {ratio_sum}"
            )));
        }
        if self.ai_confidence_threshold == 0 || self.ai_confidence_threshold > 100 {
            return Err(DomainError::Config(format!(
                "AI confidence threshold must be in (0,100], got {}",
                self.ai_confidence_threshold
            )));
        }
        let tiers = &self.stop_loss;
        if !(tiers.high_vol_pct > tiers.medium_vol_pct && tiers.medium_vol_pct > tiers.low_vol_pct) {
            return Err(DomainError::Config(
                "Stop-loss tiers must strictly descend from high to low volatility".into(),
            ));
        }
        if self.take_profit_pct <= 0.0 || self.take_profit_pct >= 1.0 {
            return Err(DomainError::Config(format!(
                "Take-profit fraction out of range: {}",
                self.take_profit_pct
            )));
        }
        Ok(())
    }
}

fn env_f64(key: &str, default: f64) -> Result<f64, DomainError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| DomainError::Config(format!("{key} is not a number: {v}"))),
        Err(_) => Ok(default),
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, DomainError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map_err(|_| DomainError::Config(format!("{key} is not an integer: {v}"))),
        Err(_) => Ok(default),
    }
}
