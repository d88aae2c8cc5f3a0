//! Shared test helpers: deterministic fake gateways and a test config with
//! all delays zeroed so blocking waits resolve immediately.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use surgefade::config::Config;
use surgefade::domain::entities::trade_record::TradeRecord;
use surgefade::domain::error::DomainError;
use surgefade::domain::ports::approval::{ApprovalGateway, ApprovalRequest};
use surgefade::domain::ports::broker::{BrokerGateway, OrderSide};
use surgefade::domain::ports::earnings::EarningsCalendarGateway;
use surgefade::domain::ports::journal::TradeJournal;
use surgefade::domain::ports::judgment::{
    EarningsBeat, JudgmentGateway, SlowdownOpinion, TradeVerification,
};
use surgefade::domain::ports::market_data::{IntradaySnapshot, MarketDataGateway};
use surgefade::domain::ports::news::NewsGateway;
use surgefade::domain::values::confidence::Confidence;

/// Config with every sleep zeroed and the price guard loosened so the
/// standard fixtures pass it.
pub fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.tranche_delay_secs = 0;
    cfg.monitor_poll_secs = 0;
    cfg.approval_timeout_secs = 0;
    cfg.driver_tick_secs = 0;
    cfg.price_guard_min_gain = 10.0;
    cfg
}

/// Intraday window that meets hard rules 1 and 2 (flat momentum, volume
/// collapse on the newest bar) but not 3, a 2-of-3 majority.
pub fn slowing_snapshot(current_price: f64) -> IntradaySnapshot {
    IntradaySnapshot {
        prices: vec![current_price; 12],
        volumes: vec![
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            1_000_000.0,
            400_000.0,
        ],
        today_high: current_price,
        current_price,
    }
}

// ── Market data ────────────────────────────────────────────────────────────

/// Scripted market data. `current_price` pops from the script (None = a
/// failed fetch); an exhausted script returns `default_price`.
pub struct FakeMarketData {
    pub default_price: f64,
    pub price_script: Mutex<VecDeque<Option<f64>>>,
    pub snapshot: Option<IntradaySnapshot>,
    pub daily: Vec<f64>,
    pub index_changes: HashMap<String, f64>,
    pub latest_closes: HashMap<String, f64>,
}

impl FakeMarketData {
    pub fn new(default_price: f64) -> Self {
        let mut index_changes = HashMap::new();
        index_changes.insert("SPY".to_string(), 0.5);
        index_changes.insert("QQQ".to_string(), 0.3);
        Self {
            default_price,
            price_script: Mutex::new(VecDeque::new()),
            snapshot: Some(slowing_snapshot(default_price)),
            daily: Vec::new(),
            index_changes,
            latest_closes: HashMap::new(),
        }
    }

    pub fn script_prices(self, prices: Vec<Option<f64>>) -> Self {
        *self.price_script.lock().unwrap() = prices.into();
        self
    }

    pub fn with_index_change(mut self, symbol: &str, change: f64) -> Self {
        self.index_changes.insert(symbol.to_string(), change);
        self
    }

    pub fn with_snapshot(mut self, snapshot: Option<IntradaySnapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_latest_close(mut self, ticker: &str, close: f64) -> Self {
        self.latest_closes.insert(ticker.to_string(), close);
        self
    }
}

#[async_trait]
impl MarketDataGateway for FakeMarketData {
    async fn intraday_snapshot(&self, _ticker: &str) -> Result<Option<IntradaySnapshot>, DomainError> {
        Ok(self.snapshot.clone())
    }

    async fn current_price(&self, _ticker: &str) -> Result<f64, DomainError> {
        match self.price_script.lock().unwrap().pop_front() {
            Some(Some(price)) => Ok(price),
            Some(None) => Err(DomainError::DataUnavailable("scripted fetch failure".into())),
            None => Ok(self.default_price),
        }
    }

    async fn latest_close(&self, ticker: &str) -> Result<f64, DomainError> {
        Ok(*self.latest_closes.get(ticker).unwrap_or(&self.default_price))
    }

    async fn daily_closes(&self, _ticker: &str, _days: u32) -> Result<Vec<f64>, DomainError> {
        Ok(self.daily.clone())
    }

    async fn index_change(&self, symbol: &str) -> Result<f64, DomainError> {
        self.index_changes
            .get(symbol)
            .copied()
            .ok_or_else(|| DomainError::DataUnavailable(format!("no change for {symbol}")))
    }
}

// ── Earnings calendar ──────────────────────────────────────────────────────

pub struct FakeEarningsCalendar {
    pub dates: HashMap<String, NaiveDate>,
}

impl FakeEarningsCalendar {
    pub fn with_upcoming(ticker: &str, days_ahead: i64) -> Self {
        let mut dates = HashMap::new();
        dates.insert(
            ticker.to_string(),
            Utc::now().date_naive() + chrono::Duration::days(days_ahead),
        );
        Self { dates }
    }

    pub fn empty() -> Self {
        Self {
            dates: HashMap::new(),
        }
    }
}

#[async_trait]
impl EarningsCalendarGateway for FakeEarningsCalendar {
    async fn next_earnings_date(&self, ticker: &str) -> Result<Option<NaiveDate>, DomainError> {
        Ok(self.dates.get(ticker).copied())
    }
}

// ── News ───────────────────────────────────────────────────────────────────

pub struct FakeNews;

#[async_trait]
impl NewsGateway for FakeNews {
    async fn earnings_news(&self, ticker: &str) -> String {
        format!("{ticker} reported EPS well above consensus, a strong beat")
    }
}

// ── Judgment ───────────────────────────────────────────────────────────────

pub struct FakeJudgment {
    pub beat: EarningsBeat,
    pub slowdown: SlowdownOpinion,
    pub verification: TradeVerification,
}

impl FakeJudgment {
    /// Every judgment green-lights the trade (beat 15%, confidence 75).
    pub fn approving() -> Self {
        Self {
            beat: EarningsBeat {
                beat: true,
                beat_pct: 15.0,
                confidence: Confidence::clamped(85),
                reason: "clear beat".into(),
            },
            slowdown: SlowdownOpinion {
                slowing: true,
                confidence: Confidence::clamped(75),
                reasoning: "momentum flattening".into(),
            },
            verification: TradeVerification {
                confirmed: true,
                confidence: Confidence::clamped(80),
                risk_factors: vec![],
                reasoning: "checks out".into(),
            },
        }
    }

    pub fn with_slowdown_confidence(mut self, confidence: u8) -> Self {
        self.slowdown.confidence = Confidence::clamped(confidence as i64);
        self
    }

    pub fn with_verification(mut self, confirmed: bool) -> Self {
        self.verification.confirmed = confirmed;
        self
    }

    pub fn with_beat(mut self, beat: bool, beat_pct: f64) -> Self {
        self.beat.beat = beat;
        self.beat.beat_pct = beat_pct;
        self
    }
}

#[async_trait]
impl JudgmentGateway for FakeJudgment {
    async fn classify_earnings_beat(&self, _ticker: &str, _evidence: &str) -> EarningsBeat {
        self.beat.clone()
    }

    async fn classify_slowdown(&self, _ticker: &str, _snapshot: &IntradaySnapshot) -> SlowdownOpinion {
        self.slowdown.clone()
    }

    async fn verify_trade(&self, _ticker: &str, _decision: &serde_json::Value) -> TradeVerification {
        self.verification.clone()
    }

    async fn reflect_on_trade(&self, _record: &TradeRecord) -> String {
        "lesson one; lesson two; lesson three".into()
    }
}

// ── Approval ───────────────────────────────────────────────────────────────

pub struct FakeApproval {
    pub approve: bool,
    pub send_fails: bool,
    pub notifications: Mutex<Vec<String>>,
}

impl FakeApproval {
    pub fn approving() -> Self {
        Self {
            approve: true,
            send_fails: false,
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            approve: false,
            ..Self::approving()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            send_fails: true,
            ..Self::approving()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApprovalGateway for FakeApproval {
    async fn request_approval(&self, request: &ApprovalRequest) -> Result<DateTime<Utc>, DomainError> {
        if self.send_fails {
            return Err(DomainError::Notification("channel down".into()));
        }
        self.notifications
            .lock()
            .unwrap()
            .push(format!("approval:{}", request.ticker));
        Ok(Utc::now())
    }

    async fn await_reply(&self, _sent_at: DateTime<Utc>, _timeout_secs: u64) -> bool {
        self.approve
    }

    async fn notify(&self, message: &str) -> bool {
        self.notifications.lock().unwrap().push(message.to_string());
        true
    }
}

// ── Broker ─────────────────────────────────────────────────────────────────

/// Scripted broker: each order pops the next fill (Err = broker failure);
/// an exhausted script fills at `default_fill`.
pub struct FakeBroker {
    pub default_fill: f64,
    pub script: Mutex<VecDeque<Result<f64, String>>>,
    pub orders: Mutex<Vec<(OrderSide, u64)>>,
}

impl FakeBroker {
    pub fn filling_at(price: f64) -> Self {
        Self {
            default_fill: price,
            script: Mutex::new(VecDeque::new()),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn script_fills(self, fills: Vec<Result<f64, String>>) -> Self {
        *self.script.lock().unwrap() = fills.into();
        self
    }

    pub fn placed(&self) -> Vec<(OrderSide, u64)> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrokerGateway for FakeBroker {
    async fn place_market_order(
        &self,
        _ticker: &str,
        side: OrderSide,
        shares: u64,
    ) -> Result<f64, DomainError> {
        self.orders.lock().unwrap().push((side, shares));
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(fill)) => Ok(fill),
            Some(Err(e)) => Err(DomainError::Execution(e)),
            None => Ok(self.default_fill),
        }
    }
}

// ── Journal ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryJournal {
    pub entries: Mutex<Vec<(TradeRecord, String)>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<(TradeRecord, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl TradeJournal for MemoryJournal {
    fn record_trade(&self, record: &TradeRecord, reflection: &str) -> Result<(), DomainError> {
        self.entries
            .lock()
            .unwrap()
            .push((record.clone(), reflection.to_string()));
        Ok(())
    }

    fn list_trades(&self, limit: Option<usize>) -> Result<Vec<TradeRecord>, DomainError> {
        let entries = self.entries.lock().unwrap();
        let mut records: Vec<TradeRecord> = entries.iter().map(|(r, _)| r.clone()).collect();
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}
