//! The shared run-state record threaded through the pipeline.
//!
//! One `RunState` exists per candidate ticker per invocation. Stages own it
//! by value, write exactly their own result field, and either leave the
//! abort slot empty (continue) or fill it (halt). Once the abort reason is
//! set no later stage executes.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::entities::position::Position;
use crate::domain::ports::judgment::{EarningsBeat, SlowdownOpinion, TradeVerification};
use crate::domain::values::hard_rules::HardRuleVerdict;
use crate::domain::values::order_batch::OrderBatchResult;
use crate::domain::values::surge::{MarketHealth, SurgeCheck};

use super::trade_record::ExitReason;

/// The nine named stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ScanEarnings,
    ClassifyBeat,
    SurgeGate,
    SlowdownDetect,
    Verification,
    Approval,
    Entry,
    MonitorAndExit,
    RecordTrade,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::ScanEarnings => "scan_earnings",
            PipelineStage::ClassifyBeat => "classify_beat",
            PipelineStage::SurgeGate => "surge_gate",
            PipelineStage::SlowdownDetect => "slowdown_detect",
            PipelineStage::Verification => "verification",
            PipelineStage::Approval => "approval",
            PipelineStage::Entry => "entry",
            PipelineStage::MonitorAndExit => "monitor_and_exit",
            PipelineStage::RecordTrade => "record_trade",
        };
        write!(f, "{name}")
    }
}

/// Why a run terminated early, with the stage that pulled the cord.
#[derive(Debug, Clone, Serialize)]
pub struct AbortReason {
    pub stage: PipelineStage,
    pub reason: String,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

/// One upcoming-earnings candidate from the calendar scan.
#[derive(Debug, Clone, Serialize)]
pub struct EarningsCandidate {
    pub ticker: String,
    pub earnings_date: NaiveDate,
    pub days_until: i64,
    pub pre_earnings_price: f64,
}

/// Fusion of the hard-rule verdict and the AI opinion, plus the stop levels
/// computed for the candidate entry. `triggered` is the short-entry signal:
/// hard-rule majority AND AI confidence at threshold.
#[derive(Debug, Clone, Serialize)]
pub struct SlowdownDecision {
    pub triggered: bool,
    pub current_price: f64,
    pub hard_rules: HardRuleVerdict,
    pub ai_opinion: SlowdownOpinion,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
}

/// Terminal signal from the monitor loop.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorOutcome {
    pub reason: ExitReason,
    pub exit_signal_price: f64,
    pub days_held: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    pub ticker: String,
    pub pre_earnings_price: f64,

    pub candidates: Vec<EarningsCandidate>,
    pub earnings_beat: Option<EarningsBeat>,
    pub surge: Option<SurgeCheck>,
    pub market_health: Option<MarketHealth>,
    pub slowdown: Option<SlowdownDecision>,
    pub verification: Option<TradeVerification>,
    pub approved: Option<bool>,
    pub entry: Option<OrderBatchResult>,
    pub position: Option<Position>,
    pub monitor: Option<MonitorOutcome>,
    pub exit: Option<OrderBatchResult>,

    pub abort: Option<AbortReason>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            ticker: String::new(),
            pre_earnings_price: 0.0,
            candidates: Vec::new(),
            earnings_beat: None,
            surge: None,
            market_health: None,
            slowdown: None,
            verification: None,
            approved: None,
            entry: None,
            position: None,
            monitor: None,
            exit: None,
            abort: None,
        }
    }

    /// Seed a run directly with a known candidate (single-ticker mode).
    pub fn for_ticker(ticker: impl Into<String>, pre_earnings_price: f64) -> Self {
        let mut state = Self::new();
        state.ticker = ticker.into();
        state.pre_earnings_price = pre_earnings_price;
        state
    }

    pub fn abort(&mut self, stage: PipelineStage, reason: impl Into<String>) {
        // First abort wins; later stages never run, so never overwrite.
        if self.abort.is_none() {
            self.abort = Some(AbortReason {
                stage,
                reason: reason.into(),
            });
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_some()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
