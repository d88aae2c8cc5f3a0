/// Judgment port: the LLM service behind a fixed result shape.
///
/// The model is an external, non-deterministic black box. Adapters must
/// never surface malformed output to the pipeline: every method falls back
/// to a conservative negative default (false / zero confidence) on parse or
/// transport failure, so a broken judgment service can only ever block a
/// trade, never cause one.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::trade_record::TradeRecord;
use crate::domain::ports::market_data::IntradaySnapshot;
use crate::domain::values::confidence::Confidence;

/// Earnings beat/miss classification from news evidence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EarningsBeat {
    pub beat: bool,
    /// How far above consensus EPS, in percent (15.0 = 15% beat).
    pub beat_pct: f64,
    pub confidence: Confidence,
    pub reason: String,
}

/// Opinion on whether the surge's momentum is exhausting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlowdownOpinion {
    pub slowing: bool,
    pub confidence: Confidence,
    pub reasoning: String,
}

/// Devil's-advocate review of the assembled trade decision.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TradeVerification {
    pub confirmed: bool,
    pub confidence: Confidence,
    pub risk_factors: Vec<String>,
    pub reasoning: String,
}

#[async_trait]
pub trait JudgmentGateway: Send + Sync {
    /// Did the ticker beat EPS expectations, judging from `evidence` text?
    async fn classify_earnings_beat(&self, ticker: &str, evidence: &str) -> EarningsBeat;

    /// Is the surge slowing, judging from the intraday window?
    async fn classify_slowdown(&self, ticker: &str, snapshot: &IntradaySnapshot) -> SlowdownOpinion;

    /// Re-examine the full decision payload adversarially before execution.
    async fn verify_trade(&self, ticker: &str, decision: &serde_json::Value) -> TradeVerification;

    /// Post-trade lessons for the journal. Empty string on failure; the
    /// record is stored either way.
    async fn reflect_on_trade(&self, record: &TradeRecord) -> String;
}
