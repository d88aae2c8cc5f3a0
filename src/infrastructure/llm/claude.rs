//! Claude-backed judgment gateway (Anthropic messages API).
//!
//! Every classifier asks for a strict JSON answer, strips optional markdown
//! fences, and parses into a wire struct. Malformed output and transport
//! errors both collapse to the conservative default for that judgment, so a
//! broken model can only ever veto a trade.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::entities::trade_record::TradeRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::judgment::{
    EarningsBeat, JudgmentGateway, SlowdownOpinion, TradeVerification,
};
use crate::domain::ports::market_data::IntradaySnapshot;
use crate::domain::values::confidence::Confidence;

const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 400;

pub struct ClaudeJudgment {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeJudgment {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, DomainError> {
        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: self.model.clone(),
                max_tokens,
                messages: vec![Message {
                    role: "user".to_string(),
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(|e| DomainError::Judgment(format!("Anthropic API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Judgment(format!("Anthropic API {status}: {body}")));
        }

        let result: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        Ok(result
            .content
            .into_iter()
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Strip optional ```json fences and parse. `None` on any parse error;
/// callers substitute their conservative default.
fn parse_fenced<T: DeserializeOwned>(text: &str) -> Option<T> {
    let clean = text.replace("```json", "").replace("```", "");
    match serde_json::from_str(clean.trim()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("JSON parse failed: {e} | raw={}", truncate(text, 120));
            None
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[derive(Deserialize, Default)]
struct BeatWire {
    #[serde(default)]
    beat: bool,
    #[serde(default)]
    beat_pct: f64,
    #[serde(default)]
    confidence: i64,
    #[serde(default)]
    reason: String,
}

#[derive(Deserialize, Default)]
struct SlowdownWire {
    #[serde(default)]
    slowing: bool,
    #[serde(default)]
    confidence: i64,
    #[serde(default)]
    reasoning: String,
}

#[derive(Deserialize, Default)]
struct VerifyWire {
    #[serde(default)]
    confirmed: bool,
    #[serde(default)]
    confidence: i64,
    #[serde(default)]
    risk_factors: Vec<String>,
    #[serde(default)]
    final_reasoning: String,
}

#[async_trait]
impl JudgmentGateway for ClaudeJudgment {
    async fn classify_earnings_beat(&self, ticker: &str, evidence: &str) -> EarningsBeat {
        let prompt = format!(
            "Did {ticker} beat Wall Street EPS expectations this quarter?\n\n\
             Source text:\n{}\n\n\
             Answer ONLY in JSON (no prose, no markdown fences):\n\
             {{\"beat\": true/false, \"beat_pct\": <float>, \"confidence\": <0-100>, \"reason\": \"<1 sentence>\"}}\n\n\
             beat_pct = how much above consensus in %, e.g. 15.0 means 15% beat.\n\
             If the beat is unclear, set beat=false and confidence low.",
            truncate(evidence, 1500)
        );

        let raw = match self.complete(prompt, 200).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("classify_earnings_beat({ticker}) failed: {e}");
                return EarningsBeat::default();
            }
        };
        match parse_fenced::<BeatWire>(&raw) {
            Some(wire) => EarningsBeat {
                beat: wire.beat,
                beat_pct: wire.beat_pct,
                confidence: Confidence::clamped(wire.confidence),
                reason: wire.reason,
            },
            None => EarningsBeat {
                reason: "parse error".to_string(),
                ..EarningsBeat::default()
            },
        }
    }

    async fn classify_slowdown(&self, ticker: &str, snapshot: &IntradaySnapshot) -> SlowdownOpinion {
        let tail = |v: &[f64]| -> Vec<f64> {
            v.iter().rev().take(12).rev().map(|p| (p * 100.0).round() / 100.0).collect()
        };
        let prompt = format!(
            "Is the post-earnings surge in {ticker} SLOWING DOWN and reversing?\n\n\
             Recent 5-min prices (newest last): {:?}\n\
             Recent 5-min volumes:              {:?}\n\
             Today's intraday high:             ${:.2}\n\
             Current price:                     ${:.2}\n\n\
             Look for: flattening momentum, volume exhaustion, pullback from peak.\n\n\
             Answer ONLY in JSON:\n\
             {{\"slowing\": true/false, \"confidence\": <0-100>, \"reasoning\": \"<2 sentences>\"}}",
            tail(&snapshot.prices),
            snapshot
                .volumes
                .iter()
                .rev()
                .take(12)
                .rev()
                .map(|v| *v as u64)
                .collect::<Vec<_>>(),
            snapshot.today_high,
            snapshot.current_price,
        );

        let raw = match self.complete(prompt, 200).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("classify_slowdown({ticker}) failed: {e}");
                return SlowdownOpinion::default();
            }
        };
        match parse_fenced::<SlowdownWire>(&raw) {
            Some(wire) => SlowdownOpinion {
                slowing: wire.slowing,
                confidence: Confidence::clamped(wire.confidence),
                reasoning: wire.reasoning,
            },
            None => SlowdownOpinion {
                reasoning: "parse error".to_string(),
                ..SlowdownOpinion::default()
            },
        }
    }

    async fn verify_trade(&self, ticker: &str, decision: &serde_json::Value) -> TradeVerification {
        let decision_json = serde_json::to_string_pretty(decision).unwrap_or_default();
        let prompt = format!(
            "You are reviewing a short-sell decision on {ticker}. Apply two rounds of reasoning:\n\n\
             Round 1 (Support): Why is this trade safe and well-timed?\n\
             Round 2 (Devil's Advocate): What could go wrong? List specific risks.\n\n\
             Trade data:\n{}\n\n\
             After both rounds, give a final verdict.\n\n\
             Answer ONLY in JSON:\n\
             {{\n\
               \"confirmed\": true/false,\n\
               \"confidence\": <0-100>,\n\
               \"risk_factors\": [\"<risk1>\", \"<risk2>\"],\n\
               \"final_reasoning\": \"<1-2 sentences>\"\n\
             }}",
            truncate(&decision_json, 1500)
        );

        let raw = match self.complete(prompt, DEFAULT_MAX_TOKENS).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("verify_trade({ticker}) failed: {e}");
                return TradeVerification {
                    risk_factors: vec!["verification error".to_string()],
                    ..TradeVerification::default()
                };
            }
        };
        match parse_fenced::<VerifyWire>(&raw) {
            Some(wire) => TradeVerification {
                confirmed: wire.confirmed,
                confidence: Confidence::clamped(wire.confidence),
                risk_factors: wire.risk_factors,
                reasoning: wire.final_reasoning,
            },
            None => TradeVerification {
                risk_factors: vec!["verification error".to_string()],
                ..TradeVerification::default()
            },
        }
    }

    async fn reflect_on_trade(&self, record: &TradeRecord) -> String {
        let prompt = format!(
            "A short trade just closed. Reflect on it in 3 short lessons for the\n\
             next trade. Be concrete; no preamble.\n\n\
             Ticker: {} | entry ${:.2} | exit ${:.2} | {} shares\n\
             P&L: ${:.2} | held {:.1} days | exit reason: {} | outcome: {}",
            record.ticker,
            record.entry_price,
            record.exit_price,
            record.shares,
            record.profit_loss,
            record.days_held,
            record.exit_reason,
            record.outcome,
        );

        match self.complete(prompt, DEFAULT_MAX_TOKENS).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("reflect_on_trade({}) failed: {e}", record.ticker);
                String::new()
            }
        }
    }
}
