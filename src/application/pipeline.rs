//! The decision pipeline: nine named stages over one `RunState`.
//!
//! Each stage reads the fields earlier stages wrote, writes its own result
//! field, and either leaves the abort slot empty or fills it. The
//! orchestrator never retries a stage; retry and backoff belong to the
//! gateway a stage calls. One ticker per invocation; the driver serialises
//! runs, so no two positions are ever worked concurrently.

use std::sync::Arc;

use chrono::Utc;
use log::{error, info};

use crate::application::lifecycle::PositionLifecycle;
use crate::config::Config;
use crate::domain::entities::position::Position;
use crate::domain::entities::run_state::{
    EarningsCandidate, PipelineStage, RunState, SlowdownDecision,
};
use crate::domain::entities::trade_record::TradeRecord;
use crate::domain::ports::approval::{ApprovalGateway, ApprovalRequest};
use crate::domain::ports::earnings::EarningsCalendarGateway;
use crate::domain::ports::journal::TradeJournal;
use crate::domain::ports::judgment::JudgmentGateway;
use crate::domain::ports::market_data::MarketDataGateway;
use crate::domain::ports::news::NewsGateway;
use crate::domain::values::hard_rules::evaluate_hard_rules;
use crate::domain::values::stop_loss::{
    historical_volatility, stop_loss_pct, stop_loss_price, take_profit_target,
};
use crate::domain::values::surge::{evaluate_market_health, evaluate_surge, IndexChange};

pub struct Pipeline {
    market: Arc<dyn MarketDataGateway>,
    earnings: Arc<dyn EarningsCalendarGateway>,
    news: Arc<dyn NewsGateway>,
    judgment: Arc<dyn JudgmentGateway>,
    approval: Arc<dyn ApprovalGateway>,
    journal: Arc<dyn TradeJournal>,
    lifecycle: PositionLifecycle,
    config: Config,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market: Arc<dyn MarketDataGateway>,
        earnings: Arc<dyn EarningsCalendarGateway>,
        news: Arc<dyn NewsGateway>,
        judgment: Arc<dyn JudgmentGateway>,
        approval: Arc<dyn ApprovalGateway>,
        journal: Arc<dyn TradeJournal>,
        lifecycle: PositionLifecycle,
        config: Config,
    ) -> Self {
        Self {
            market,
            earnings,
            news,
            judgment,
            approval,
            journal,
            lifecycle,
            config,
        }
    }

    /// One full run: scan the watchlist and push the first candidate through
    /// every gate. Always terminates cleanly: an aborted run carries its
    /// reason, a completed run carries the trade payloads.
    pub async fn run(&self) -> RunState {
        let state = self.scan_earnings(RunState::new()).await;
        self.run_gates(state).await
    }

    /// Push an already-selected candidate through stages 2–9 (single-ticker
    /// mode, and the seam the integration tests drive).
    pub async fn run_for_candidate(&self, state: RunState) -> RunState {
        self.run_gates(state).await
    }

    /// Conditional edges: every gate either advances to the next stage or
    /// routes straight to the end with its abort reason.
    async fn run_gates(&self, mut state: RunState) -> RunState {
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.classify_beat(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.surge_gate(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.detect_slowdown(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.verify(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.request_approval(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.enter(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.monitor_and_exit(state).await;
        if state.is_aborted() {
            return Self::finish(state);
        }
        state = self.record_trade(state).await;
        Self::finish(state)
    }

    fn finish(state: RunState) -> RunState {
        if let Some(abort) = &state.abort {
            info!("Pipeline aborted: {abort}");
        }
        state
    }

    /// Stage 1: scan the earnings calendar. Advances when at least one
    /// watchlist ticker reports within the configured window; the earliest
    /// hit becomes the run's candidate.
    async fn scan_earnings(&self, mut state: RunState) -> RunState {
        let today = Utc::now().date_naive();

        for ticker in &self.config.watchlist {
            let date = match self.earnings.next_earnings_date(ticker).await {
                Ok(Some(date)) => date,
                Ok(None) => continue,
                Err(e) => {
                    // One bad calendar read skips the ticker, not the scan.
                    log::warn!("Earnings date lookup failed for {ticker}: {e}");
                    continue;
                }
            };

            let days_until = (date - today).num_days();
            if !(0..=self.config.earnings_window_days).contains(&days_until) {
                continue;
            }

            let price = match self.market.latest_close(ticker).await {
                Ok(p) if p > 0.0 => p,
                _ => continue,
            };

            info!("Earnings in {days_until} days: {ticker} @ ${price:.2}");
            state.candidates.push(EarningsCandidate {
                ticker: ticker.clone(),
                earnings_date: date,
                days_until,
                pre_earnings_price: price,
            });
        }

        let first = state
            .candidates
            .first()
            .map(|c| (c.ticker.clone(), c.pre_earnings_price));
        match first {
            Some((ticker, price)) => {
                state.ticker = ticker;
                state.pre_earnings_price = price;
            }
            None => state.abort(PipelineStage::ScanEarnings, "No upcoming earnings in window"),
        }
        state
    }

    /// Stage 2: classify the earnings result. Advances only on a confirmed
    /// beat at or above the configured minimum.
    async fn classify_beat(&self, mut state: RunState) -> RunState {
        let evidence = self.news.earnings_news(&state.ticker).await;
        let beat = self
            .judgment
            .classify_earnings_beat(&state.ticker, &evidence)
            .await;

        let qualifies = beat.beat && beat.beat_pct >= self.config.eps_beat_min_pct;
        info!(
            "Earnings beat {}: qualifies={} (beat_pct={:.1}%)",
            state.ticker, qualifies, beat.beat_pct
        );
        if !qualifies {
            state.abort(
                PipelineStage::ClassifyBeat,
                format!(
                    "Earnings did not qualify (beat={} pct={:.1}%)",
                    beat.beat, beat.beat_pct
                ),
            );
        }
        state.earnings_beat = Some(beat);
        state
    }

    /// Stage 3: broad-market health, then the surge check against the
    /// pre-earnings baseline.
    async fn surge_gate(&self, mut state: RunState) -> RunState {
        let mut changes = Vec::with_capacity(self.config.indexes.len());
        for symbol in &self.config.indexes {
            match self.market.index_change(symbol).await {
                Ok(change_pct) => changes.push(IndexChange {
                    symbol: symbol.clone(),
                    change_pct,
                }),
                Err(e) => {
                    state.abort(
                        PipelineStage::SurgeGate,
                        format!("Index data unavailable for {symbol}: {e}"),
                    );
                    return state;
                }
            }
        }

        let health = evaluate_market_health(changes);
        if !health.healthy {
            let detail: Vec<String> = health
                .changes
                .iter()
                .map(|c| format!("{} {:+.2}%", c.symbol, c.change_pct))
                .collect();
            state.abort(
                PipelineStage::SurgeGate,
                format!("Market unhealthy ({})", detail.join(", ")),
            );
            state.market_health = Some(health);
            return state;
        }
        state.market_health = Some(health);

        let current = self.market.current_price(&state.ticker).await.unwrap_or(0.0);
        let surge = evaluate_surge(current, state.pre_earnings_price, self.config.surge_threshold_pct);
        info!(
            "Surge check {}: {:.2}% surging={}",
            state.ticker, surge.surge_pct, surge.surging
        );
        if !surge.surging {
            state.abort(
                PipelineStage::SurgeGate,
                format!("No surge detected ({:.2}%)", surge.surge_pct),
            );
        }
        state.surge = Some(surge);
        state
    }

    /// Stage 4: slowdown detection. Price guard, then hard-rule majority
    /// fused with the AI opinion. The stop levels are computed here so the
    /// approval message and the monitor loop share one set of numbers.
    async fn detect_slowdown(&self, mut state: RunState) -> RunState {
        let snapshot = match self.market.intraday_snapshot(&state.ticker).await {
            Ok(Some(snap)) => snap,
            Ok(None) | Err(_) => {
                state.abort(PipelineStage::SlowdownDetect, "No intraday data");
                return state;
            }
        };

        let current = snapshot.current_price;
        let gain = current - state.pre_earnings_price;
        if gain < self.config.price_guard_min_gain {
            state.abort(
                PipelineStage::SlowdownDetect,
                format!(
                    "Price guard: only ${gain:.2} gain (need ${:.0})",
                    self.config.price_guard_min_gain
                ),
            );
            return state;
        }

        let hard_rules = evaluate_hard_rules(
            &snapshot.prices,
            &snapshot.volumes,
            current,
            &self.config.slowdown,
        );
        let ai_opinion = self.judgment.classify_slowdown(&state.ticker, &snapshot).await;

        let ai_ok = ai_opinion.confidence.meets(self.config.ai_confidence_threshold);
        let triggered = hard_rules.passed && ai_ok;
        info!(
            "Slowdown {}: trigger={} rules={}/3 ai_conf={}",
            state.ticker, triggered, hard_rules.rules_met, ai_opinion.confidence
        );

        let (stop, target) = if triggered {
            let closes = self.market.daily_closes(&state.ticker, 30).await.unwrap_or_default();
            let vol = historical_volatility(&closes);
            let pct = stop_loss_pct(vol, &self.config.stop_loss);
            (
                stop_loss_price(current, pct),
                take_profit_target(current, self.config.take_profit_pct),
            )
        } else {
            (0.0, 0.0)
        };

        if !triggered {
            state.abort(
                PipelineStage::SlowdownDetect,
                format!(
                    "Slowdown conditions not met (rules {}/3, AI {})",
                    hard_rules.rules_met, ai_opinion.confidence
                ),
            );
        }
        state.slowdown = Some(SlowdownDecision {
            triggered,
            current_price: current,
            hard_rules,
            ai_opinion,
            stop_loss_price: stop,
            take_profit_price: target,
        });
        state
    }

    /// Stage 5: adversarial verification. The judgment service re-examines
    /// the whole decision payload before any human sees it.
    async fn verify(&self, mut state: RunState) -> RunState {
        let Some(slowdown) = &state.slowdown else {
            state.abort(PipelineStage::Verification, "No slowdown decision to verify");
            return state;
        };

        let payload = serde_json::to_value(slowdown).unwrap_or_default();
        let verification = self.judgment.verify_trade(&state.ticker, &payload).await;

        let proceed = verification.confirmed
            && verification.confidence.meets(self.config.ai_confidence_threshold);
        info!(
            "Verification {}: proceed={} confidence={}",
            state.ticker, proceed, verification.confidence
        );
        if !proceed {
            state.abort(PipelineStage::Verification, "Adversarial verification failed");
        }
        state.verification = Some(verification);
        state
    }

    /// Stage 6: human approval with a bounded wait; no reply is a rejection.
    async fn request_approval(&self, mut state: RunState) -> RunState {
        let (entry_price, stop_loss, rules_met) = match &state.slowdown {
            Some(s) => (s.current_price, s.stop_loss_price, s.hard_rules.rules_met),
            None => (0.0, 0.0, 0),
        };
        let confidence = state
            .verification
            .as_ref()
            .map(|v| v.confidence.value())
            .unwrap_or(0);

        let request = ApprovalRequest {
            ticker: state.ticker.clone(),
            entry_price,
            stop_loss,
            confidence,
            rules_met,
        };

        let sent_at = match self.approval.request_approval(&request).await {
            Ok(ts) => ts,
            Err(e) => {
                state.abort(PipelineStage::Approval, format!("Approval request failed: {e}"));
                return state;
            }
        };

        let approved = self
            .approval
            .await_reply(sent_at, self.config.approval_timeout_secs)
            .await;
        info!("Approval {}: approved={}", state.ticker, approved);
        if !approved {
            state.abort(PipelineStage::Approval, "Rejected or timed out");
        }
        state.approved = Some(approved);
        state
    }

    /// Stage 7: batched short entry. Zero fills (or an unsizeable order)
    /// abort the run; nothing was opened, so there is nothing to monitor.
    async fn enter(&self, mut state: RunState) -> RunState {
        let reference = state.slowdown.as_ref().map(|s| s.current_price).unwrap_or(0.0);

        let batch = match self.lifecycle.enter_position(&state.ticker, reference).await {
            Ok(batch) => batch,
            Err(e) => {
                state.abort(PipelineStage::Entry, format!("Short execution failed: {e}"));
                return state;
            }
        };

        if !batch.success() {
            state.abort(PipelineStage::Entry, "Short execution failed: no tranches filled");
            state.entry = Some(batch);
            return state;
        }

        let stop = state
            .slowdown
            .as_ref()
            .map(|s| s.stop_loss_price)
            .unwrap_or(0.0);
        if let Some(position) = Position::open(state.ticker.clone(), &batch, stop) {
            self.approval
                .notify(&format!(
                    "OPENED: short {} x{} @ ${:.2} (stop ${:.2})",
                    position.ticker, position.shares, position.avg_entry_price, position.stop_loss_price
                ))
                .await;
            state.position = Some(position);
        }
        state.entry = Some(batch);
        state
    }

    /// Stage 8: monitor to an exit condition, then cover. Unconditional:
    /// whatever the monitor says, the run advances to the record stage.
    async fn monitor_and_exit(&self, mut state: RunState) -> RunState {
        let Some(position) = state.position.clone() else {
            state.abort(PipelineStage::MonitorAndExit, "No open position to monitor");
            return state;
        };

        let monitor = self
            .lifecycle
            .monitor_position(
                &position.ticker,
                position.avg_entry_price,
                position.stop_loss_price,
            )
            .await;
        let exit = self
            .lifecycle
            .exit_position(&position.ticker, position.shares, monitor.reason)
            .await;

        if exit.success() {
            if let Some(p) = state.position.as_mut() {
                p.close();
            }
        }
        state.monitor = Some(monitor);
        state.exit = Some(exit);
        state
    }

    /// Stage 9, terminal: build the immutable trade record, ask the
    /// judgment service for lessons, hand both to the journal.
    async fn record_trade(&self, mut state: RunState) -> RunState {
        let (Some(position), Some(monitor), Some(exit)) =
            (&state.position, &state.monitor, &state.exit)
        else {
            state.abort(PipelineStage::RecordTrade, "Incomplete trade payloads");
            return state;
        };

        // A failed cover has no fill average; fall back to the price that
        // triggered the exit so the record still reflects the market.
        let exit_avg = exit
            .average_fill_price()
            .unwrap_or(monitor.exit_signal_price);

        let record = TradeRecord::new(
            position.ticker.clone(),
            position.avg_entry_price,
            exit_avg,
            position.shares,
            monitor.days_held,
            monitor.reason,
            exit.success(),
        );

        let reflection = self.judgment.reflect_on_trade(&record).await;
        if let Err(e) = self.journal.record_trade(&record, &reflection) {
            error!("Failed to journal trade for {}: {e}", state.ticker);
        } else {
            info!(
                "Trade recorded {}: P&L=${:.2} outcome={}",
                record.ticker, record.profit_loss, record.outcome
            );
        }
        state
    }
}
