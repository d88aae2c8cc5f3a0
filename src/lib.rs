pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use rusqlite::Connection;

use crate::application::driver::RunDriver;
use crate::application::lifecycle::PositionLifecycle;
use crate::application::pipeline::Pipeline;
use crate::config::Config;
use crate::domain::entities::run_state::RunState;
use crate::domain::entities::trade_record::TradeRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::approval::ApprovalGateway;
use crate::domain::ports::broker::BrokerGateway;
use crate::domain::ports::earnings::EarningsCalendarGateway;
use crate::domain::ports::journal::TradeJournal;
use crate::domain::ports::judgment::JudgmentGateway;
use crate::domain::ports::market_data::MarketDataGateway;
use crate::domain::ports::news::NewsGateway;
use crate::domain::values::surge::{evaluate_market_health, IndexChange, MarketHealth};
use crate::infrastructure::broker::paper::PaperBroker;
use crate::infrastructure::feeds::duckduckgo::DuckDuckGoNews;
use crate::infrastructure::feeds::yahoo::YahooFeed;
use crate::infrastructure::llm::claude::ClaudeJudgment;
use crate::infrastructure::notify::twilio::TwilioApproval;
use crate::infrastructure::sqlite::journal::SqliteJournal;
use crate::infrastructure::sqlite::migrations::run_migrations;

/// Facade wiring the gateways, the pipeline, and the run driver.
pub struct SurgeFade {
    pipeline: Arc<Pipeline>,
    market: Arc<dyn MarketDataGateway>,
    journal: Arc<dyn TradeJournal>,
    config: Config,
}

impl SurgeFade {
    /// Production wiring from environment variables: Yahoo market data,
    /// DuckDuckGo news, Claude judgment, Twilio approval, paper broker,
    /// sqlite journal.
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let config = Config::from_env()?;

        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        let model = std::env::var("SURGEFADE_CLAUDE_MODEL").ok();
        let twilio_sid = std::env::var("TWILIO_ACCOUNT_SID").unwrap_or_default();
        let twilio_token = std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default();
        let twilio_from = std::env::var("TWILIO_FROM_PHONE").unwrap_or_default();
        let user_phone = std::env::var("USER_PHONE").unwrap_or_default();

        let yahoo = Arc::new(YahooFeed::new());
        let market: Arc<dyn MarketDataGateway> = yahoo.clone();
        let earnings: Arc<dyn EarningsCalendarGateway> = yahoo;
        let news: Arc<dyn NewsGateway> = Arc::new(DuckDuckGoNews::new());
        let judgment: Arc<dyn JudgmentGateway> = Arc::new(ClaudeJudgment::new(api_key, model));
        let approval: Arc<dyn ApprovalGateway> = Arc::new(TwilioApproval::new(
            twilio_sid,
            twilio_token,
            twilio_from,
            user_phone,
        ));
        let broker: Arc<dyn BrokerGateway> = Arc::new(PaperBroker::new(market.clone()));

        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;
        let journal: Arc<dyn TradeJournal> = Arc::new(SqliteJournal::new(conn));

        Ok(Self::with_gateways(
            market, earnings, news, judgment, approval, broker, journal, config,
        ))
    }

    /// Explicit wiring, the seam tests use to inject deterministic fakes.
    #[allow(clippy::too_many_arguments)]
    pub fn with_gateways(
        market: Arc<dyn MarketDataGateway>,
        earnings: Arc<dyn EarningsCalendarGateway>,
        news: Arc<dyn NewsGateway>,
        judgment: Arc<dyn JudgmentGateway>,
        approval: Arc<dyn ApprovalGateway>,
        broker: Arc<dyn BrokerGateway>,
        journal: Arc<dyn TradeJournal>,
        config: Config,
    ) -> Self {
        let lifecycle = PositionLifecycle::new(
            market.clone(),
            broker,
            approval.clone(),
            config.clone(),
        );
        let pipeline = Arc::new(Pipeline::new(
            market.clone(),
            earnings,
            news,
            judgment,
            approval,
            journal.clone(),
            lifecycle,
            config.clone(),
        ));

        Self {
            pipeline,
            market,
            journal,
            config,
        }
    }

    /// One full pipeline pass.
    pub async fn run_once(&self) -> RunState {
        self.pipeline.run().await
    }

    /// Continuous 7x24 driver loop. Never returns.
    pub async fn run_loop(&self) {
        RunDriver::new(self.pipeline.clone(), self.config.clone())
            .run_loop()
            .await;
    }

    pub fn trades(&self, limit: Option<usize>) -> Result<Vec<TradeRecord>, DomainError> {
        self.journal.list_trades(limit)
    }

    /// Current broad-market health over the configured indexes.
    pub async fn market_health(&self) -> Result<MarketHealth, DomainError> {
        let mut changes = Vec::with_capacity(self.config.indexes.len());
        for symbol in &self.config.indexes {
            changes.push(IndexChange {
                symbol: symbol.clone(),
                change_pct: self.market.index_change(symbol).await?,
            });
        }
        Ok(evaluate_market_health(changes))
    }
}
