use crate::domain::entities::trade_record::TradeRecord;
use crate::domain::error::DomainError;

/// Trade journal port (sink). The reflection text is produced by the
/// judgment gateway in the record stage and stored alongside the row.
pub trait TradeJournal: Send + Sync {
    fn record_trade(&self, record: &TradeRecord, reflection: &str) -> Result<(), DomainError>;

    fn list_trades(&self, limit: Option<usize>) -> Result<Vec<TradeRecord>, DomainError>;
}
