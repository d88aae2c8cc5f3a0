use rusqlite::{params, Connection};
use std::sync::Mutex;

use crate::domain::entities::trade_record::TradeRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::journal::TradeJournal;

pub struct SqliteJournal {
    conn: Mutex<Connection>,
}

impl SqliteJournal {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<TradeRecord, rusqlite::Error> {
        let outcome_str: String = row.get(7)?;
        let reason_str: String = row.get(8)?;
        let recorded_str: String = row.get(9)?;

        Ok(TradeRecord {
            id: row.get(0)?,
            ticker: row.get(1)?,
            entry_price: row.get(2)?,
            exit_price: row.get(3)?,
            shares: row.get::<_, i64>(4)? as u64,
            profit_loss: row.get(5)?,
            days_held: row.get(6)?,
            outcome: outcome_str
                .parse()
                .map_err(|_| rusqlite::Error::InvalidParameterName(outcome_str.clone()))?,
            exit_reason: reason_str
                .parse()
                .map_err(|_| rusqlite::Error::InvalidParameterName(reason_str.clone()))?,
            recorded_at: chrono::DateTime::parse_from_rfc3339(&recorded_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl TradeJournal for SqliteJournal {
    fn record_trade(&self, record: &TradeRecord, reflection: &str) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO trades (id, ticker, entry_price, exit_price, shares, profit_loss, days_held, outcome, exit_reason, reflection, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id,
                record.ticker,
                record.entry_price,
                record.exit_price,
                record.shares as i64,
                record.profit_loss,
                record.days_held,
                record.outcome.to_string(),
                record.exit_reason.to_string(),
                reflection,
                record.recorded_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to record trade: {e}")))?;
        Ok(())
    }

    fn list_trades(&self, limit: Option<usize>) -> Result<Vec<TradeRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = String::from(
            "SELECT id, ticker, entry_price, exit_price, shares, profit_loss, days_held, outcome, exit_reason, recorded_at FROM trades ORDER BY recorded_at DESC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let records = stmt
            .query_map([], Self::row_to_record)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }
}
