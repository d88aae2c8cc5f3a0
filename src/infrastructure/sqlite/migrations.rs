use rusqlite::Connection;

use crate::domain::error::DomainError;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS trades (
            id TEXT PRIMARY KEY,
            ticker TEXT NOT NULL,
            entry_price REAL NOT NULL,
            exit_price REAL NOT NULL,
            shares INTEGER NOT NULL,
            profit_loss REAL NOT NULL,
            days_held REAL NOT NULL,
            outcome TEXT NOT NULL,
            exit_reason TEXT NOT NULL,
            reflection TEXT NOT NULL DEFAULT '',
            recorded_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_trades_recorded ON trades(recorded_at);
        CREATE INDEX IF NOT EXISTS idx_trades_ticker ON trades(ticker);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
