//! On-disk journal persistence: records survive a connection reopen.

use rusqlite::Connection;
use surgefade::domain::entities::trade_record::{ExitReason, TradeOutcome, TradeRecord};
use surgefade::domain::ports::journal::TradeJournal;
use surgefade::infrastructure::sqlite::journal::SqliteJournal;
use surgefade::infrastructure::sqlite::migrations::run_migrations;

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("trades.db");

    let record = TradeRecord::new(
        "NVDA".into(),
        216.0,
        233.28,
        30,
        0.2,
        ExitReason::StopLoss,
        true,
    );

    {
        let conn = Connection::open(&db_path).unwrap();
        run_migrations(&conn).unwrap();
        let journal = SqliteJournal::new(conn);
        journal.record_trade(&record, "cut losers faster").unwrap();
    }

    let conn = Connection::open(&db_path).unwrap();
    run_migrations(&conn).unwrap();
    let journal = SqliteJournal::new(conn);
    let listed = journal.list_trades(None).unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record.id);
    assert_eq!(listed[0].outcome, TradeOutcome::Loss);
    assert_eq!(listed[0].exit_reason, ExitReason::StopLoss);
    assert!((listed[0].profit_loss - record.profit_loss).abs() < 1e-9);
}

#[test]
fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
}
