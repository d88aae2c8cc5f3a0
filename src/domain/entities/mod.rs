pub mod position;
pub mod run_state;
pub mod trade_record;
