pub mod confidence;
pub mod hard_rules;
pub mod market_hours;
pub mod order_batch;
pub mod stop_loss;
pub mod surge;
