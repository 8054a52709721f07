pub mod execution;
pub mod market_data;
