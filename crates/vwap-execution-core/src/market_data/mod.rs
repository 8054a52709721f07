//! Historical interval data for the execution models.
//!
//! Raw tick trades per instrument per day are bucketed into fixed-width
//! session intervals, producing the interval-average price and interval
//! volume series that the realized-cost evaluator consumes.

pub mod buckets;
pub mod panel;
pub mod tape;

pub use buckets::{bucket_trades, IntervalBar, SessionWindow};
pub use panel::{build_interval_panel, read_symbols, DirectoryArchive, IntervalPanel, TradeArchive};
pub use tape::{TickTape, TickTrade, TradeTape};
