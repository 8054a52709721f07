use clap::Args;
use serde_json::{json, Value};
use std::path::Path;

use vwap_execution_core::market_data::{
    build_interval_panel, read_symbols, DirectoryArchive, SessionWindow,
};

use crate::input;

/// Arguments for bucketing a tick-trade archive into interval tables
#[derive(Args)]
pub struct AggregateArgs {
    /// Archive root laid out as <dir>/<day>/<SYMBOL>_trades.csv
    #[arg(long)]
    pub trades_dir: String,

    /// File with one instrument symbol per line
    #[arg(long)]
    pub symbols: String,

    /// JSON session window file {start_ms, end_ms, interval_ms}; overrides the clock flags
    #[arg(long)]
    pub window: Option<String>,

    /// Session open as HH:MM
    #[arg(long, default_value = "09:30")]
    pub open: String,

    /// Session close as HH:MM
    #[arg(long, default_value = "16:00")]
    pub close: String,

    /// Bucket width in minutes
    #[arg(long, default_value_t = 30)]
    pub interval_minutes: u64,

    /// Directory for price_results.csv and volume_results.csv
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

pub fn run_aggregate(args: AggregateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let window: SessionWindow = match args.window {
        Some(ref path) => input::file::read_json(path)?,
        None => SessionWindow::from_clock(&args.open, &args.close, args.interval_minutes)?,
    };
    let archive = DirectoryArchive::new(&args.trades_dir);
    let days = archive.trading_days()?;
    if days.is_empty() {
        return Err(format!("no trading-day directories under '{}'", args.trades_dir).into());
    }
    let symbols = read_symbols(Path::new(&args.symbols))?;

    let panel = build_interval_panel(&archive, &days, &symbols, &window)?;
    let (price_file, volume_file) = panel.write_csv_files(Path::new(&args.out_dir))?;

    let skipped: Vec<Value> = panel
        .skipped
        .iter()
        .map(|(day, symbol)| json!({ "day": day, "symbol": symbol }))
        .collect();
    Ok(json!({
        "result": {
            "instruments": panel.symbols.len(),
            "days": panel.days.len(),
            "intervals_per_day": panel.intervals_per_day,
            "skipped_instrument_days": skipped.len(),
            "price_file": price_file.display().to_string(),
            "volume_file": volume_file.display().to_string(),
        },
        "skipped": skipped,
    }))
}
