use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::buckets::{bucket_trades, SessionWindow};
use super::tape::{TickTape, TradeTape};
use crate::error::ExecutionError;
use crate::types::Price;
use crate::ExecutionResult;

/// Source of per-instrument, per-day trade tapes.
pub trait TradeArchive {
    type Tape: TradeTape;

    /// `Ok(None)` when the archive has no file for this instrument-day.
    fn open(&self, day: &str, symbol: &str) -> ExecutionResult<Option<Self::Tape>>;
}

/// Archive laid out as `<root>/<day>/<SYMBOL>_trades.csv`.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn tape_path(&self, day: &str, symbol: &str) -> PathBuf {
        self.root.join(day).join(format!("{}_trades.csv", symbol))
    }

    /// Day sub-directories, in calendar order where the names are
    /// `YYYYMMDD` or `YYYY-MM-DD` dates and name order otherwise.
    pub fn trading_days(&self) -> ExecutionResult<Vec<String>> {
        let mut days = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                days.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        days.sort_by_key(|d| (parse_day(d), d.clone()));
        Ok(days)
    }
}

fn parse_day(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(label, "%Y-%m-%d"))
        .ok()
}

impl TradeArchive for DirectoryArchive {
    type Tape = TickTape;

    fn open(&self, day: &str, symbol: &str) -> ExecutionResult<Option<TickTape>> {
        let path = self.tape_path(day, symbol);
        if !path.is_file() {
            return Ok(None);
        }
        TickTape::from_csv_path(&path).map(Some)
    }
}

/// Interval prices and volumes for many instruments over many days.
///
/// Row `s` belongs to `symbols[s]`; column `d * intervals_per_day + i` is
/// bucket `i` of `days[d]`. Skipped instrument-days stay zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalPanel {
    pub symbols: Vec<String>,
    pub days: Vec<String>,
    pub intervals_per_day: usize,
    pub prices: Vec<Vec<Price>>,
    pub volumes: Vec<Vec<Decimal>>,
    /// `(day, symbol)` pairs with no trade file
    pub skipped: Vec<(String, String)>,
}

impl IntervalPanel {
    fn empty(symbols: &[String], days: &[String], intervals_per_day: usize) -> Self {
        let width = days.len() * intervals_per_day;
        Self {
            symbols: symbols.to_vec(),
            days: days.to_vec(),
            intervals_per_day,
            prices: vec![vec![Decimal::ZERO; width]; symbols.len()],
            volumes: vec![vec![Decimal::ZERO; width]; symbols.len()],
            skipped: Vec::new(),
        }
    }

    /// Interval prices and volumes of one instrument-day, ready for the
    /// realized-cost evaluator.
    pub fn day_series(&self, symbol: &str, day: usize) -> Option<(Vec<Price>, Vec<Decimal>)> {
        if day >= self.days.len() {
            return None;
        }
        let row = self.symbols.iter().position(|s| s == symbol)?;
        let cols = day * self.intervals_per_day..(day + 1) * self.intervals_per_day;
        Some((
            self.prices[row][cols.clone()].to_vec(),
            self.volumes[row][cols].to_vec(),
        ))
    }

    fn write_table<W: Write>(
        &self,
        writer: W,
        values: &[Vec<Decimal>],
        suffix: &str,
    ) -> ExecutionResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec!["stock_name".to_string()];
        for d in 0..self.days.len() {
            for i in 0..self.intervals_per_day {
                header.push(format!("day_{}_interval_{}_{}", d + 1, i + 1, suffix));
            }
        }
        wtr.write_record(&header)?;
        for (symbol, row) in self.symbols.iter().zip(values) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(symbol.clone());
            record.extend(row.iter().map(|v| v.normalize().to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Wide price table: `stock_name, day_1_interval_1_avg_price, ...`.
    pub fn write_price_csv<W: Write>(&self, writer: W) -> ExecutionResult<()> {
        self.write_table(writer, &self.prices, "avg_price")
    }

    /// Wide volume table: `stock_name, day_1_interval_1_cum_volume, ...`.
    pub fn write_volume_csv<W: Write>(&self, writer: W) -> ExecutionResult<()> {
        self.write_table(writer, &self.volumes, "cum_volume")
    }

    /// Write `price_results.csv` and `volume_results.csv` into `dir`.
    pub fn write_csv_files(&self, dir: &Path) -> ExecutionResult<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)?;
        let price_path = dir.join("price_results.csv");
        let volume_path = dir.join("volume_results.csv");
        self.write_price_csv(fs::File::create(&price_path)?)?;
        self.write_volume_csv(fs::File::create(&volume_path)?)?;
        Ok((price_path, volume_path))
    }
}

/// Bucket every instrument-day of `archive` into one panel.
///
/// A missing instrument-day is logged and skipped; the batch carries on.
pub fn build_interval_panel<A: TradeArchive>(
    archive: &A,
    days: &[String],
    symbols: &[String],
    window: &SessionWindow,
) -> ExecutionResult<IntervalPanel> {
    window.validate()?;
    let per_day = window.bucket_count();
    let mut panel = IntervalPanel::empty(symbols, days, per_day);

    for (d, day) in days.iter().enumerate() {
        for (s, symbol) in symbols.iter().enumerate() {
            let Some(tape) = archive.open(day, symbol)? else {
                log::warn!("no trade data for {} on {}, skipping", symbol, day);
                panel.skipped.push((day.clone(), symbol.clone()));
                continue;
            };
            let bars = bucket_trades(&tape, window)?;
            let offset = d * per_day;
            for (i, bar) in bars.into_iter().enumerate() {
                panel.prices[s][offset + i] = bar.avg_price;
                panel.volumes[s][offset + i] = bar.volume;
            }
        }
        log::debug!("bucketed {} instruments for {}", symbols.len(), day);
    }

    log::info!(
        "built interval panel: {} instruments x {} days x {} intervals ({} skipped)",
        symbols.len(),
        days.len(),
        per_day,
        panel.skipped.len()
    );
    Ok(panel)
}

/// One symbol per line; blank lines ignored.
pub fn read_symbols(path: &Path) -> ExecutionResult<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    let symbols: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    if symbols.is_empty() {
        return Err(ExecutionError::InsufficientData(format!(
            "no symbols in {}",
            path.display()
        )));
    }
    Ok(symbols)
}
