use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tape::TradeTape;
use crate::error::ExecutionError;
use crate::types::Price;
use crate::ExecutionResult;

const MS_PER_MINUTE: u64 = 60 * 1000;

/// Trading session split into fixed-width buckets, in milliseconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub start_ms: u64,
    pub end_ms: u64,
    pub interval_ms: u64,
}

impl Default for SessionWindow {
    /// 09:30 to 16:00 in 30-minute buckets (13 buckets).
    fn default() -> Self {
        Self {
            start_ms: 570 * MS_PER_MINUTE,
            end_ms: 960 * MS_PER_MINUTE,
            interval_ms: 30 * MS_PER_MINUTE,
        }
    }
}

impl SessionWindow {
    pub fn from_times(open: NaiveTime, close: NaiveTime, interval_minutes: u64) -> Self {
        let ms = |t: NaiveTime| t.num_seconds_from_midnight() as u64 * 1000;
        Self {
            start_ms: ms(open),
            end_ms: ms(close),
            interval_ms: interval_minutes * MS_PER_MINUTE,
        }
    }

    /// Session from `HH:MM` (or `HH:MM:SS`) clock labels.
    pub fn from_clock(open: &str, close: &str, interval_minutes: u64) -> ExecutionResult<Self> {
        let window = Self::from_times(parse_clock(open)?, parse_clock(close)?, interval_minutes);
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> ExecutionResult<()> {
        if self.interval_ms == 0 {
            return Err(ExecutionError::invalid("interval_ms", "must be positive"));
        }
        if self.end_ms <= self.start_ms {
            return Err(ExecutionError::invalid("end_ms", "must be after start_ms"));
        }
        Ok(())
    }

    /// Buckets needed to cover the session; the last one may run past `end_ms`.
    pub fn bucket_count(&self) -> usize {
        (self.end_ms - self.start_ms).div_ceil(self.interval_ms) as usize
    }

    fn bucket_of(&self, timestamp: u64) -> Option<usize> {
        if timestamp < self.start_ms {
            return None;
        }
        let idx = ((timestamp - self.start_ms) / self.interval_ms) as usize;
        (idx < self.bucket_count()).then_some(idx)
    }
}

fn parse_clock(label: &str) -> ExecutionResult<NaiveTime> {
    NaiveTime::parse_from_str(label, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(label, "%H:%M:%S"))
        .map_err(|e| ExecutionError::DateError(format!("session time '{}': {}", label, e)))
}

/// Aggregate of the trades in one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalBar {
    /// Arithmetic mean of trade prices; zero for an empty bucket
    pub avg_price: Price,
    /// Sum of trade sizes
    pub volume: Decimal,
    pub trade_count: usize,
}

/// Bucket a tape into `[start + i*interval, start + (i+1)*interval)` bars.
/// Trades outside the session are ignored.
pub fn bucket_trades<T: TradeTape + ?Sized>(
    tape: &T,
    window: &SessionWindow,
) -> ExecutionResult<Vec<IntervalBar>> {
    window.validate()?;
    let mut price_sums = vec![Decimal::ZERO; window.bucket_count()];
    let mut bars = vec![IntervalBar::default(); window.bucket_count()];

    for i in 0..tape.len() {
        if let Some(b) = window.bucket_of(tape.timestamp(i)) {
            let overflow = || ExecutionError::overflow(format!("bucket {} totals", b + 1));
            price_sums[b] = price_sums[b].checked_add(tape.price(i)).ok_or_else(overflow)?;
            bars[b].volume = bars[b].volume.checked_add(tape.size(i)).ok_or_else(overflow)?;
            bars[b].trade_count += 1;
        }
    }

    for (bar, sum) in bars.iter_mut().zip(price_sums) {
        if bar.trade_count > 0 {
            bar.avg_price = sum / Decimal::from(bar.trade_count as u64);
        }
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::tape::{TickTape, TickTrade};
    use rust_decimal_macros::dec;

    fn trade(timestamp: u64, price: Decimal, size: Decimal) -> TickTrade {
        TickTrade {
            timestamp,
            price,
            size,
        }
    }

    fn small_window() -> SessionWindow {
        SessionWindow {
            start_ms: 1000,
            end_ms: 4000,
            interval_ms: 1000,
        }
    }

    #[test]
    fn test_default_window_has_thirteen_buckets() {
        let w = SessionWindow::default();
        assert_eq!(w.start_ms, 34_200_000);
        assert_eq!(w.end_ms, 57_600_000);
        assert_eq!(w.bucket_count(), 13);
    }

    #[test]
    fn test_from_times_matches_default() {
        let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        assert_eq!(SessionWindow::from_times(open, close, 30), SessionWindow::default());
    }

    #[test]
    fn test_partial_last_bucket() {
        let w = SessionWindow {
            start_ms: 0,
            end_ms: 2500,
            interval_ms: 1000,
        };
        assert_eq!(w.bucket_count(), 3);
        assert_eq!(w.bucket_of(2999), Some(2));
        assert_eq!(w.bucket_of(3000), None);
    }

    #[test]
    fn test_bucket_trades_mean_price_and_volume() {
        let tape = TickTape::new(vec![
            trade(1000, dec!(10), dec!(100)),
            trade(1500, dec!(12), dec!(300)),
            trade(3999, dec!(11), dec!(50)),
        ]);
        let bars = bucket_trades(&tape, &small_window()).unwrap();
        assert_eq!(bars.len(), 3);
        // simple mean, not volume-weighted
        assert_eq!(bars[0].avg_price, dec!(11));
        assert_eq!(bars[0].volume, dec!(400));
        assert_eq!(bars[0].trade_count, 2);
        assert_eq!(bars[2].avg_price, dec!(11));
        assert_eq!(bars[2].volume, dec!(50));
    }

    #[test]
    fn test_empty_bucket_is_zero() {
        let tape = TickTape::new(vec![trade(1200, dec!(10), dec!(100))]);
        let bars = bucket_trades(&tape, &small_window()).unwrap();
        assert_eq!(bars[1], IntervalBar::default());
        assert_eq!(bars[1].avg_price, Decimal::ZERO);
        assert_eq!(bars[1].volume, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_session_trades_ignored() {
        let tape = TickTape::new(vec![
            trade(999, dec!(10), dec!(100)),
            trade(4000, dec!(10), dec!(100)),
        ]);
        let bars = bucket_trades(&tape, &small_window()).unwrap();
        assert!(bars.iter().all(|b| b.trade_count == 0));
    }

    #[test]
    fn test_bucket_boundary_is_half_open() {
        let tape = TickTape::new(vec![trade(2000, dec!(10), dec!(7))]);
        let bars = bucket_trades(&tape, &small_window()).unwrap();
        assert_eq!(bars[0].volume, Decimal::ZERO);
        assert_eq!(bars[1].volume, dec!(7));
    }

    #[test]
    fn test_invalid_window_rejected() {
        let tape = TickTape::default();
        let w = SessionWindow {
            start_ms: 10,
            end_ms: 10,
            interval_ms: 1,
        };
        assert!(bucket_trades(&tape, &w).is_err());
    }

    #[test]
    fn test_from_clock() {
        assert_eq!(
            SessionWindow::from_clock("09:30", "16:00", 30).unwrap(),
            SessionWindow::default()
        );
        let w = SessionWindow::from_clock("10:00:00", "11:00", 5).unwrap();
        assert_eq!(w.bucket_count(), 12);
    }

    #[test]
    fn test_from_clock_bad_label_is_date_error() {
        assert!(matches!(
            SessionWindow::from_clock("9h30", "16:00", 30),
            Err(ExecutionError::DateError(_))
        ));
        assert!(matches!(
            SessionWindow::from_clock("16:00", "09:30", 30),
            Err(ExecutionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_bucket_totals_out_of_range_is_overflow() {
        let tape = TickTape::new(vec![
            trade(1000, dec!(1), Decimal::MAX),
            trade(1001, dec!(1), Decimal::MAX),
        ]);
        assert!(matches!(
            bucket_trades(&tape, &small_window()),
            Err(ExecutionError::NumericalOverflow { .. })
        ));
    }
}
