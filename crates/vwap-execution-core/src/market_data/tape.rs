use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::types::Price;
use crate::ExecutionResult;

/// Read-only view of one instrument-day of tick trades.
///
/// This is the boundary to whatever archive format holds the raw trades;
/// nothing downstream depends on more than these four accessors.
pub trait TradeTape {
    fn len(&self) -> usize;

    /// Milliseconds since midnight
    fn timestamp(&self, i: usize) -> u64;

    fn price(&self, i: usize) -> Price;

    fn size(&self, i: usize) -> Decimal;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single tick trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickTrade {
    /// Milliseconds since midnight
    pub timestamp: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Price,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
}

/// In-memory trade tape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickTape {
    trades: Vec<TickTrade>,
}

impl TickTape {
    pub fn new(trades: Vec<TickTrade>) -> Self {
        Self { trades }
    }

    /// Read a `timestamp,price,size` CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> ExecutionResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let trades = rdr
            .deserialize::<TickTrade>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trades })
    }

    pub fn from_csv_path(path: &Path) -> ExecutionResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }
}

impl TradeTape for TickTape {
    fn len(&self) -> usize {
        self.trades.len()
    }

    fn timestamp(&self, i: usize) -> u64 {
        self.trades[i].timestamp
    }

    fn price(&self, i: usize) -> Price {
        self.trades[i].price
    }

    fn size(&self, i: usize) -> Decimal {
        self.trades[i].size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_reader_parses_exact_decimals() {
        let csv = "timestamp,price,size\n34200000, 10.20 ,100\n34260000,10.1,250\n";
        let tape = TickTape::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(tape.len(), 2);
        assert_eq!(tape.timestamp(0), 34_200_000);
        assert_eq!(tape.price(0), dec!(10.20));
        assert_eq!(tape.size(1), dec!(250));
    }

    #[test]
    fn test_from_reader_empty_file() {
        let tape = TickTape::from_reader("timestamp,price,size\n".as_bytes()).unwrap();
        assert!(tape.is_empty());
    }

    #[test]
    fn test_from_reader_bad_price_is_error() {
        let csv = "timestamp,price,size\n34200000,abc,100\n";
        assert!(TickTape::from_reader(csv.as_bytes()).is_err());
    }
}
