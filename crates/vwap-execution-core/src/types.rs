use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share counts. Signed: positive = shares to sell, negative = shares to buy.
pub type Shares = Decimal;

/// Prices and price-unit volatility.
pub type Price = Decimal;

/// Fractions of daily volume (0.25 = a quarter of the day's volume).
pub type Fraction = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_metadata_fills_envelope() {
        let out = with_metadata(
            "Test methodology",
            &serde_json::json!({ "n": 3 }),
            vec!["note".into()],
            42,
            Decimal::ONE,
        );
        assert_eq!(out.result, Decimal::ONE);
        assert_eq!(out.methodology, "Test methodology");
        assert_eq!(out.assumptions["n"], 3);
        assert_eq!(out.warnings, vec!["note".to_string()]);
        assert_eq!(out.metadata.computation_time_us, 42);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
