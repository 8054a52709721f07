use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Length mismatch: {field} has {actual} elements, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numerical overflow in {context}")]
    NumericalOverflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ExecutionError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        ExecutionError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        ExecutionError::NumericalOverflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for ExecutionError {
    fn from(e: serde_json::Error) -> Self {
        ExecutionError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "market_data")]
impl From<csv::Error> for ExecutionError {
    fn from(e: csv::Error) -> Self {
        ExecutionError::Csv(e.to_string())
    }
}
