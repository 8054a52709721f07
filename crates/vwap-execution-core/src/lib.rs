pub mod error;
pub mod types;

#[cfg(feature = "execution")]
pub mod execution;

#[cfg(feature = "market_data")]
pub mod market_data;

pub use error::ExecutionError;
pub use types::*;

/// Standard result type for all vwap-execution operations
pub type ExecutionResult<T> = Result<T, ExecutionError>;
