pub mod amortization;
pub mod error;
pub mod rates;
pub mod thresholds;
pub mod types;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::PropertyFinanceError;
pub use types::*;

/// Standard result type for all property-finance operations
pub type PropertyFinanceResult<T> = Result<T, PropertyFinanceError>;
