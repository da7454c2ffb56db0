pub mod error;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

pub use error::ReitDcfError;
pub use types::*;

/// Standard result type for all reit-dcf operations
pub type ReitDcfResult<T> = Result<T, ReitDcfError>;
