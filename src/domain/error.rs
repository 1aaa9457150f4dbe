//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `try_new` constructors that validate inputs.
//!
//! # Examples
//!
//! ```
//! use lendscore::domain::error::DomainError;
//! use lendscore::domain::price::PriceSeries;
//!
//! // Blocks must be strictly increasing
//! let result = PriceSeries::try_new(vec![(10, 1.0), (10, 1.1)]);
//! assert!(matches!(result, Err(DomainError::BlocksNotIncreasing { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Block indices of a price series must be strictly increasing.
    #[error("block {block} does not follow block {previous}")]
    BlocksNotIncreasing {
        /// The block preceding the offending sample.
        previous: u64,
        /// The offending block.
        block: u64,
    },

    /// Prices must be finite and strictly positive.
    #[error("price at block {block} must be positive, got {price}")]
    NonPositivePrice {
        /// Block of the offending sample.
        block: u64,
        /// The invalid price.
        price: f64,
    },

    /// Liquidation parameters are fractions in `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    FractionOutOfRange {
        /// The parameter name.
        field: &'static str,
        /// The invalid value.
        value: f64,
    },
}
