//! Historical price samples keyed by block index.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use crate::error::{DataError, Result};

/// One sampled price at a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub block: u64,
    pub price: f64,
}

/// An ordered sequence of `(block, price)` samples.
///
/// Blocks are strictly increasing and every price is finite and positive.
/// Gaps are not representable: missing data is a fetch failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    /// Build a series, validating ordering and price positivity.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::BlocksNotIncreasing`] or
    /// [`DomainError::NonPositivePrice`] when an invariant is violated.
    pub fn try_new(samples: Vec<(u64, f64)>) -> std::result::Result<Self, DomainError> {
        let mut previous: Option<u64> = None;
        for &(block, price) in &samples {
            if let Some(previous) = previous {
                if block <= previous {
                    return Err(DomainError::BlocksNotIncreasing { previous, block });
                }
            }
            if !price.is_finite() || price <= 0.0 {
                return Err(DomainError::NonPositivePrice { block, price });
            }
            previous = Some(block);
        }

        Ok(Self {
            samples: samples
                .into_iter()
                .map(|(block, price)| PriceSample { block, price })
                .collect(),
        })
    }

    /// Pair queried blocks with the prices a provider returned for them.
    ///
    /// # Errors
    ///
    /// Fails when the provider returned a different number of prices than
    /// blocks requested, or when the samples violate series invariants.
    pub fn from_blocks(blocks: &[u64], prices: &[f64]) -> Result<Self> {
        if blocks.len() != prices.len() {
            return Err(DataError::LengthMismatch {
                expected: blocks.len(),
                actual: prices.len(),
            }
            .into());
        }
        let samples = blocks.iter().copied().zip(prices.iter().copied()).collect();
        Ok(Self::try_new(samples)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    /// Prices in block order.
    #[must_use]
    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    /// Block indices in order.
    #[must_use]
    pub fn blocks(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.block).collect()
    }

    /// Convert a ratio-denominated series (priced in the reference asset)
    /// to USD using the reference asset's USD price at the same blocks.
    ///
    /// # Errors
    ///
    /// Fails when `reference_usd` does not cover every sample, or when a
    /// converted price is not positive.
    pub fn to_usd(&self, reference_usd: &[f64]) -> Result<Self> {
        if reference_usd.len() != self.samples.len() {
            return Err(DataError::LengthMismatch {
                expected: self.samples.len(),
                actual: reference_usd.len(),
            }
            .into());
        }
        let converted = self
            .samples
            .iter()
            .zip(reference_usd)
            .map(|(s, usd)| (s.block, s.price * usd))
            .collect();
        Ok(Self::try_new(converted)?)
    }

    /// Cheap volatility proxy: `max / min - 1` across the series.
    ///
    /// Zero for series with fewer than two samples.
    #[must_use]
    pub fn swing(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.price), hi.max(s.price))
            });
        max / min - 1.0
    }
}
