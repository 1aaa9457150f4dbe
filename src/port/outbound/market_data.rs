//! Data-fetch ports consumed by the scoring pipeline.

use async_trait::async_trait;

use crate::domain::{AssetAddress, AssetMetrics, PriceSeries};
use crate::error::Result;

/// Source of per-asset financial metrics.
///
/// # Errors
///
/// Implementations return [`DataError::Unavailable`](crate::error::DataError)
/// when a required metric cannot be obtained. The pipeline treats any error
/// as "asset unscored".
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Fetch every metric the scorer needs for `asset`.
    async fn metrics(&self, asset: &AssetAddress) -> Result<AssetMetrics>;
}

/// Source of historical prices.
///
/// Histories are denominated as a ratio to the chain's native asset;
/// [`reference_usd`](Self::reference_usd) supplies the native asset's USD
/// price at the same blocks for conversion.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Most recent block known to the source.
    async fn latest_block(&self) -> Result<u64>;

    /// Price of `asset` at each of `blocks`, in native-asset units.
    ///
    /// # Errors
    ///
    /// Fails if any requested block is unavailable. Gaps are never filled.
    async fn price_history(&self, asset: &AssetAddress, blocks: &[u64]) -> Result<PriceSeries>;

    /// USD price of the native asset at each of `blocks`, in order.
    async fn reference_usd(&self, blocks: &[u64]) -> Result<Vec<f64>>;
}
