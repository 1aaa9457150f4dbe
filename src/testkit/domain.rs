//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`AssetMetrics`], [`PoolAsset`]
//! and [`PriceSeries`] so tests focus on assertions rather than
//! construction boilerplate.

use crate::application::pipeline::PoolAsset;
use crate::domain::{AssetAddress, AssetMetrics, LiquidationParameters, PriceSeries};

/// Metrics that trigger no sub-test at default liquidation parameters.
pub fn healthy_metrics(symbol: &str) -> AssetMetrics {
    AssetMetrics {
        symbol: symbol.to_string(),
        market_cap: 1_000_000_000.0,
        fully_diluted_value: 1_000_000_000.0,
        twitter_followers: 10_000,
        audited: true,
        total_liquidity: 5_000_000.0,
        lp_addresses: 1_000,
        price_change: 0.0,
    }
}

/// Liquidation parameters from plain fractions.
///
/// # Panics
///
/// Panics if either fraction is outside `[0, 1]`.
pub fn params(liquidation_incentive: f64, collateral_factor: f64) -> LiquidationParameters {
    LiquidationParameters::try_new(liquidation_incentive, collateral_factor)
        .expect("test parameters must be valid fractions")
}

/// A pool listing with the given parameters.
pub fn pool_asset(
    address: &AssetAddress,
    symbol: &str,
    liquidation_incentive: f64,
    collateral_factor: f64,
) -> PoolAsset {
    PoolAsset {
        address: address.clone(),
        symbol: symbol.to_string(),
        parameters: params(liquidation_incentive, collateral_factor),
    }
}

/// A series sampled at blocks `0, 68, 136, ...`.
///
/// # Panics
///
/// Panics if any price is not positive.
pub fn series(prices: &[f64]) -> PriceSeries {
    PriceSeries::try_new(
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u64 * 68, *p))
            .collect(),
    )
    .expect("test prices must be positive")
}

/// `n` samples starting at `start`, each `step` (a fraction) above the last.
pub fn compounding(start: f64, step: f64, n: usize) -> Vec<f64> {
    std::iter::successors(Some(start), |p| Some(p * (1.0 + step)))
        .take(n)
        .collect()
}
