//! Recorded pool data read from a JSON file.
//!
//! Lets a pool be scored offline and reproducibly. A snapshot carries the
//! pool's listing, per-address provider observations and ratio price
//! histories, and the reference asset's USD prices:
//!
//! ```json
//! {
//!   "pool_id": "6",
//!   "latest_block": 12,
//!   "assets": [
//!     { "address": "0xaaa", "symbol": "AAA",
//!       "parameters": { "liquidation_incentive": 0.15, "collateral_factor": 0.75 } }
//!   ],
//!   "metrics": {
//!     "0xaaa": {
//!       "symbol": "AAA", "market_cap": 1.0e9, "fully_diluted_value": 1.0e9,
//!       "twitter_followers": 10000, "lp_addresses": 1000,
//!       "tickers": [{ "market": "binance", "trust_score": "green" }],
//!       "dex_liquidity": [2500.0, null], "price_usd": 2000.0,
//!       "recent_prices": [2000.0, 2010.0, 1995.0]
//!     }
//!   },
//!   "prices": { "0xaaa": { "7": 0.05, "8": 0.045 } },
//!   "reference_usd": { "7": 2000.0, "8": 2000.0 }
//! }
//! ```
//!
//! `parameters` may be omitted per asset, in which case the configured
//! defaults apply. Audit status, total liquidity and the price-change
//! statistic are derived from the observations when metrics are served.
//! Anything absent from the file is reported as unavailable.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::application::pipeline::PoolAsset;
use crate::domain::{
    AssetAddress, AssetMetrics, LiquidationParameters, PoolId, PriceSeries, ProviderMetrics,
};
use crate::error::{DataError, Error, Result};
use crate::port::{MarketDataSource, PriceHistorySource};

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    pool_id: String,
    latest_block: u64,
    assets: Vec<RawAsset>,
    #[serde(default)]
    metrics: HashMap<String, ProviderMetrics>,
    #[serde(default)]
    prices: HashMap<String, BTreeMap<u64, f64>>,
    #[serde(default)]
    reference_usd: BTreeMap<u64, f64>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    address: String,
    symbol: String,
    #[serde(default)]
    parameters: Option<LiquidationParameters>,
}

/// An in-memory pool snapshot implementing both data ports.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    pool_id: PoolId,
    latest_block: u64,
    assets: Vec<PoolAsset>,
    metrics: HashMap<AssetAddress, ProviderMetrics>,
    prices: HashMap<AssetAddress, BTreeMap<u64, f64>>,
    reference_usd: BTreeMap<u64, f64>,
}

impl SnapshotSource {
    /// Read a snapshot file. Assets without parameters get `defaults`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid snapshot.
    pub fn load<P: AsRef<Path>>(path: P, defaults: LiquidationParameters) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let snapshot = Self::parse_json(&content, defaults)?;
        info!(
            path = %path.as_ref().display(),
            pool_id = %snapshot.pool_id,
            assets = snapshot.assets.len(),
            latest_block = snapshot.latest_block,
            "Loaded pool snapshot"
        );
        Ok(snapshot)
    }

    /// Parse snapshot JSON.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or out-of-range liquidation parameters.
    pub fn parse_json(content: &str, defaults: LiquidationParameters) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(content)?;
        Ok(Self {
            pool_id: PoolId::new(raw.pool_id),
            latest_block: raw.latest_block,
            assets: raw
                .assets
                .into_iter()
                .map(|a| PoolAsset {
                    address: AssetAddress::new(a.address),
                    symbol: a.symbol,
                    parameters: a.parameters.unwrap_or(defaults),
                })
                .collect(),
            metrics: raw
                .metrics
                .into_iter()
                .map(|(k, v)| (AssetAddress::new(k), v))
                .collect(),
            prices: raw
                .prices
                .into_iter()
                .map(|(k, v)| (AssetAddress::new(k), v))
                .collect(),
            reference_usd: raw.reference_usd,
        })
    }

    #[must_use]
    pub fn pool_id(&self) -> &PoolId {
        &self.pool_id
    }

    /// The pool's listed assets, in file order.
    #[must_use]
    pub fn assets(&self) -> &[PoolAsset] {
        &self.assets
    }
}

fn unavailable(asset: &AssetAddress, metric: &'static str, reason: String) -> Error {
    DataError::Unavailable {
        asset: asset.to_string(),
        metric,
        reason,
    }
    .into()
}

fn samples_at(
    table: &BTreeMap<u64, f64>,
    asset: &AssetAddress,
    blocks: &[u64],
) -> Result<Vec<f64>> {
    blocks
        .iter()
        .map(|block| {
            table.get(block).copied().ok_or_else(|| {
                unavailable(asset, "price", format!("snapshot has no sample at block {block}"))
            })
        })
        .collect()
}

#[async_trait]
impl MarketDataSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn metrics(&self, asset: &AssetAddress) -> Result<AssetMetrics> {
        self.metrics
            .get(asset)
            .cloned()
            .map(AssetMetrics::from)
            .ok_or_else(|| unavailable(asset, "metrics", "not in snapshot".into()))
    }
}

#[async_trait]
impl PriceHistorySource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn latest_block(&self) -> Result<u64> {
        Ok(self.latest_block)
    }

    async fn price_history(&self, asset: &AssetAddress, blocks: &[u64]) -> Result<PriceSeries> {
        let table = self
            .prices
            .get(asset)
            .ok_or_else(|| unavailable(asset, "price", "not in snapshot".into()))?;
        let prices = samples_at(table, asset, blocks)?;
        PriceSeries::from_blocks(blocks, &prices)
    }

    async fn reference_usd(&self, blocks: &[u64]) -> Result<Vec<f64>> {
        samples_at(&self.reference_usd, &AssetAddress::native(), blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "pool_id": "6",
        "latest_block": 12,
        "assets": [
            { "address": "0xAAA", "symbol": "AAA" },
            { "address": "0xbbb", "symbol": "BBB",
              "parameters": { "liquidation_incentive": 0.5, "collateral_factor": 0.1 } }
        ],
        "metrics": {
            "0xaaa": {
                "symbol": "AAA", "market_cap": 1.0e9, "fully_diluted_value": 1.0e9,
                "twitter_followers": 10000, "lp_addresses": 1000,
                "tickers": [
                    { "market": "uniswap", "trust_score": "green" },
                    { "market": "binance", "trust_score": "green" }
                ],
                "dex_liquidity": [2000.0, null], "price_usd": 2500.0,
                "recent_prices": [10.0, 10.0, 10.0]
            },
            "0xccc": {
                "symbol": "CCC", "market_cap": 1.0e7, "price_usd": 1.0,
                "tickers": [{ "market": "uniswap", "trust_score": "green" }]
            }
        },
        "prices": { "0xAAA": { "9": 0.5, "10": 0.4 } },
        "reference_usd": { "9": 2000.0, "10": 2100.0 }
    }"#;

    #[test]
    fn parses_listing_with_default_parameters() {
        let snapshot = SnapshotSource::parse_json(SNAPSHOT, LiquidationParameters::default()).unwrap();
        assert_eq!(snapshot.pool_id().as_str(), "6");
        assert_eq!(snapshot.assets().len(), 2);
        assert_eq!(snapshot.assets()[0].address.as_str(), "0xaaa");
        assert_eq!(snapshot.assets()[0].parameters, LiquidationParameters::default());
        assert_eq!(snapshot.assets()[1].parameters.collateral_factor(), 0.1);
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let bad = SNAPSHOT.replace("0.5,", "1.5,");
        assert!(SnapshotSource::parse_json(&bad, LiquidationParameters::default()).is_err());
    }

    #[tokio::test]
    async fn serves_prices_for_requested_blocks() {
        let snapshot = SnapshotSource::parse_json(SNAPSHOT, LiquidationParameters::default()).unwrap();
        let asset = AssetAddress::new("0xaaa");

        let series = snapshot.price_history(&asset, &[9, 10]).await.unwrap();
        assert_eq!(series.prices(), vec![0.5, 0.4]);
        assert_eq!(snapshot.reference_usd(&[9, 10]).await.unwrap(), vec![2000.0, 2100.0]);

        let err = snapshot.price_history(&asset, &[8, 9]).await.unwrap_err();
        assert!(matches!(err, Error::Data(DataError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn metrics_are_derived_from_observations() {
        let snapshot = SnapshotSource::parse_json(SNAPSHOT, LiquidationParameters::default()).unwrap();

        let aaa = snapshot.metrics(&AssetAddress::new("0xaaa")).await.unwrap();
        assert!(aaa.audited);
        assert_eq!(aaa.total_liquidity, 5.0e6);
        assert_eq!(aaa.price_change, 0.0);

        // A green listing on uniswap alone is not an audit.
        let ccc = snapshot.metrics(&AssetAddress::new("0xccc")).await.unwrap();
        assert!(!ccc.audited);
        assert_eq!(ccc.total_liquidity, 0.0);
        assert_eq!(ccc.lp_addresses, 0);
    }

    #[tokio::test]
    async fn missing_metrics_are_unavailable() {
        let snapshot = SnapshotSource::parse_json(SNAPSHOT, LiquidationParameters::default()).unwrap();
        let err = snapshot.metrics(&AssetAddress::new("0xbbb")).await.unwrap_err();
        assert!(err.to_string().contains("metrics unavailable"));
    }
}
