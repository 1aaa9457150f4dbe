//! In-memory data source for pipeline tests.
//!
//! [`ScriptedSource`] implements both outbound data ports from fixed tables.
//! Anything not scripted is reported as unavailable, the same way a live
//! provider miss would be.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{AssetAddress, AssetMetrics, PriceSeries};
use crate::error::{DataError, Error, Result};
use crate::port::{MarketDataSource, PriceHistorySource};

/// Scripted metrics and prices keyed by address and block.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    latest_block: Option<u64>,
    metrics: HashMap<AssetAddress, AssetMetrics>,
    prices: HashMap<AssetAddress, BTreeMap<u64, f64>>,
    reference: BTreeMap<u64, f64>,
    metric_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(latest_block: u64) -> Self {
        Self {
            latest_block: Some(latest_block),
            ..Self::default()
        }
    }

    /// Make [`latest_block`](PriceHistorySource::latest_block) fail.
    #[must_use]
    pub fn without_head(mut self) -> Self {
        self.latest_block = None;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, asset: &AssetAddress, metrics: AssetMetrics) -> Self {
        self.metrics.insert(asset.clone(), metrics);
        self
    }

    #[must_use]
    pub fn with_prices(mut self, asset: &AssetAddress, blocks: &[u64], prices: &[f64]) -> Self {
        self.prices
            .insert(asset.clone(), blocks.iter().copied().zip(prices.iter().copied()).collect());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, blocks: &[u64], usd: &[f64]) -> Self {
        self.reference = blocks.iter().copied().zip(usd.iter().copied()).collect();
        self
    }

    /// How many times metrics were requested.
    pub fn metric_calls(&self) -> usize {
        self.metric_calls.load(Ordering::SeqCst)
    }
}

fn unavailable(asset: &str, metric: &'static str, reason: impl Into<String>) -> Error {
    DataError::Unavailable {
        asset: asset.to_string(),
        metric,
        reason: reason.into(),
    }
    .into()
}

fn lookup(table: &BTreeMap<u64, f64>, asset: &str, blocks: &[u64]) -> Result<Vec<f64>> {
    blocks
        .iter()
        .map(|block| {
            table
                .get(block)
                .copied()
                .ok_or_else(|| unavailable(asset, "price", format!("no sample at block {block}")))
        })
        .collect()
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn metrics(&self, asset: &AssetAddress) -> Result<AssetMetrics> {
        self.metric_calls.fetch_add(1, Ordering::SeqCst);
        self.metrics
            .get(asset)
            .cloned()
            .ok_or_else(|| unavailable(asset.as_str(), "metrics", "not scripted"))
    }
}

#[async_trait]
impl PriceHistorySource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn latest_block(&self) -> Result<u64> {
        self.latest_block
            .ok_or_else(|| Error::Provider("chain head unavailable".into()))
    }

    async fn price_history(&self, asset: &AssetAddress, blocks: &[u64]) -> Result<PriceSeries> {
        let table = self
            .prices
            .get(asset)
            .ok_or_else(|| unavailable(asset.as_str(), "price", "not scripted"))?;
        let prices = lookup(table, asset.as_str(), blocks)?;
        PriceSeries::from_blocks(blocks, &prices)
    }

    async fn reference_usd(&self, blocks: &[u64]) -> Result<Vec<f64>> {
        lookup(&self.reference, "reference", blocks)
    }
}
