//! Per-asset scoring pipeline and pool aggregation.
//!
//! For each asset the pipeline resolves override remaps, short-circuits the
//! base asset, fetches metrics and a price history through the outbound
//! ports, converts the history to USD, runs the backtest if the series is
//! volatile enough, and scores the result. Any data failure degrades only
//! that asset to unscored.
//!
//! A remapped asset is scored entirely as its underlying: data and test
//! overrides both follow the resolved address. The record keeps the listed
//! address and symbol so a pool's scores stay keyed by its own listing.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backtest::BacktestPlan;
use super::scorer;
use crate::domain::{
    AssetAddress, AssetInfo, AssetScore, LiquidationParameters, OverrideTable, PoolId, PoolScore,
};
use crate::error::Result;
use crate::port::{MarketDataSource, PriceHistorySource};

/// An asset as listed in a lending pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolAsset {
    pub address: AssetAddress,
    pub symbol: String,
    pub parameters: LiquidationParameters,
}

/// Drives data fetch, backtest and scoring for the assets of a pool.
pub struct ScoringPipeline {
    market: Arc<dyn MarketDataSource>,
    history: Arc<dyn PriceHistorySource>,
    overrides: Arc<OverrideTable>,
    plan: BacktestPlan,
    base_asset: AssetAddress,
}

impl ScoringPipeline {
    /// Create a pipeline with the default backtest plan, treating the
    /// native asset as the base asset.
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        history: Arc<dyn PriceHistorySource>,
        overrides: Arc<OverrideTable>,
    ) -> Self {
        Self {
            market,
            history,
            overrides,
            plan: BacktestPlan::default(),
            base_asset: AssetAddress::native(),
        }
    }

    #[must_use]
    pub fn with_plan(mut self, plan: BacktestPlan) -> Self {
        self.plan = plan;
        self
    }

    /// The asset that always receives the fixed all-zero record.
    #[must_use]
    pub fn with_base_asset(mut self, base_asset: AssetAddress) -> Self {
        self.base_asset = base_asset;
        self
    }

    /// Score every asset of a pool concurrently and aggregate.
    ///
    /// Never fails: if even the chain head cannot be read, every asset is
    /// unscored except the base asset.
    pub async fn score_pool(&self, pool_id: PoolId, assets: &[PoolAsset]) -> PoolScore {
        let latest = match self.history.latest_block().await {
            Ok(block) => Some(block),
            Err(e) => {
                warn!(
                    pool_id = %pool_id,
                    source = self.history.name(),
                    error = %e,
                    "Failed to read latest block"
                );
                None
            }
        };

        let scores = join_all(assets.iter().map(|asset| self.score_asset_at(asset, latest))).await;
        let multisig = self.overrides.multisig(&pool_id);
        let pool = PoolScore::new(pool_id, multisig, scores, Utc::now());

        info!(
            pool_id = %pool.pool_id,
            assets = pool.scores.len(),
            unscored = pool.scores.iter().filter(|s| !s.score.overall.is_scored()).count(),
            overall = %pool.overall,
            multisig,
            "Pool scored"
        );
        pool
    }

    /// Score one asset against the given chain head.
    pub async fn score_asset(&self, asset: &PoolAsset, latest_block: u64) -> AssetScore {
        self.score_asset_at(asset, Some(latest_block)).await
    }

    async fn score_asset_at(&self, asset: &PoolAsset, latest_block: Option<u64>) -> AssetScore {
        let resolved = self.overrides.resolve_address(&asset.address);
        if resolved == self.base_asset {
            debug!(asset = %asset.address, "Base asset, using safe score");
            return AssetScore::safe(asset.address.clone(), &asset.symbol);
        }

        let Some(latest_block) = latest_block else {
            return AssetScore::unscored(asset.address.clone(), &asset.symbol);
        };

        match self.try_score(asset, &resolved, latest_block).await {
            Ok(score) => score,
            Err(e) => {
                warn!(
                    asset = %asset.address,
                    resolved = %resolved,
                    symbol = %asset.symbol,
                    error = %e,
                    "Asset unscored"
                );
                AssetScore::unscored(asset.address.clone(), &asset.symbol)
            }
        }
    }

    async fn try_score(
        &self,
        asset: &PoolAsset,
        resolved: &AssetAddress,
        latest_block: u64,
    ) -> Result<AssetScore> {
        let blocks = self.plan.schedule.blocks(latest_block);
        let (metrics, ratio, reference) = tokio::try_join!(
            self.market.metrics(resolved),
            self.history.price_history(resolved, &blocks),
            self.history.reference_usd(&blocks),
        )?;
        let usd = ratio.to_usd(&reference)?;

        let params = asset.parameters;
        let backtest = self.plan.run(&usd, &params);
        let tests = self.overrides.tests_for(resolved);
        let score = scorer::score(&metrics, &params, backtest, &tests);

        debug!(
            asset = %asset.address,
            samples = usd.len(),
            token_down = ?backtest.map(|b| b.token_down),
            overall = %score.overall,
            "Asset pipeline complete"
        );

        Ok(AssetScore {
            address: asset.address.clone(),
            symbol: asset.symbol.clone(),
            score,
            info: AssetInfo {
                collateral_factor: Some(params.collateral_factor()),
                token_down: backtest.map(|b| b.token_down),
                market_cap: Some(metrics.market_cap),
            },
        })
    }
}

impl std::fmt::Debug for ScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPipeline")
            .field("market", &self.market.name())
            .field("history", &self.history.name())
            .field("plan", &self.plan)
            .field("base_asset", &self.base_asset)
            .finish()
    }
}
