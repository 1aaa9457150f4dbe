//! Live provider data over HTTP.
//!
//! Market data comes from coingecko (listing, market cap, tickers, recent
//! prices) and ethplorer (holder count). Price histories, the native asset's
//! USD price and per-DEX liquidity come from the uniswap and sushiswap
//! subgraphs. Every request goes through the shared [`HttpClient`], so each
//! provider's rate rule holds across all assets scored in a run.
//!
//! Historical queries alias one field per block (`b<block>: ...`) and are
//! sent in chunks of [`BLOCKS_PER_QUERY`].

mod dto;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::http::HttpClient;
use crate::domain::{
    AssetAddress, AssetMetrics, PriceSeries, ProviderMetrics, ServiceName, Ticker,
};
use crate::error::{DataError, Error, Result};
use crate::port::{MarketDataSource, PriceHistorySource};

pub const COINGECKO: &str = "coingecko";
pub const UNISWAP: &str = "uniswap";
pub const SUSHISWAP: &str = "sushiswap";
pub const ETHPLORER: &str = "ethplorer";

/// Aliased block fields per subgraph query.
pub const BLOCKS_PER_QUERY: usize = 50;

const CHAIN: &str = "ethereum";
/// Recent-price window for the price-change statistic, in days.
const CHART_DAYS: &str = "0.25";
const ETHPLORER_KEY: &str = "freekey";

/// Base URL per provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub coingecko: Url,
    pub uniswap: Url,
    pub sushiswap: Url,
    pub ethplorer: Url,
}

/// Both data ports backed by live providers.
#[derive(Debug, Clone)]
pub struct LiveSource {
    http: HttpClient,
    endpoints: ProviderEndpoints,
}

impl LiveSource {
    #[must_use]
    pub fn new(http: HttpClient, endpoints: ProviderEndpoints) -> Self {
        Self { http, endpoints }
    }

    #[must_use]
    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    async fn coin(&self, asset: &AssetAddress) -> Result<dto::CoinResponse> {
        let url = self
            .endpoints
            .coingecko
            .join(&format!("coins/{CHAIN}/contract/{asset}"))?;
        self.http.get_json(&ServiceName::new(COINGECKO), &url).await
    }

    async fn chart(&self, asset: &AssetAddress) -> Result<dto::MarketChart> {
        let mut url = self
            .endpoints
            .coingecko
            .join(&format!("coins/{CHAIN}/contract/{asset}/market_chart/"))?;
        url.query_pairs_mut()
            .append_pair("vs_currency", "usd")
            .append_pair("days", CHART_DAYS);
        self.http.get_json(&ServiceName::new(COINGECKO), &url).await
    }

    async fn holders(&self, asset: &AssetAddress) -> Result<u64> {
        let mut url = self
            .endpoints
            .ethplorer
            .join(&format!("getTokenInfo/{asset}"))?;
        url.query_pairs_mut().append_pair("apiKey", ETHPLORER_KEY);
        let info: dto::TokenInfo = self.http.get_json(&ServiceName::new(ETHPLORER), &url).await?;
        Ok(info.holders_count)
    }

    /// Token-denominated liquidity on one DEX. Any failure reads as `None`.
    async fn dex_liquidity(&self, service: &'static str, url: &Url, asset: &AssetAddress) -> Option<f64> {
        let query = format!(r#"{{ token(id: "{asset}") {{ totalLiquidity }} }}"#);
        match self.graph::<dto::TokenLiquidity>(service, url, query).await {
            Ok(data) => data
                .token
                .and_then(|token| parse_decimal(&token.total_liquidity)),
            Err(e) => {
                debug!(service, asset = %asset, error = %e, "DEX liquidity unavailable");
                None
            }
        }
    }

    async fn derived_prices(
        &self,
        service: &'static str,
        url: &Url,
        asset: &AssetAddress,
        blocks: &[u64],
    ) -> Result<Vec<f64>> {
        let mut prices = Vec::with_capacity(blocks.len());
        for chunk in blocks.chunks(BLOCKS_PER_QUERY) {
            let query = aliased_query(chunk, |block| {
                format!(r#"token(id: "{asset}", block: {{ number: {block} }}) {{ derivedETH }}"#)
            });
            let data: dto::DerivedPrices = self.graph(service, url, query).await?;
            let samples = pick(&data, chunk, |p| p.derived_eth.as_str()).map_err(|block| {
                unavailable(asset, format!("{service} has no price at block {block}"))
            })?;
            prices.extend(samples);
        }
        Ok(prices)
    }

    async fn graph<T>(&self, service: &'static str, url: &Url, query: String) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let body = json!({ "query": query });
        let response: dto::GraphResponse<T> = self
            .http
            .post_json(&ServiceName::new(service), url, &body)
            .await?;
        if let Some(error) = response.errors.first() {
            return Err(Error::Provider(format!("{service}: {}", error.message)));
        }
        response
            .data
            .ok_or_else(|| Error::Provider(format!("{service} returned no data")))
    }
}

#[async_trait]
impl MarketDataSource for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn metrics(&self, asset: &AssetAddress) -> Result<AssetMetrics> {
        let (coin, chart, holders, uniswap, sushiswap) = tokio::join!(
            self.coin(asset),
            self.chart(asset),
            self.holders(asset),
            self.dex_liquidity(UNISWAP, &self.endpoints.uniswap, asset),
            self.dex_liquidity(SUSHISWAP, &self.endpoints.sushiswap, asset),
        );
        let (coin, chart, lp_addresses) = (coin?, chart?, holders?);

        let recent_prices: Vec<f64> = chart.prices.iter().map(|[_, price]| *price).collect();
        let price_usd = recent_prices
            .first()
            .copied()
            .or(coin.market_data.current_price.usd)
            .ok_or_else(|| unavailable(asset, "no USD price reported".into()))?;
        let market_cap = coin.market_data.market_cap.usd.ok_or_else(|| DataError::Unavailable {
            asset: asset.to_string(),
            metric: "market_cap",
            reason: "not reported".into(),
        })?;

        let raw = ProviderMetrics {
            symbol: coin.symbol.to_uppercase(),
            market_cap,
            fully_diluted_value: coin.market_data.fully_diluted_valuation.usd.unwrap_or_default(),
            twitter_followers: coin.community_data.twitter_followers.unwrap_or_default(),
            tickers: coin
                .tickers
                .into_iter()
                .map(|t| Ticker {
                    market: t.market.identifier,
                    trust_score: t.trust_score,
                })
                .collect(),
            dex_liquidity: vec![uniswap, sushiswap],
            price_usd,
            recent_prices,
            lp_addresses,
        };
        debug!(
            asset = %asset,
            symbol = %raw.symbol,
            tickers = raw.tickers.len(),
            samples = raw.recent_prices.len(),
            "Fetched provider metrics"
        );
        Ok(raw.into())
    }
}

#[async_trait]
impl PriceHistorySource for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn latest_block(&self) -> Result<u64> {
        let query = "{ _meta { block { number } } }".to_string();
        let data: dto::IndexedBlock = self.graph(UNISWAP, &self.endpoints.uniswap, query).await?;
        Ok(data.meta.block.number)
    }

    /// Uniswap first; sushiswap when uniswap cannot cover every block.
    async fn price_history(&self, asset: &AssetAddress, blocks: &[u64]) -> Result<PriceSeries> {
        let prices = match self
            .derived_prices(UNISWAP, &self.endpoints.uniswap, asset, blocks)
            .await
        {
            Ok(prices) => prices,
            Err(e) => {
                debug!(asset = %asset, error = %e, "Falling back to sushiswap history");
                self.derived_prices(SUSHISWAP, &self.endpoints.sushiswap, asset, blocks)
                    .await?
            }
        };
        PriceSeries::from_blocks(blocks, &prices)
    }

    async fn reference_usd(&self, blocks: &[u64]) -> Result<Vec<f64>> {
        let native = AssetAddress::native();
        let mut prices = Vec::with_capacity(blocks.len());
        for chunk in blocks.chunks(BLOCKS_PER_QUERY) {
            let query = aliased_query(chunk, |block| {
                format!(r#"bundle(id: "1", block: {{ number: {block} }}) {{ ethPrice }}"#)
            });
            let data: dto::BundlePrices = self
                .graph(UNISWAP, &self.endpoints.uniswap, query)
                .await?;
            let samples = pick(&data, chunk, |b| b.eth_price.as_str()).map_err(|block| {
                unavailable(&native, format!("{UNISWAP} has no USD price at block {block}"))
            })?;
            prices.extend(samples);
        }
        Ok(prices)
    }
}

fn unavailable(asset: &AssetAddress, reason: String) -> Error {
    DataError::Unavailable {
        asset: asset.to_string(),
        metric: "price",
        reason,
    }
    .into()
}

fn alias(block: u64) -> String {
    format!("b{block}")
}

fn aliased_query(blocks: &[u64], field: impl Fn(u64) -> String) -> String {
    let fields: Vec<String> = blocks
        .iter()
        .map(|&block| format!("{}: {}", alias(block), field(block)))
        .collect();
    format!("{{ {} }}", fields.join(" "))
}

/// Values for `blocks` in order, or the first block with no usable value.
fn pick<V>(
    data: &HashMap<String, Option<V>>,
    blocks: &[u64],
    value: impl Fn(&V) -> &str,
) -> std::result::Result<Vec<f64>, u64> {
    blocks
        .iter()
        .map(|&block| {
            data.get(&alias(block))
                .and_then(Option::as_ref)
                .map(&value)
                .and_then(parse_decimal)
                .ok_or(block)
        })
        .collect()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
