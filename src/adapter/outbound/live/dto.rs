//! Provider response shapes.
//!
//! Only the fields the scorer reads are modeled. Subgraph decimals arrive
//! as strings and are parsed by the caller.

use std::collections::HashMap;

use serde::Deserialize;

/// `GET coins/ethereum/contract/{address}`.
#[derive(Debug, Deserialize)]
pub struct CoinResponse {
    pub symbol: String,
    pub market_data: MarketData,
    #[serde(default)]
    pub tickers: Vec<CoinTicker>,
    #[serde(default)]
    pub community_data: CommunityData,
}

#[derive(Debug, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub market_cap: UsdValue,
    #[serde(default)]
    pub current_price: UsdValue,
    #[serde(default)]
    pub fully_diluted_valuation: UsdValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsdValue {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CoinTicker {
    pub market: TickerMarket,
    #[serde(default)]
    pub trust_score: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TickerMarket {
    pub identifier: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommunityData {
    #[serde(default)]
    pub twitter_followers: Option<u64>,
}

/// `GET coins/ethereum/contract/{address}/market_chart/`.
///
/// Each entry is `[timestamp_ms, price]`.
#[derive(Debug, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
}

/// `GET getTokenInfo/{address}`.
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    #[serde(rename = "holdersCount", default)]
    pub holders_count: u64,
}

/// GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct GraphResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenLiquidity {
    pub token: Option<TokenLiquidityFields>,
}

#[derive(Debug, Deserialize)]
pub struct TokenLiquidityFields {
    #[serde(rename = "totalLiquidity")]
    pub total_liquidity: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexedBlock {
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

#[derive(Debug, Deserialize)]
pub struct Meta {
    pub block: BlockNumber,
}

#[derive(Debug, Deserialize)]
pub struct BlockNumber {
    pub number: u64,
}

/// Aliased per-block token prices, keyed `b<block>`.
pub type DerivedPrices = HashMap<String, Option<DerivedEth>>;

#[derive(Debug, Deserialize)]
pub struct DerivedEth {
    #[serde(rename = "derivedETH")]
    pub derived_eth: String,
}

/// Aliased per-block native-asset USD prices, keyed `b<block>`.
pub type BundlePrices = HashMap<String, Option<Bundle>>;

#[derive(Debug, Deserialize)]
pub struct Bundle {
    #[serde(rename = "ethPrice")]
    pub eth_price: String,
}
