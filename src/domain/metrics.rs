//! Financial signals fetched for an asset, and the helpers fetch
//! collaborators use to derive them from provider data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Market identifier excluded from the audit rule.
const SELF_LISTED_MARKET: &str = "uniswap";

/// Trust score an exchange listing must carry to count as an audit.
const TRUSTED: &str = "green";

/// Raw signals used by the risk scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    /// Token symbol as reported by the market-data provider.
    pub symbol: String,
    /// Market capitalization in USD.
    pub market_cap: f64,
    /// Fully diluted valuation in USD.
    pub fully_diluted_value: f64,
    pub twitter_followers: u64,
    /// Whether a reputable exchange lists the asset (see [`has_reputable_audit`]).
    pub audited: bool,
    /// Total DEX liquidity in USD.
    pub total_liquidity: f64,
    /// Number of liquidity-provider / holder addresses.
    pub lp_addresses: u64,
    /// Price-change statistic over the last quarter day, as a fraction.
    pub price_change: f64,
}

/// Provider observations for an asset, before derivation.
///
/// Converting into [`AssetMetrics`] applies the audit rule to `tickers`,
/// the return variance to `recent_prices` and prices the per-DEX token
/// liquidity at `price_usd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetrics {
    pub symbol: String,
    pub market_cap: f64,
    #[serde(default)]
    pub fully_diluted_value: f64,
    #[serde(default)]
    pub twitter_followers: u64,
    /// Exchange listings reported by the market-data provider.
    #[serde(default)]
    pub tickers: Vec<Ticker>,
    /// Token-denominated liquidity per DEX; `None` where a source failed.
    #[serde(default)]
    pub dex_liquidity: Vec<Option<f64>>,
    /// USD price used to value `dex_liquidity`.
    pub price_usd: f64,
    /// USD prices over the last quarter day, oldest first.
    #[serde(default)]
    pub recent_prices: Vec<f64>,
    /// Holder count from the holder-info provider.
    #[serde(default)]
    pub lp_addresses: u64,
}

impl From<ProviderMetrics> for AssetMetrics {
    fn from(raw: ProviderMetrics) -> Self {
        Self {
            audited: has_reputable_audit(&raw.tickers),
            total_liquidity: total_liquidity_usd(&raw.dex_liquidity, raw.price_usd),
            price_change: return_variance(&raw.recent_prices),
            symbol: raw.symbol,
            market_cap: raw.market_cap,
            fully_diluted_value: raw.fully_diluted_value,
            twitter_followers: raw.twitter_followers,
            lp_addresses: raw.lp_addresses,
        }
    }
}

/// One exchange listing from market-data ticker data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Exchange/market identifier, e.g. `binance`.
    pub market: String,
    /// Trust score reported for the listing, e.g. `green`.
    #[serde(default)]
    pub trust_score: Option<String>,
}

impl Ticker {
    pub fn new(market: impl Into<String>, trust_score: Option<&str>) -> Self {
        Self {
            market: market.into(),
            trust_score: trust_score.map(str::to_string),
        }
    }
}

/// An asset counts as audited when at least one distinct market other than
/// `uniswap` reports a `green` trust score.
#[must_use]
pub fn has_reputable_audit(tickers: &[Ticker]) -> bool {
    let reputable: HashSet<&str> = tickers
        .iter()
        .filter(|t| t.market != SELF_LISTED_MARKET)
        .filter(|t| t.trust_score.as_deref() == Some(TRUSTED))
        .map(|t| t.market.as_str())
        .collect();
    !reputable.is_empty()
}

/// Population variance of per-sample percentage returns.
///
/// The first sample has no predecessor and contributes a return of zero.
/// Returns zero for an empty slice.
#[must_use]
pub fn return_variance(prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    let returns: Vec<f64> = prices
        .iter()
        .enumerate()
        .map(|(i, price)| {
            if i == 0 {
                0.0
            } else {
                let prev = prices[i - 1];
                (price - prev) / prev * 100.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    returns.iter().map(|r| (mean - r).powi(2)).sum::<f64>() / n
}

/// Total liquidity in USD from per-DEX token liquidity.
///
/// Sources that could not be fetched (`None`) count as zero.
#[must_use]
pub fn total_liquidity_usd(token_liquidity: &[Option<f64>], price_usd: f64) -> f64 {
    token_liquidity.iter().flatten().sum::<f64>() * price_usd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_requires_green_non_uniswap_market() {
        let tickers = vec![
            Ticker::new("uniswap", Some("green")),
            Ticker::new("binance", Some("yellow")),
        ];
        assert!(!has_reputable_audit(&tickers));

        let tickers = vec![
            Ticker::new("uniswap", Some("green")),
            Ticker::new("binance", Some("green")),
        ];
        assert!(has_reputable_audit(&tickers));
    }

    #[test]
    fn audit_with_no_tickers_is_false() {
        assert!(!has_reputable_audit(&[]));
        assert!(!has_reputable_audit(&[Ticker::new("kraken", None)]));
    }

    #[test]
    fn variance_of_flat_prices_is_zero() {
        assert_eq!(return_variance(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(return_variance(&[]), 0.0);
    }

    #[test]
    fn variance_counts_leading_zero_return() {
        // returns: [0, 10] percent, mean 5, variance 25
        let v = return_variance(&[100.0, 110.0]);
        assert!((v - 25.0).abs() < 1e-9);
    }

    fn raw(tickers: Vec<Ticker>) -> ProviderMetrics {
        ProviderMetrics {
            symbol: "TKN".into(),
            market_cap: 5.0e8,
            fully_diluted_value: 6.0e8,
            twitter_followers: 2_000,
            tickers,
            dex_liquidity: vec![Some(1_000.0), None],
            price_usd: 300.0,
            recent_prices: vec![100.0, 110.0],
            lp_addresses: 40,
        }
    }

    #[test]
    fn derivation_runs_every_helper() {
        let metrics = AssetMetrics::from(raw(vec![Ticker::new("kraken", Some("green"))]));
        assert!(metrics.audited);
        assert_eq!(metrics.total_liquidity, 300_000.0);
        assert!((metrics.price_change - 25.0).abs() < 1e-9);
        assert_eq!(metrics.market_cap, 5.0e8);
        assert_eq!(metrics.lp_addresses, 40);
    }

    #[test]
    fn uniswap_only_listing_is_unaudited() {
        let metrics = AssetMetrics::from(raw(vec![Ticker::new("uniswap", Some("green"))]));
        assert!(!metrics.audited);
    }

    #[test]
    fn liquidity_skips_missing_sources() {
        let total = total_liquidity_usd(&[Some(1000.0), None, Some(500.0)], 2.0);
        assert_eq!(total, 3000.0);
    }
}
