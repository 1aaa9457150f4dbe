//! Live provider source against local stand-ins for each provider.

mod support;

use std::sync::Arc;

use lendscore::adapter::outbound::{HttpClient, LiveSource, ProviderEndpoints};
use lendscore::application::dispatcher::{Dispatcher, RuleTable};
use lendscore::application::pipeline::ScoringPipeline;
use lendscore::domain::{AssetAddress, OverrideMode, PoolId, SubScore};
use lendscore::infrastructure::config::overrides::parse_overrides;
use lendscore::port::{MarketDataSource, PriceHistorySource};
use lendscore::testkit::config::{rule, short_backtest};
use lendscore::testkit::domain::pool_asset;
use support::fixtures::TOKEN;
use support::server::{response, serve_routes, ScriptedServer};

fn ok(body: &str) -> String {
    response("200 OK", &[], body)
}

const COIN: &str = r#"{
    "symbol": "uni",
    "market_data": {
        "market_cap": { "usd": 1.0e9 },
        "current_price": { "usd": 990.0 },
        "fully_diluted_valuation": { "usd": 1.0e9 }
    },
    "tickers": [{ "market": { "identifier": "uniswap" }, "trust_score": "green" }],
    "community_data": { "twitter_followers": 10000 }
}"#;

const CHART: &str = r#"{ "prices": [[0.0, 1000.0], [1.0, 1000.0], [2.0, 1000.0]] }"#;

const PRICES: &str = r#"{ "data": {
    "b7": { "derivedETH": "0.05" },
    "b8": { "derivedETH": "0.045" },
    "b9": { "derivedETH": "0.04" },
    "b10": { "derivedETH": "0.035" }
} }"#;

const GAPPED_PRICES: &str = r#"{ "data": {
    "b7": { "derivedETH": "0.05" },
    "b8": null,
    "b9": { "derivedETH": "0.04" },
    "b10": { "derivedETH": "0.035" }
} }"#;

const ETH_PRICES: &str = r#"{ "data": {
    "b7": { "ethPrice": "2000" },
    "b8": { "ethPrice": "2000" },
    "b9": { "ethPrice": "2000" },
    "b10": { "ethPrice": "2000" }
} }"#;

struct Providers {
    coingecko: ScriptedServer,
    uniswap: ScriptedServer,
    sushiswap: ScriptedServer,
    ethplorer: ScriptedServer,
}

impl Providers {
    /// Coingecko lists the token on uniswap only; sushiswap answers
    /// nothing but 404s.
    async fn start(uniswap_prices: &str, sushiswap: Vec<(&'static str, String)>) -> Self {
        Self {
            coingecko: serve_routes(vec![("market_chart", ok(CHART)), ("/contract/", ok(COIN))]).await,
            uniswap: serve_routes(vec![
                ("totalLiquidity", ok(r#"{"data":{"token":{"totalLiquidity":"2500"}}}"#)),
                ("_meta", ok(r#"{"data":{"_meta":{"block":{"number":12}}}}"#)),
                ("derivedETH", ok(uniswap_prices)),
                ("ethPrice", ok(ETH_PRICES)),
            ])
            .await,
            sushiswap: serve_routes(sushiswap).await,
            ethplorer: serve_routes(vec![("getTokenInfo", ok(r#"{"holdersCount":1000}"#))]).await,
        }
    }

    fn source(&self) -> Arc<LiveSource> {
        let rules = ["coingecko", "uniswap", "sushiswap", "ethplorer"]
            .into_iter()
            .fold(RuleTable::new(), |table, service| {
                table.with(service, rule(100, 1_000, 1))
            });
        let http = HttpClient::new(Dispatcher::new(rules)).unwrap();
        Arc::new(LiveSource::new(
            http,
            ProviderEndpoints {
                coingecko: self.coingecko.url.clone(),
                uniswap: self.uniswap.url.clone(),
                sushiswap: self.sushiswap.url.clone(),
                ethplorer: self.ethplorer.url.clone(),
            },
        ))
    }
}

#[tokio::test]
async fn metrics_combine_every_provider() {
    let providers = Providers::start(PRICES, vec![]).await;

    let metrics = providers
        .source()
        .metrics(&AssetAddress::new(TOKEN))
        .await
        .unwrap();

    assert_eq!(metrics.symbol, "UNI");
    assert_eq!(metrics.market_cap, 1.0e9);
    assert_eq!(metrics.twitter_followers, 10_000);
    assert_eq!(metrics.lp_addresses, 1000);
    // Only uniswap lists it, and sushiswap's failure counts as no liquidity.
    assert!(!metrics.audited);
    assert_eq!(metrics.total_liquidity, 2500.0 * 1000.0);
    assert_eq!(metrics.price_change, 0.0);
    assert!(providers.sushiswap.hits() >= 1);
}

#[tokio::test]
async fn missing_holder_count_fails_metrics() {
    let mut providers = Providers::start(PRICES, vec![]).await;
    providers.ethplorer = serve_routes(vec![]).await;

    let result = providers.source().metrics(&AssetAddress::new(TOKEN)).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn chain_head_and_reference_prices_come_from_uniswap() {
    let providers = Providers::start(PRICES, vec![]).await;
    let source = providers.source();

    assert_eq!(source.latest_block().await.unwrap(), 12);
    assert_eq!(source.reference_usd(&[7, 8]).await.unwrap(), vec![2000.0, 2000.0]);
    assert!(source.reference_usd(&[6]).await.is_err());
}

#[tokio::test]
async fn history_gap_on_uniswap_falls_back_to_sushiswap() {
    let sushiswap_prices = r#"{ "data": {
        "b7": { "derivedETH": "0.06" },
        "b8": { "derivedETH": "0.05" },
        "b9": { "derivedETH": "0.04" },
        "b10": { "derivedETH": "0.03" }
    } }"#;
    let providers = Providers::start(GAPPED_PRICES, vec![("derivedETH", ok(sushiswap_prices))]).await;

    let series = providers
        .source()
        .price_history(&AssetAddress::new(TOKEN), &[7, 8, 9, 10])
        .await
        .unwrap();

    assert_eq!(series.prices(), vec![0.06, 0.05, 0.04, 0.03]);
}

#[tokio::test]
async fn history_gap_on_both_exchanges_is_unavailable() {
    let providers = Providers::start(GAPPED_PRICES, vec![("derivedETH", ok(GAPPED_PRICES))]).await;

    let err = providers
        .source()
        .price_history(&AssetAddress::new(TOKEN), &[7, 8, 9, 10])
        .await
        .unwrap_err();

    assert!(err.to_string().contains("sushiswap has no price at block 8"), "{err}");
}

#[tokio::test]
async fn live_pool_scores_end_to_end() {
    let providers = Providers::start(PRICES, vec![]).await;
    let source = providers.source();
    let overrides = parse_overrides("", OverrideMode::Numeric).unwrap();
    let pipeline = ScoringPipeline::new(source.clone(), source, Arc::new(overrides))
        .with_plan(short_backtest());

    let token = pool_asset(&AssetAddress::new(TOKEN), "UNI", 0.5, 0.1);
    let pool = pipeline.score_pool(PoolId::new("6"), &[token]).await;

    let score = &pool.scores[0];
    assert_eq!(score.address.as_str(), TOKEN);
    assert_eq!(score.score.crash, SubScore::Scored(1));
    let token_down = score.info.token_down.unwrap();
    assert!((token_down - 0.0625).abs() < 1e-9, "{token_down}");
}
