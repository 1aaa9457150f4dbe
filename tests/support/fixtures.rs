//! File fixtures shared by CLI and config tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map};

pub const TOKEN: &str = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";
pub const RISKY: &str = "0x95ad61b0a150d79219dcf64e1e6cc01f0b64c4ce";
pub const WRAPPED_ETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
pub const NATIVE: &str = "0x0000000000000000000000000000000000000000";

pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn healthy(symbol: &str) -> serde_json::Value {
    json!({
        "symbol": symbol,
        "market_cap": 1.0e9,
        "fully_diluted_value": 1.0e9,
        "twitter_followers": 10000,
        "lp_addresses": 1000,
        "tickers": [{ "market": "binance", "trust_score": "green" }],
        "dex_liquidity": [2500.0, 2500.0],
        "price_usd": 1000.0,
        "recent_prices": [1000.0, 1000.0, 1000.0]
    })
}

/// A pool of four assets at latest block 12 (history blocks 7..=10):
///
/// - `TOKEN`: healthy, falling ratio prices, backtest runs
/// - `RISKY`: thin liquidity, few holders, listed only on uniswap
/// - `WRAPPED_ETH`: no data of its own
/// - `NATIVE`: the base asset
pub fn pool_snapshot() -> String {
    let mut metrics = Map::new();
    metrics.insert(TOKEN.into(), healthy("UNI"));
    metrics.insert(
        RISKY.into(),
        json!({
            "symbol": "SHIB",
            "market_cap": 20.0e6,
            "fully_diluted_value": 1.0e9,
            "twitter_followers": 100,
            "lp_addresses": 50,
            "tickers": [{ "market": "uniswap", "trust_score": "green" }],
            "dex_liquidity": [150.0, null],
            "price_usd": 1000.0,
            "recent_prices": [1000.0, 1000.0]
        }),
    );

    let mut prices = Map::new();
    prices.insert(
        TOKEN.into(),
        json!({ "7": 0.05, "8": 0.045, "9": 0.04, "10": 0.035 }),
    );
    prices.insert(
        RISKY.into(),
        json!({ "7": 0.001, "8": 0.001, "9": 0.001, "10": 0.001 }),
    );

    json!({
        "pool_id": "6",
        "latest_block": 12,
        "assets": [
            { "address": TOKEN, "symbol": "UNI",
              "parameters": { "liquidation_incentive": 0.5, "collateral_factor": 0.1 } },
            { "address": RISKY, "symbol": "SHIB" },
            { "address": WRAPPED_ETH, "symbol": "WETH" },
            { "address": NATIVE, "symbol": "ETH" }
        ],
        "metrics": metrics,
        "prices": prices,
        "reference_usd": { "7": 2000.0, "8": 2000.0, "9": 2000.0, "10": 2000.0 }
    })
    .to_string()
}
