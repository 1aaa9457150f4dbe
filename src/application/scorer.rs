//! Multi-factor risk scorer.
//!
//! Converts an asset's fetched metrics, its liquidation parameters and the
//! backtest outcome into four category sub-scores. Each sub-test is a fixed
//! policy threshold; higher is riskier. Overrides are applied per category
//! in whichever mode the deployment selected.

use tracing::trace;

use super::backtest::BacktestResult;
use crate::domain::overrides::{TestGates, ValueOverrides};
use crate::domain::{AssetMetrics, LiquidationParameters, Score, TestCategory, TestOverrides};

const MIN_TWITTER_FOLLOWERS: u64 = 500;
/// Market cap below this share of fully diluted value scores a crash point.
const MIN_CIRCULATING_SHARE: f64 = 0.03;

const THIN_LIQUIDITY_USD: f64 = 200_000.0;
const LOW_LIQUIDITY_USD: f64 = 1_000_000.0;
const MIN_LP_ADDRESSES: u64 = 100;

/// Nested market-cap tiers, largest first. Each tier passed adds a point.
const MARKET_CAP_TIERS_USD: [f64; 3] = [600_000_000.0, 100_000_000.0, 30_000_000.0];
const PRICE_CHANGE_THRESHOLD: f64 = 0.1;

/// Score one asset.
///
/// `backtest` is `None` when the simulator was skipped; that contributes
/// nothing to the historical category.
#[must_use]
pub fn score(
    metrics: &AssetMetrics,
    params: &LiquidationParameters,
    backtest: Option<BacktestResult>,
    overrides: &TestOverrides,
) -> Score {
    let (gates, values) = match overrides {
        TestOverrides::Gates(gates) => (*gates, ValueOverrides::default()),
        TestOverrides::Values(values) => (TestGates::default(), *values),
    };

    let computed = [
        (TestCategory::Crash, crash(metrics, &gates)),
        (TestCategory::Liquidity, liquidity(metrics, &gates)),
        (TestCategory::Volatility, volatility(metrics, params, &gates)),
        (TestCategory::Historical, historical(params, backtest, &gates)),
    ];
    let [crash, liquidity, volatility, historical] =
        computed.map(|(category, value)| values.get(category).unwrap_or(value));

    trace!(
        symbol = %metrics.symbol,
        crash,
        liquidity,
        volatility,
        historical,
        "Asset scored"
    );

    Score::from_categories(crash, liquidity, volatility, historical)
}

fn point(gate: bool, triggered: bool) -> u32 {
    u32::from(gate && triggered)
}

fn crash(metrics: &AssetMetrics, gates: &TestGates) -> u32 {
    let g = gates.crash;
    point(g.twitter, metrics.twitter_followers < MIN_TWITTER_FOLLOWERS)
        + point(g.audit, !metrics.audited)
        + point(
            g.market_cap,
            metrics.market_cap < MIN_CIRCULATING_SHARE * metrics.fully_diluted_value,
        )
}

fn liquidity(metrics: &AssetMetrics, gates: &TestGates) -> u32 {
    let g = gates.liquidity;
    let tier = if metrics.total_liquidity < THIN_LIQUIDITY_USD {
        2
    } else if metrics.total_liquidity < LOW_LIQUIDITY_USD {
        1
    } else {
        0
    };
    let tier = if g.total_liquidity { tier } else { 0 };
    tier + point(g.lp_addresses, metrics.lp_addresses < MIN_LP_ADDRESSES)
}

fn volatility(metrics: &AssetMetrics, params: &LiquidationParameters, gates: &TestGates) -> u32 {
    let g = gates.volatility;
    let tier = MARKET_CAP_TIERS_USD
        .iter()
        .take_while(|&&threshold| metrics.market_cap < threshold)
        .count() as u32;
    let tier = if g.market_cap { tier } else { 0 };

    let li = params.liquidation_incentive();
    let cf = params.collateral_factor();
    let doubled = 2.0 * metrics.price_change;
    let swings = metrics.price_change > PRICE_CHANGE_THRESHOLD
        && doubled < 1.0 - cf - li
        && doubled < li - cf / 2.0;

    tier + point(g.price_change, swings)
}

fn historical(
    params: &LiquidationParameters,
    backtest: Option<BacktestResult>,
    gates: &TestGates,
) -> u32 {
    let Some(result) = backtest.filter(BacktestResult::is_nonzero) else {
        return 0;
    };
    let li = params.liquidation_incentive();
    let cf = params.collateral_factor();
    point(
        gates.historical.backtest,
        cf > 1.0 - li - result.token_down,
    )
}
