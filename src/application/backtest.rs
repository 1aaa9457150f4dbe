//! Historical liquidation backtest.
//!
//! Replays a price history and, for every candidate liquidation start, finds
//! the earliest window in which a liquidator would profitably act: the
//! liquidation incentive must exceed the price deterioration over the window
//! plus an assumed slippage cost. The fractional price decline at that exit
//! is the start's token-down; the backtest result is the maximum over all
//! starts.
//!
//! The simulator is a pure function. Deciding *whether* to backtest (the
//! volatility gate) and fetching the series are left to callers; see
//! [`BacktestPlan`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{LiquidationParameters, PriceSeries};

/// Slippage is modelled as a fixed share of the collateral factor.
const SLIPPAGE_DIVISOR: f64 = 8.0;

/// Below this swing (`max / min - 1`) a series is too flat to backtest.
pub const DEFAULT_VOLATILITY_GATE: f64 = 0.01;

/// Maximum fractional price decline across feasible liquidation windows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BacktestResult {
    pub token_down: f64,
}

impl BacktestResult {
    /// Whether the backtest found any feasible liquidation with a decline.
    #[must_use]
    pub fn is_nonzero(&self) -> bool {
        self.token_down != 0.0
    }
}

/// Simulate liquidations over a validated series.
#[must_use]
pub fn simulate(prices: &PriceSeries, params: &LiquidationParameters) -> BacktestResult {
    simulate_prices(&prices.prices(), params)
}

/// Simulate liquidations over raw prices.
///
/// Degenerate input (fewer than two samples, or any non-positive or
/// non-finite price) yields a token-down of zero.
#[must_use]
pub fn simulate_prices(prices: &[f64], params: &LiquidationParameters) -> BacktestResult {
    let n = prices.len();
    if n < 2 {
        return BacktestResult::default();
    }
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        debug!(samples = n, "Degenerate price history, skipping simulation");
        return BacktestResult::default();
    }

    let incentive = round_to(params.liquidation_incentive(), 4);
    let slippage = params.collateral_factor() / SLIPPAGE_DIVISOR;

    let mut token_down = 0.0_f64;
    let mut feasible_starts = 0usize;

    for i in 0..n - 1 {
        let original = prices[i];
        // Earliest feasible exit only; later windows for this start are ignored.
        let exit = (i..n - 1).find_map(|j| {
            let block1 = prices[j + 1];
            let twap = (prices[j] + block1) / 2.0;
            let deterioration = (twap - block1) / twap;
            (incentive > deterioration + slippage).then_some(twap)
        });

        if let Some(twap) = exit {
            feasible_starts += 1;
            token_down = token_down.max((original - twap).abs() / original);
        }
    }

    debug!(
        samples = n,
        feasible_starts,
        token_down,
        "Liquidation backtest complete"
    );

    BacktestResult { token_down }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Which blocks to sample for a backtest.
///
/// Samples every `period` blocks over the last `span` blocks, ending
/// `head_lag` blocks behind the chain head so indexers have caught up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSchedule {
    pub period: u64,
    pub span: u64,
    pub head_lag: u64,
}

impl Default for BlockSchedule {
    fn default() -> Self {
        // ~15 minutes between samples, ~1 week of history.
        Self {
            period: 68,
            span: 6500,
            head_lag: 2,
        }
    }
}

impl BlockSchedule {
    /// Blocks to query given the latest block, oldest first.
    ///
    /// Empty when `period` is zero.
    #[must_use]
    pub fn blocks(&self, latest: u64) -> Vec<u64> {
        if self.period == 0 {
            return Vec::new();
        }
        let end = latest.saturating_sub(self.head_lag);
        let start = end.saturating_sub(self.span);
        (start..=end).step_by(self.period as usize).collect()
    }
}

/// Decides whether a fetched series warrants a backtest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestPlan {
    pub schedule: BlockSchedule,
    /// Minimum swing (`max / min - 1`) for the simulator to run.
    pub volatility_gate: f64,
}

impl Default for BacktestPlan {
    fn default() -> Self {
        Self {
            schedule: BlockSchedule::default(),
            volatility_gate: DEFAULT_VOLATILITY_GATE,
        }
    }
}

impl BacktestPlan {
    /// Run the simulator unless the series is too flat.
    ///
    /// `None` means the backtest was skipped, which is distinct from a
    /// backtest that ran and found no decline.
    #[must_use]
    pub fn run(&self, prices: &PriceSeries, params: &LiquidationParameters) -> Option<BacktestResult> {
        let swing = prices.swing();
        if swing < self.volatility_gate {
            debug!(
                swing,
                gate = self.volatility_gate,
                "Volatility below gate, skipping backtest"
            );
            return None;
        }
        Some(simulate(prices, params))
    }
}
