//! Lendscore - Collateral risk scoring for lending pool assets.
//!
//! Estimates how risky an asset is as collateral by combining market data,
//! a historical liquidation backtest and a multi-factor heuristic scorer.
//!
//! # Architecture
//!
//! - **`application::dispatcher`** - Process-wide rate limiter. Every
//!   outbound provider call is admitted under a named service's rule, and
//!   throttled calls are transparently re-admitted.
//! - **`application::backtest`** - Replays a price history to find the worst
//!   price decline at a liquidator's earliest feasible exit.
//! - **`application::scorer`** - Turns metrics and the backtest result into
//!   crash, liquidity, volatility and historical sub-scores.
//! - **`application::pipeline`** - Fetches, backtests and scores every asset
//!   of a pool concurrently, then aggregates.
//!
//! # Modules
//!
//! - [`domain`] - Addresses, price series, scores, grades, overrides
//! - [`port`] - Data-source traits the pipeline depends on
//! - [`adapter`] - HTTP client, live provider source and snapshot source
//! - [`infrastructure`] - Configuration loading and wiring
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use lendscore::application::backtest::simulate_prices;
//! use lendscore::domain::LiquidationParameters;
//!
//! let params = LiquidationParameters::try_new(0.5, 0.1).unwrap();
//! let result = simulate_prices(&[100.0, 90.0, 80.0, 70.0], &params);
//! assert!((result.token_down - 0.0625).abs() < 1e-12);
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
