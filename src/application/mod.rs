//! Application services (use cases).
//!
//! - [`dispatcher`] - Rate-limited admission for every outbound call
//! - [`backtest`] - Liquidation backtest simulator
//! - [`scorer`] - Multi-factor risk scorer
//! - [`pipeline`] - Per-asset fetch and score, pool aggregation

pub mod backtest;
pub mod dispatcher;
pub mod pipeline;
pub mod scorer;

pub use backtest::{BacktestPlan, BacktestResult, BlockSchedule};
pub use dispatcher::{Attempt, Dispatcher, RuleTable, ServiceRule};
pub use pipeline::{PoolAsset, ScoringPipeline};
