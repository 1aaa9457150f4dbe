//! Canonical test configurations.
//!
//! Single source of truth for rules and plans used across tests.

use std::time::Duration;

use crate::application::backtest::{BacktestPlan, BlockSchedule};
use crate::application::dispatcher::{RuleTable, ServiceRule};

/// A rule with a millisecond window.
///
/// # Panics
///
/// Panics on a zero rate or window.
pub fn rule(rate: u32, window_ms: u64, priority: u32) -> ServiceRule {
    ServiceRule::try_new(rate, Duration::from_millis(window_ms), priority)
        .expect("test rule must be valid")
}

/// A table holding one service.
pub fn single_service(name: &str, rate: u32, window_ms: u64) -> RuleTable {
    RuleTable::new().with(name, rule(rate, window_ms, 1))
}

/// Four samples at blocks `latest - 5 ..= latest - 2`.
pub fn short_backtest() -> BacktestPlan {
    BacktestPlan {
        schedule: BlockSchedule {
            period: 1,
            span: 3,
            head_lag: 2,
        },
        ..BacktestPlan::default()
    }
}

/// Config TOML matching [`short_backtest`], with quiet logging.
pub const SHORT_BACKTEST_TOML: &str = r#"
[logging]
level = "warn"

[backtest]
block_period = 1
block_span = 3
head_lag = 2
"#;
