//! Scoring and backtest configuration.

use serde::Deserialize;

use crate::application::backtest::{BacktestPlan, BlockSchedule, DEFAULT_VOLATILITY_GATE};
use crate::domain::liquidation::{DEFAULT_COLLATERAL_FACTOR, DEFAULT_LIQUIDATION_INCENTIVE};
use crate::domain::{AssetAddress, LiquidationParameters, OverrideMode};
use crate::error::ConfigError;

/// `[scoring]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Override semantics for this deployment.
    #[serde(default)]
    pub override_mode: OverrideMode,
    /// Asset that always scores as safe. Defaults to the native asset.
    #[serde(default = "default_base_asset")]
    pub base_asset: String,
    /// Used for assets whose listing carries no parameters.
    #[serde(default = "default_liquidation_incentive")]
    pub liquidation_incentive: f64,
    #[serde(default = "default_collateral_factor")]
    pub collateral_factor: f64,
}

fn default_base_asset() -> String {
    AssetAddress::NATIVE.to_string()
}

const fn default_liquidation_incentive() -> f64 {
    DEFAULT_LIQUIDATION_INCENTIVE
}

const fn default_collateral_factor() -> f64 {
    DEFAULT_COLLATERAL_FACTOR
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            override_mode: OverrideMode::default(),
            base_asset: default_base_asset(),
            liquidation_incentive: default_liquidation_incentive(),
            collateral_factor: default_collateral_factor(),
        }
    }
}

impl ScoringConfig {
    /// Default liquidation parameters.
    ///
    /// # Errors
    ///
    /// Fails if either fraction is outside `[0, 1]`.
    pub fn parameters(&self) -> Result<LiquidationParameters, ConfigError> {
        LiquidationParameters::try_new(self.liquidation_incentive, self.collateral_factor).map_err(
            |e| ConfigError::InvalidValue {
                field: "scoring",
                reason: e.to_string(),
            },
        )
    }

    #[must_use]
    pub fn base_asset(&self) -> AssetAddress {
        AssetAddress::new(self.base_asset.as_str())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.base_asset.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "base_asset",
            });
        }
        self.parameters().map(|_| ())
    }
}

/// `[backtest]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BacktestConfig {
    /// Blocks between samples.
    #[serde(default = "default_block_period")]
    pub block_period: u64,
    /// Blocks of history to cover.
    #[serde(default = "default_block_span")]
    pub block_span: u64,
    /// Blocks behind the chain head to stop at.
    #[serde(default = "default_head_lag")]
    pub head_lag: u64,
    /// Minimum `max / min - 1` for the simulator to run.
    #[serde(default = "default_volatility_gate")]
    pub volatility_gate: f64,
}

const fn default_block_period() -> u64 {
    68
}

const fn default_block_span() -> u64 {
    6500
}

const fn default_head_lag() -> u64 {
    2
}

const fn default_volatility_gate() -> f64 {
    DEFAULT_VOLATILITY_GATE
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            block_period: default_block_period(),
            block_span: default_block_span(),
            head_lag: default_head_lag(),
            volatility_gate: default_volatility_gate(),
        }
    }
}

impl BacktestConfig {
    #[must_use]
    pub fn plan(&self) -> BacktestPlan {
        BacktestPlan {
            schedule: BlockSchedule {
                period: self.block_period,
                span: self.block_span,
                head_lag: self.head_lag,
            },
            volatility_gate: self.volatility_gate,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.block_period == 0 {
            return Err(ConfigError::InvalidValue {
                field: "block_period",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !self.volatility_gate.is_finite() || self.volatility_gate < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "volatility_gate",
                reason: "must be 0 or greater".to_string(),
            });
        }
        Ok(())
    }
}
