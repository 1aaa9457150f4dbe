//! Pool-and-asset specific liquidation parameters.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Default liquidation incentive (15%).
pub const DEFAULT_LIQUIDATION_INCENTIVE: f64 = 0.15;

/// Default collateral factor (75%).
pub const DEFAULT_COLLATERAL_FACTOR: f64 = 0.75;

/// Liquidation incentive and collateral factor, both fractions.
///
/// Supplied per scoring run and immutable during it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct LiquidationParameters {
    liquidation_incentive: f64,
    collateral_factor: f64,
}

impl LiquidationParameters {
    /// Create parameters, validating both fractions.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::FractionOutOfRange`] if either value is not
    /// a finite number within `[0, 1]`.
    pub fn try_new(liquidation_incentive: f64, collateral_factor: f64) -> Result<Self, DomainError> {
        check_fraction("liquidation_incentive", liquidation_incentive)?;
        check_fraction("collateral_factor", collateral_factor)?;
        Ok(Self {
            liquidation_incentive,
            collateral_factor,
        })
    }

    #[must_use]
    pub const fn liquidation_incentive(&self) -> f64 {
        self.liquidation_incentive
    }

    #[must_use]
    pub const fn collateral_factor(&self) -> f64 {
        self.collateral_factor
    }
}

impl Default for LiquidationParameters {
    fn default() -> Self {
        Self {
            liquidation_incentive: DEFAULT_LIQUIDATION_INCENTIVE,
            collateral_factor: DEFAULT_COLLATERAL_FACTOR,
        }
    }
}

#[derive(Deserialize)]
struct RawParameters {
    liquidation_incentive: f64,
    collateral_factor: f64,
}

impl TryFrom<RawParameters> for LiquidationParameters {
    type Error = DomainError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Self::try_new(raw.liquidation_incentive, raw.collateral_factor)
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::FractionOutOfRange { field, value })
    }
}
