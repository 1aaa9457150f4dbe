//! Per-asset test overrides and per-pool flags.
//!
//! Two override semantics exist and a deployment picks exactly one:
//!
//! - **Boolean gates** ([`OverrideMode::BooleanGate`]): every sub-test of
//!   every category has a gate. An open gate (`true`, the default) applies
//!   the computed heuristic; a closed gate forces that sub-test's
//!   contribution to zero.
//! - **Numeric values** ([`OverrideMode::Numeric`]): every category may carry
//!   a value that replaces the computed sub-score verbatim. Unset categories
//!   keep the computed value.
//!
//! Raw entries are validated against the active mode when the table is
//! built, so a malformed entry fails at load time rather than mid-run.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::{AssetAddress, PoolId};
use crate::error::ConfigError;

/// Which override semantics a deployment uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideMode {
    /// `true`/`false` gates per sub-test.
    BooleanGate,
    /// Replacement sub-score per category.
    #[default]
    Numeric,
}

/// The four scoring categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCategory {
    Crash,
    Liquidity,
    Volatility,
    Historical,
}

impl TestCategory {
    pub const ALL: [Self; 4] = [
        Self::Crash,
        Self::Liquidity,
        Self::Volatility,
        Self::Historical,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Crash => "crash",
            Self::Liquidity => "liquidity",
            Self::Volatility => "volatility",
            Self::Historical => "historical",
        }
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crash" => Ok(Self::Crash),
            "liquidity" => Ok(Self::Liquidity),
            "volatility" => Ok(Self::Volatility),
            "historical" => Ok(Self::Historical),
            other => Err(format!("unknown test category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrashGates {
    pub twitter: bool,
    pub audit: bool,
    pub market_cap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityGates {
    pub total_liquidity: bool,
    pub lp_addresses: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatilityGates {
    pub market_cap: bool,
    pub price_change: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalGates {
    pub backtest: bool,
}

/// Boolean gates for every sub-test. All open by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestGates {
    pub crash: CrashGates,
    pub liquidity: LiquidityGates,
    pub volatility: VolatilityGates,
    pub historical: HistoricalGates,
}

impl Default for TestGates {
    fn default() -> Self {
        Self {
            crash: CrashGates {
                twitter: true,
                audit: true,
                market_cap: true,
            },
            liquidity: LiquidityGates {
                total_liquidity: true,
                lp_addresses: true,
            },
            volatility: VolatilityGates {
                market_cap: true,
                price_change: true,
            },
            historical: HistoricalGates { backtest: true },
        }
    }
}

impl TestGates {
    fn set(&mut self, category: TestCategory, section: &str, open: bool) -> Result<(), String> {
        let slot = match (category, section) {
            (TestCategory::Crash, "twitter") => &mut self.crash.twitter,
            (TestCategory::Crash, "audit") => &mut self.crash.audit,
            (TestCategory::Crash, "market_cap") => &mut self.crash.market_cap,
            (TestCategory::Liquidity, "total_liquidity") => &mut self.liquidity.total_liquidity,
            (TestCategory::Liquidity, "lp_addresses") => &mut self.liquidity.lp_addresses,
            (TestCategory::Volatility, "market_cap") => &mut self.volatility.market_cap,
            (TestCategory::Volatility, "price_change") => &mut self.volatility.price_change,
            (TestCategory::Historical, "backtest") => &mut self.historical.backtest,
            _ => return Err(format!("unknown section '{section}' for test '{category}'")),
        };
        *slot = open;
        Ok(())
    }
}

/// Replacement sub-scores per category; `None` keeps the computed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueOverrides {
    pub crash: Option<u32>,
    pub liquidity: Option<u32>,
    pub volatility: Option<u32>,
    pub historical: Option<u32>,
}

impl ValueOverrides {
    #[must_use]
    pub const fn get(&self, category: TestCategory) -> Option<u32> {
        match category {
            TestCategory::Crash => self.crash,
            TestCategory::Liquidity => self.liquidity,
            TestCategory::Volatility => self.volatility,
            TestCategory::Historical => self.historical,
        }
    }

    fn set(&mut self, category: TestCategory, value: u32) {
        let slot = match category {
            TestCategory::Crash => &mut self.crash,
            TestCategory::Liquidity => &mut self.liquidity,
            TestCategory::Volatility => &mut self.volatility,
            TestCategory::Historical => &mut self.historical,
        };
        *slot = Some(value);
    }
}

/// Resolved overrides for one asset, in exactly one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOverrides {
    Gates(TestGates),
    Values(ValueOverrides),
}

impl TestOverrides {
    /// Overrides that leave every computed value untouched.
    #[must_use]
    pub fn none(mode: OverrideMode) -> Self {
        match mode {
            OverrideMode::BooleanGate => Self::Gates(TestGates::default()),
            OverrideMode::Numeric => Self::Values(ValueOverrides::default()),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OverrideMode {
        match self {
            Self::Gates(_) => OverrideMode::BooleanGate,
            Self::Values(_) => OverrideMode::Numeric,
        }
    }

    /// Build overrides from raw entries, validating them against `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedOverride`] for an unknown category or
    /// section, or a value whose type does not match the mode.
    pub fn from_entries(
        mode: OverrideMode,
        key: &str,
        entries: &[OverrideEntry],
    ) -> Result<Self, ConfigError> {
        let malformed = |reason: String| ConfigError::MalformedOverride {
            key: key.to_string(),
            reason,
        };

        let mut overrides = Self::none(mode);
        for entry in entries {
            let category = entry.test.parse::<TestCategory>().map_err(malformed)?;
            match (&mut overrides, entry.value) {
                (Self::Gates(gates), OverrideValue::Flag(open)) => {
                    let section = entry.section.as_deref().ok_or_else(|| {
                        malformed(format!("test '{category}' needs a section"))
                    })?;
                    gates.set(category, section, open).map_err(malformed)?;
                }
                (Self::Values(values), OverrideValue::Number(value)) => {
                    if let Some(section) = &entry.section {
                        return Err(malformed(format!(
                            "numeric overrides apply to a whole test, got section '{section}'"
                        )));
                    }
                    values.set(category, value);
                }
                (Self::Gates(_), OverrideValue::Number(v)) => {
                    return Err(malformed(format!(
                        "boolean-gate mode expects true/false for '{category}', got {v}"
                    )));
                }
                (Self::Values(_), OverrideValue::Flag(b)) => {
                    return Err(malformed(format!(
                        "numeric mode expects a number for '{category}', got {b}"
                    )));
                }
            }
        }
        Ok(overrides)
    }
}

/// A raw override value as written in an override file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Flag(bool),
    Number(u32),
}

/// A raw override entry as written in an override file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub test: String,
    #[serde(default)]
    pub section: Option<String>,
    pub value: OverrideValue,
}

/// Overrides attached to one asset address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOverride {
    /// Score this address as another one (e.g. a wrapper's underlying).
    pub underlying: Option<AssetAddress>,
    pub tests: TestOverrides,
}

/// Flags attached to one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOverride {
    #[serde(default)]
    pub multisig: bool,
}

/// Immutable override tables for a scoring run.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    mode: OverrideMode,
    assets: HashMap<AssetAddress, AssetOverride>,
    pools: HashMap<PoolId, PoolOverride>,
}

impl OverrideTable {
    /// Empty table in the given mode.
    #[must_use]
    pub fn new(mode: OverrideMode) -> Self {
        Self {
            mode,
            assets: HashMap::new(),
            pools: HashMap::new(),
        }
    }

    /// Add an asset override.
    ///
    /// # Errors
    ///
    /// Fails if the override's mode differs from the table's mode.
    pub fn insert_asset(
        &mut self,
        address: AssetAddress,
        entry: AssetOverride,
    ) -> Result<(), ConfigError> {
        if entry.tests.mode() != self.mode {
            return Err(ConfigError::MalformedOverride {
                key: address.to_string(),
                reason: format!(
                    "override mode {:?} does not match deployment mode {:?}",
                    entry.tests.mode(),
                    self.mode
                ),
            });
        }
        self.assets.insert(address, entry);
        Ok(())
    }

    pub fn insert_pool(&mut self, pool: PoolId, entry: PoolOverride) {
        self.pools.insert(pool, entry);
    }

    #[must_use]
    pub const fn mode(&self) -> OverrideMode {
        self.mode
    }

    /// The address an asset should be scored as.
    #[must_use]
    pub fn resolve_address(&self, address: &AssetAddress) -> AssetAddress {
        self.assets
            .get(address)
            .and_then(|o| o.underlying.clone())
            .unwrap_or_else(|| address.clone())
    }

    /// Test overrides for an address, or pass-through overrides if none.
    #[must_use]
    pub fn tests_for(&self, address: &AssetAddress) -> TestOverrides {
        self.assets
            .get(address)
            .map_or_else(|| TestOverrides::none(self.mode), |o| o.tests)
    }

    /// Number of assets with an override entry.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    #[must_use]
    pub fn multisig(&self, pool: &PoolId) -> bool {
        self.pools.get(pool).is_some_and(|p| p.multisig)
    }
}
