//! Loading the override file into an [`OverrideTable`].
//!
//! ```toml
//! [assets."0x2260fac5e5542a773aa44fbcfedf7c193bc2c599"]
//! underlying = "0x0000000000000000000000000000000000000000"
//!
//! [assets."0x1f9840a85d5af5bf1d1762f925bdaddc4201f984"]
//! tests = [{ test = "crash", value = 0 }]
//!
//! [pools."6"]
//! multisig = true
//! ```
//!
//! In boolean-gate mode entries name a section and carry `true`/`false`:
//! `{ test = "crash", section = "twitter", value = false }`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::overrides::{AssetOverride, OverrideEntry, PoolOverride};
use crate::domain::{AssetAddress, OverrideMode, OverrideTable, PoolId, TestOverrides};
use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOverrides {
    #[serde(default)]
    assets: BTreeMap<String, RawAssetOverride>,
    #[serde(default)]
    pools: BTreeMap<String, PoolOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAssetOverride {
    #[serde(default)]
    underlying: Option<String>,
    #[serde(default)]
    tests: Vec<OverrideEntry>,
}

/// Parse override TOML for a deployment running in `mode`.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for invalid TOML and
/// [`ConfigError::MalformedOverride`] for entries that do not fit `mode`.
pub fn parse_overrides(content: &str, mode: OverrideMode) -> Result<OverrideTable> {
    let raw: RawOverrides = toml::from_str(content).map_err(ConfigError::Parse)?;

    let mut table = OverrideTable::new(mode);
    for (key, entry) in raw.assets {
        let tests = TestOverrides::from_entries(mode, &key, &entry.tests)?;
        let underlying = entry.underlying.map(AssetAddress::new);
        table.insert_asset(AssetAddress::new(key), AssetOverride { underlying, tests })?;
    }
    for (key, entry) in raw.pools {
        table.insert_pool(PoolId::new(key), entry);
    }
    Ok(table)
}

/// Read and parse an override file.
///
/// # Errors
///
/// See [`parse_overrides`]; also fails if the file cannot be read.
pub fn load_overrides<P: AsRef<Path>>(path: P, mode: OverrideMode) -> Result<OverrideTable> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
    let table = parse_overrides(&content, mode)?;
    info!(path = %path.as_ref().display(), mode = ?mode, "Loaded overrides");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::overrides::ValueOverrides;
    use crate::error::Error;

    #[test]
    fn parses_numeric_overrides_and_pools() {
        let table = parse_overrides(
            r#"
            [assets."0xWRAP"]
            underlying = "0xBASE"

            [assets."0xabc"]
            tests = [{ test = "crash", value = 0 }, { test = "historical", value = 1 }]

            [pools."6"]
            multisig = true
            "#,
            OverrideMode::Numeric,
        )
        .unwrap();

        assert_eq!(
            table.resolve_address(&AssetAddress::new("0xwrap")),
            AssetAddress::new("0xbase")
        );
        assert_eq!(
            table.tests_for(&AssetAddress::new("0xABC")),
            TestOverrides::Values(ValueOverrides {
                crash: Some(0),
                historical: Some(1),
                ..ValueOverrides::default()
            })
        );
        assert!(table.multisig(&PoolId::new("6")));
    }

    #[test]
    fn parses_boolean_gates() {
        let table = parse_overrides(
            r#"
            [assets."0xabc"]
            tests = [{ test = "liquidity", section = "lp_addresses", value = false }]
            "#,
            OverrideMode::BooleanGate,
        )
        .unwrap();
        let TestOverrides::Gates(gates) = table.tests_for(&AssetAddress::new("0xabc")) else {
            panic!("expected gates");
        };
        assert!(!gates.liquidity.lp_addresses);
        assert!(gates.liquidity.total_liquidity);
    }

    #[test]
    fn mode_mismatch_is_malformed() {
        let err = parse_overrides(
            r#"
            [assets."0xabc"]
            tests = [{ test = "crash", section = "twitter", value = false }]
            "#,
            OverrideMode::Numeric,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MalformedOverride { ref key, .. }) if key == "0xabc"
        ));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = parse_overrides("[assets.\"0x1\"]\nweight = 3\n", OverrideMode::Numeric)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn empty_file_is_an_empty_table() {
        let table = parse_overrides("", OverrideMode::BooleanGate).unwrap();
        assert_eq!(table.mode(), OverrideMode::BooleanGate);
        assert!(!table.multisig(&PoolId::new("1")));
    }
}
