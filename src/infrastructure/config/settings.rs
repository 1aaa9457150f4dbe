//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! table is optional; an empty file yields the default deployment (four
//! provider services, numeric overrides, a one-week backtest window).
//!
//! # Example
//!
//! ```no_run
//! use lendscore::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::dispatcher::DispatcherConfig;
use super::logging::LoggingConfig;
use super::overrides::load_overrides;
use super::providers::ProvidersConfig;
use super::scoring::{BacktestConfig, ScoringConfig};
use crate::application::dispatcher::RuleTable;
use crate::domain::{OverrideTable, ServiceName};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate rules per provider service.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Override mode, base asset and default liquidation parameters.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Block schedule and volatility gate for the backtest.
    #[serde(default)]
    pub backtest: BacktestConfig,

    /// Endpoint URL per provider service.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Optional override file. Relative paths resolve against the config
    /// file's directory when loaded with [`Config::load`].
    #[serde(default)]
    pub overrides_path: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation
    /// fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse_toml(&content)?;

        if let (Some(overrides), Some(dir)) = (&config.overrides_path, path.parent()) {
            if overrides.is_relative() {
                config.overrides_path = Some(dir.join(overrides));
            }
        }
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that every section is internally consistent and that every
    /// provider endpoint belongs to a service with a rate rule.
    fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.dispatcher.rule_table()?;
        self.scoring.validate()?;
        self.backtest.validate()?;
        self.providers.validate()?;

        for service in self.providers.services() {
            if !self.dispatcher.services.contains_key(service.as_str()) {
                return Err(ConfigError::UnknownService {
                    service: service.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Dispatcher rules built from `[dispatcher.services]`.
    ///
    /// # Errors
    ///
    /// Fails if a rule is invalid.
    pub fn rule_table(&self) -> Result<RuleTable> {
        Ok(self.dispatcher.rule_table()?)
    }

    /// Load the configured override file, or an empty table.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or contains malformed entries.
    pub fn overrides(&self) -> Result<OverrideTable> {
        match &self.overrides_path {
            Some(path) => load_overrides(path, self.scoring.override_mode),
            None => Ok(OverrideTable::new(self.scoring.override_mode)),
        }
    }

    /// Service names with a rate rule, sorted.
    pub fn services(&self) -> impl Iterator<Item = ServiceName> + '_ {
        self.dispatcher
            .services
            .keys()
            .map(|k| ServiceName::new(k.as_str()))
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
