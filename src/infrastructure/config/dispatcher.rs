//! Per-service rate rules for the request dispatcher.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::application::dispatcher::{RuleTable, ServiceRule};
use crate::error::ConfigError;

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatcherConfig {
    /// Rules keyed by service name. A configured table replaces the
    /// defaults entirely.
    #[serde(default = "default_services")]
    pub services: BTreeMap<String, ServiceRuleConfig>,
}

/// One `[dispatcher.services.<name>]` table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ServiceRuleConfig {
    /// Requests allowed per window.
    pub rate: u32,
    /// Window length in seconds; fractions allowed.
    pub window_secs: f64,
    /// Lower drains first when requests wait.
    #[serde(default = "default_priority")]
    pub priority: u32,
}

const fn default_priority() -> u32 {
    1
}

fn default_services() -> BTreeMap<String, ServiceRuleConfig> {
    let rule = |rate, window_secs| ServiceRuleConfig {
        rate,
        window_secs,
        priority: default_priority(),
    };
    BTreeMap::from([
        ("coingecko".to_string(), rule(10, 1.0)),
        ("uniswap".to_string(), rule(60, 10.0)),
        ("sushiswap".to_string(), rule(60, 10.0)),
        ("ethplorer".to_string(), rule(10, 1.0)),
    ])
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
        }
    }
}

impl ServiceRuleConfig {
    /// Validate and convert to a dispatcher rule.
    ///
    /// # Errors
    ///
    /// Fails for a zero rate or a window that is not a positive, finite
    /// number of seconds.
    pub fn to_rule(&self) -> Result<ServiceRule, ConfigError> {
        let window = Duration::try_from_secs_f64(self.window_secs).map_err(|e| {
            ConfigError::InvalidValue {
                field: "window_secs",
                reason: e.to_string(),
            }
        })?;
        ServiceRule::try_new(self.rate, window, self.priority)
    }
}

impl DispatcherConfig {
    /// Build the dispatcher's rule table.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid rule, or if no service is configured.
    pub fn rule_table(&self) -> Result<RuleTable, ConfigError> {
        if self.services.is_empty() {
            return Err(ConfigError::MissingField {
                field: "dispatcher.services",
            });
        }
        self.services
            .iter()
            .try_fold(RuleTable::new(), |table, (name, rule)| {
                Ok(table.with(name.as_str(), rule.to_rule()?))
            })
    }
}
