use std::collections::HashMap;
use std::time::Duration;

use crate::domain::ServiceName;
use crate::error::ConfigError;

/// Longest window a rule may declare.
pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Throughput limit for one named service.
///
/// At most `rate` requests are admitted in any sliding `window`. When
/// requests contend for budget, lower `priority` values drain first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRule {
    rate: u32,
    window: Duration,
    priority: u32,
}

impl ServiceRule {
    /// Create a rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero rate, or a window
    /// that is zero or longer than [`MAX_WINDOW`].
    pub fn try_new(rate: u32, window: Duration, priority: u32) -> Result<Self, ConfigError> {
        if rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate",
                reason: "must be at least 1 request per window".into(),
            });
        }
        if window.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "window_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if window > MAX_WINDOW {
            return Err(ConfigError::InvalidValue {
                field: "window_secs",
                reason: format!("must be at most {}s", MAX_WINDOW.as_secs()),
            });
        }
        Ok(Self {
            rate,
            window,
            priority,
        })
    }

    #[must_use]
    pub const fn rate(&self) -> u32 {
        self.rate
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }
}

/// The set of known services and their rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<ServiceName, ServiceRule>,
}

impl RuleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rule, builder style.
    #[must_use]
    pub fn with(mut self, service: impl Into<ServiceName>, rule: ServiceRule) -> Self {
        self.insert(service.into(), rule);
        self
    }

    pub fn insert(&mut self, service: ServiceName, rule: ServiceRule) {
        self.rules.insert(service, rule);
    }

    #[must_use]
    pub fn get(&self, service: &ServiceName) -> Option<&ServiceRule> {
        self.rules.get(service)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceName, &ServiceRule)> {
        self.rules.iter()
    }
}

impl IntoIterator for RuleTable {
    type Item = (ServiceName, ServiceRule);
    type IntoIter = std::collections::hash_map::IntoIter<ServiceName, ServiceRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}
