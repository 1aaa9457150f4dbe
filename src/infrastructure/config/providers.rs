//! Provider endpoints keyed by dispatcher service name.

use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::domain::ServiceName;
use crate::error::ConfigError;

/// `[providers]` table: `service = "https://..."`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig {
    endpoints: BTreeMap<String, String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        let endpoints = [
            ("coingecko", "https://api.coingecko.com/api/v3/"),
            (
                "uniswap",
                "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2",
            ),
            (
                "sushiswap",
                "https://api.thegraph.com/subgraphs/name/sushiswap/exchange",
            ),
            ("ethplorer", "https://api.ethplorer.io/"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { endpoints }
    }
}

impl ProvidersConfig {
    /// Parsed endpoint for `service`, if configured.
    ///
    /// # Errors
    ///
    /// Fails if the configured value is not a valid URL.
    pub fn endpoint(&self, service: &ServiceName) -> Result<Option<Url>, ConfigError> {
        self.endpoints
            .get(service.as_str())
            .map(|raw| parse_endpoint(raw))
            .transpose()
    }

    /// Configured service names, sorted.
    pub fn services(&self) -> impl Iterator<Item = ServiceName> + '_ {
        self.endpoints.keys().map(|k| ServiceName::new(k.as_str()))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for raw in self.endpoints.values() {
            parse_endpoint(raw)?;
        }
        Ok(())
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: "providers",
        reason: format!("'{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: "providers",
            reason: format!("'{raw}': scheme must be http or https"),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let providers = ProvidersConfig::default();
        assert!(providers.validate().is_ok());
        let url = providers
            .endpoint(&ServiceName::new("coingecko"))
            .unwrap()
            .unwrap();
        assert_eq!(url.host_str(), Some("api.coingecko.com"));
        assert!(providers
            .endpoint(&ServiceName::new("unknown"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let providers = ProvidersConfig {
            endpoints: BTreeMap::from([("x".to_string(), "ftp://example.com".to_string())]),
        };
        assert!(providers.validate().is_err());

        let providers = ProvidersConfig {
            endpoints: BTreeMap::from([("x".to_string(), "not a url".to_string())]),
        };
        assert!(providers.validate().is_err());
    }
}
