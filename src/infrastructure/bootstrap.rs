//! Composition root: turns a [`Config`] into runnable components.

use std::sync::Arc;

use tracing::info;

use url::Url;

use crate::adapter::outbound::http::HttpClient;
use crate::adapter::outbound::live::{
    LiveSource, ProviderEndpoints, COINGECKO, ETHPLORER, SUSHISWAP, UNISWAP,
};
use crate::application::dispatcher::Dispatcher;
use crate::application::pipeline::ScoringPipeline;
use crate::domain::ServiceName;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::{MarketDataSource, PriceHistorySource};

/// Build the process-wide dispatcher from `[dispatcher.services]`.
///
/// # Errors
///
/// Fails if a rate rule is invalid.
pub fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    Ok(Dispatcher::new(config.rule_table()?))
}

/// Build an HTTP client sharing `dispatcher`.
///
/// # Errors
///
/// Fails if the HTTP client cannot be constructed.
pub fn build_http_client(dispatcher: Dispatcher) -> Result<HttpClient> {
    HttpClient::new(dispatcher)
}

/// Build the live provider source from `[providers]`.
///
/// # Errors
///
/// Fails if any provider the live source needs has no valid endpoint.
pub fn build_live_source(config: &Config, http: HttpClient) -> Result<LiveSource> {
    let endpoint = |service: &str| -> Result<Url> {
        config
            .providers
            .endpoint(&ServiceName::new(service))?
            .ok_or_else(|| {
                ConfigError::InvalidValue {
                    field: "providers",
                    reason: format!("no endpoint for '{service}'"),
                }
                .into()
            })
    };
    let endpoints = ProviderEndpoints {
        coingecko: endpoint(COINGECKO)?,
        uniswap: endpoint(UNISWAP)?,
        sushiswap: endpoint(SUSHISWAP)?,
        ethplorer: endpoint(ETHPLORER)?,
    };
    info!(
        coingecko = %endpoints.coingecko,
        uniswap = %endpoints.uniswap,
        sushiswap = %endpoints.sushiswap,
        ethplorer = %endpoints.ethplorer,
        "Using live providers"
    );
    Ok(LiveSource::new(http, endpoints))
}

/// Build a scoring pipeline over the given data sources.
///
/// # Errors
///
/// Fails if the override file cannot be loaded.
pub fn build_pipeline(
    config: &Config,
    market: Arc<dyn MarketDataSource>,
    history: Arc<dyn PriceHistorySource>,
) -> Result<ScoringPipeline> {
    let overrides = config.overrides()?;
    info!(
        market = market.name(),
        history = history.name(),
        mode = ?overrides.mode(),
        base_asset = %config.scoring.base_asset(),
        "Building scoring pipeline"
    );
    Ok(ScoringPipeline::new(market, history, Arc::new(overrides))
        .with_plan(config.backtest.plan())
        .with_base_asset(config.scoring.base_asset()))
}
