use std::path::Path;

use crate::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Validate a configuration file and summarize what it resolves to.
///
/// # Errors
///
/// Returns the first load, validation or override error.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());

    let config = Config::load(path)?;
    let overrides = config.overrides()?;
    output::ok("Configuration file is valid");

    output::section("Services");
    for service in config.services() {
        let Some(rule) = config.dispatcher.services.get(service.as_str()) else {
            continue;
        };
        let endpoint = config
            .providers
            .endpoint(&service)?
            .map_or_else(|| "(no endpoint)".to_string(), |u| u.to_string());
        output::key_value(
            service.as_str(),
            format!(
                "{} req / {}s, priority {}, {endpoint}",
                rule.rate, rule.window_secs, rule.priority
            ),
        );
    }

    output::section("Scoring");
    let params = config.scoring.parameters()?;
    output::key_value("Override mode", format!("{:?}", config.scoring.override_mode));
    output::key_value("Base asset", config.scoring.base_asset());
    output::key_value(
        "Defaults",
        format!(
            "incentive {}, collateral factor {}",
            params.liquidation_incentive(),
            params.collateral_factor()
        ),
    );

    output::section("Backtest");
    let backtest = &config.backtest;
    output::key_value(
        "Schedule",
        format!(
            "every {} blocks over {}, {} behind head",
            backtest.block_period, backtest.block_span, backtest.head_lag
        ),
    );
    output::key_value("Volatility gate", backtest.volatility_gate);

    output::section("Overrides");
    match &config.overrides_path {
        Some(path) => output::key_value(
            "File",
            format!(
                "{} ({} assets, {} pools)",
                path.display(),
                overrides.asset_count(),
                overrides.pool_count()
            ),
        ),
        None => output::warn("No override file configured"),
    }

    println!();
    println!("Configuration is ready to use.");
    Ok(())
}
