//! Pool scoring from a snapshot file, offline or against live providers.

use std::sync::Arc;

use tabled::{Table, Tabled};

use crate::adapter::outbound::snapshot::SnapshotSource;
use crate::cli::{output, OutputFormat, ScoreArgs};
use crate::domain::{AssetScore, Grade, PoolScore};
use crate::error::Result;
use crate::infrastructure::bootstrap::{
    build_dispatcher, build_http_client, build_live_source, build_pipeline,
};
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct GradeRow {
    #[tabled(rename = "Asset")]
    symbol: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Crash")]
    crash: Grade,
    #[tabled(rename = "Liquidity")]
    liquidity: Grade,
    #[tabled(rename = "Volatility")]
    volatility: Grade,
    #[tabled(rename = "Historical")]
    historical: Grade,
    #[tabled(rename = "Overall")]
    overall: Grade,
    #[tabled(rename = "Token Down")]
    token_down: String,
}

impl From<&AssetScore> for GradeRow {
    fn from(asset: &AssetScore) -> Self {
        let grades = asset.score.grades();
        Self {
            symbol: asset.symbol.clone(),
            address: asset.address.to_string(),
            crash: grades.crash,
            liquidity: grades.liquidity,
            volatility: grades.volatility,
            historical: grades.historical,
            overall: grades.overall,
            token_down: asset
                .info
                .token_down
                .map_or_else(|| "-".to_string(), |td| format!("{:.2}%", td * 100.0)),
        }
    }
}

/// Score the snapshot's pool and print the result.
///
/// # Errors
///
/// Fails on configuration, override, snapshot or HTTP client errors.
/// Per-asset data gaps never fail the command; those assets print as
/// unscored.
pub async fn execute(args: &ScoreArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.init_logging();

    let snapshot = Arc::new(SnapshotSource::load(
        &args.snapshot,
        config.scoring.parameters()?,
    )?);
    let pipeline = if args.live {
        let http = build_http_client(build_dispatcher(&config)?)?;
        let live = Arc::new(build_live_source(&config, http)?);
        build_pipeline(&config, live.clone(), live)?
    } else {
        build_pipeline(&config, snapshot.clone(), snapshot.clone())?
    };
    let pool = pipeline
        .score_pool(snapshot.pool_id().clone(), snapshot.assets())
        .await;

    match args.format {
        OutputFormat::Table => print_table(&pool),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pool)?),
        OutputFormat::Grades => println!("{}", serde_json::to_string_pretty(&pool.grades())?),
    }
    Ok(())
}

fn print_table(pool: &PoolScore) {
    output::section(&format!("Pool {}", pool.pool_id));
    let rows: Vec<GradeRow> = pool.scores.iter().map(GradeRow::from).collect();
    output::indented(&Table::new(rows).to_string());
    println!();
    output::key_value("Pool grade", Grade::from(pool.overall));
    output::key_value("Multisig", pool.multisig);
    output::key_value("Last updated", pool.last_updated.to_rfc3339());
}
