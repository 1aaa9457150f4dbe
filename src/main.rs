use clap::Parser;
use lendscore::cli::{self, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score(args) => cli::score::execute(&args).await?,
        Commands::Check(CheckCommand::Config(arg)) => cli::check::execute_config(&arg.config)?,
    }
    Ok(())
}
