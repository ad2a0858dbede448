//! Riskline CLI - schedule risk forecasts over exported activity files

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{anomalies, forecast, hash, mitigate, risks, twin};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match &cli.command {
        cli::Commands::Forecast(args) => forecast::execute(args, &cli.global).await,
        cli::Commands::Risks(args) => risks::execute(args, &cli.global).await,
        cli::Commands::Anomalies(args) => anomalies::execute(args, &cli.global).await,
        cli::Commands::Mitigate(args) => mitigate::execute(args, &cli.global).await,
        cli::Commands::Twin(args) => twin::execute(args, &cli.global).await,
        cli::Commands::Hash(args) => hash::execute(args, &cli.global).await,
    }
}
