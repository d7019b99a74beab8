//! gmirror - keep a local mirror of a group conversation and report on it.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::{resolve_config, resolve_data_dir};
use crate::commands::completions::run_completions;
use crate::commands::groups::run_groups;
use crate::commands::scores::run_scores;
use crate::commands::stats::run_stats;
use crate::commands::sync::run_sync;
use crate::commands::watch::{run_watch, WatchOptions};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "gmirror=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let config = resolve_config(cli.token, cli.data_dir)?;
    let data_dir = resolve_data_dir(&config);

    match cli.command {
        Commands::Groups {
            limit,
            json,
            former,
        } => run_groups(&config, limit, json, former).await?,
        Commands::Sync {
            group_id,
            backfill,
            force_refresh,
            limit,
        } => {
            run_sync(
                &config,
                &data_dir,
                &group_id,
                backfill,
                force_refresh,
                limit,
            )
            .await?;
        }
        Commands::Watch {
            group_id,
            interval,
            cycles,
            force_refresh,
        } => {
            let options = WatchOptions {
                interval_secs: interval,
                cycles,
                force_refresh,
            };
            run_watch(&config, &data_dir, &group_id, &options).await?;
        }
        Commands::Stats {
            group_id,
            parallelism,
            user,
        } => run_stats(&data_dir, &group_id, parallelism, user.as_deref()).await?,
        Commands::Scores { group_id, json } => run_scores(&data_dir, &group_id, json)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
