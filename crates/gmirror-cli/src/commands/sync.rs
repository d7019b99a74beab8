use std::path::Path;

use gmirror_core::config::MirrorConfig;
use gmirror_core::store::SnapshotStore;
use gmirror_core::sync::{MessageSync, SyncOptions, SyncReport};

use crate::commands::common::build_client;
use crate::error::CliError;

pub async fn run_sync(
    config: &MirrorConfig,
    data_dir: &Path,
    group_id: &str,
    backfill: bool,
    force_refresh: Option<usize>,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let client = build_client(config)?;
    let store = SnapshotStore::new(data_dir);
    let mut state = store.load(group_id)?;
    let options = sync_options(config, backfill, force_refresh, limit);

    let engine = MessageSync::new(&client, group_id)?;
    let report = engine.run(&mut state, &options).await?;
    store.save(&state)?;

    let name = state
        .group
        .as_ref()
        .map_or(group_id, |group| group.name.as_str());
    println!("{}", format_sync_summary(name, &report));
    Ok(())
}

pub fn sync_options(
    config: &MirrorConfig,
    backfill: bool,
    force_refresh: Option<usize>,
    limit: Option<usize>,
) -> SyncOptions {
    SyncOptions::from_config(config)
        .with_backfill(backfill)
        .with_force_refresh(force_refresh.unwrap_or(config.force_refresh))
        .with_pull_limit(limit)
}

pub fn format_sync_summary(name: &str, report: &SyncReport) -> String {
    format!(
        "Synced {name}: {} new, {} older, {} refreshed, {} total",
        report.new_messages.len(),
        report.older_fetched,
        report.refreshed,
        report.total
    )
}
