use std::path::Path;
use std::time::Duration;

use gmirror_core::config::MirrorConfig;
use gmirror_core::store::SnapshotStore;
use gmirror_core::sync::MessageSync;
use gmirror_core::{Group, Message};

use crate::commands::common::{build_client, format_message_line};
use crate::commands::sync::sync_options;
use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub interval_secs: u64,
    pub cycles: Option<usize>,
    pub force_refresh: Option<usize>,
}

/// Sync in a loop, saving after every successful cycle.
///
/// Transient trouble inside a cycle only shortens that cycle's walks; a
/// fatal error ends the watch. Ctrl-C ends it between or during cycles, and
/// an interrupted cycle is never saved.
pub async fn run_watch(
    config: &MirrorConfig,
    data_dir: &Path,
    group_id: &str,
    options: &WatchOptions,
) -> Result<(), CliError> {
    if options.interval_secs == 0 {
        return Err(CliError::InvalidInterval);
    }

    let client = build_client(config)?;
    let store = SnapshotStore::new(data_dir);
    let mut state = store.load(group_id)?;
    let cycle_options = sync_options(config, false, options.force_refresh, None);
    let engine = MessageSync::new(&client, group_id)?;
    let interval = Duration::from_secs(options.interval_secs);

    let mut completed = 0usize;
    loop {
        tokio::select! {
            result = engine.run(&mut state, &cycle_options) => {
                let report = result?;
                store.save(&state)?;
                for line in new_message_lines(state.group.as_ref(), &report.new_messages) {
                    println!("{line}");
                }
                tracing::debug!(
                    group_id,
                    cycle = completed + 1,
                    total = report.total,
                    "Watch cycle saved"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(group_id, "Interrupted; last saved snapshot kept");
                return Ok(());
            }
        }

        completed += 1;
        if options.cycles.is_some_and(|cycles| completed >= cycles) {
            return Ok(());
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(group_id, "Interrupted");
                return Ok(());
            }
        }
    }
}

/// Lines for newly discovered human messages, oldest first.
pub fn new_message_lines(group: Option<&Group>, new_messages: &[Message]) -> Vec<String> {
    new_messages
        .iter()
        .rev()
        .filter(|message| !message.is_from_bot())
        .map(|message| format_message_line(group, message))
        .collect()
}
