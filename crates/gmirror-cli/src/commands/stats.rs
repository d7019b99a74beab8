use std::path::Path;

use chrono::Utc;
use gmirror_core::analytics::{render_standard_report, user_summary, ReportContext};

use crate::commands::common::load_existing_snapshot;
use crate::error::CliError;

pub async fn run_stats(
    data_dir: &Path,
    group_id: &str,
    parallelism: Option<usize>,
    user_id: Option<&str>,
) -> Result<(), CliError> {
    let state = load_existing_snapshot(data_dir, group_id)?;
    let group = state.group.unwrap_or_default();
    let messages = state.messages.into_vec();

    if let Some(user_id) = user_id {
        print!("{}", user_summary(&group, &messages, user_id));
        return Ok(());
    }

    let context = ReportContext {
        group,
        messages,
        now: Utc::now().timestamp(),
    };
    let parallelism = parallelism.unwrap_or_else(default_parallelism);
    let report = render_standard_report(context, parallelism).await?;
    print!("{report}");
    Ok(())
}

/// One fewer than the available cores, at least one.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map_or(1, |cores| cores.get().saturating_sub(1))
        .max(1)
}
