use std::path::Path;

use gmirror_core::analytics::{reputation_scores, scores_table};

use crate::commands::common::load_existing_snapshot;
use crate::error::CliError;

pub fn run_scores(data_dir: &Path, group_id: &str, as_json: bool) -> Result<(), CliError> {
    let state = load_existing_snapshot(data_dir, group_id)?;
    let scores = reputation_scores(state.messages.as_slice());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    if scores.values().all(|score| *score == 0) {
        println!("No social credit has changed hands yet.");
        return Ok(());
    }
    print!("{}", scores_table(state.group.as_ref(), &scores)?);
    Ok(())
}
