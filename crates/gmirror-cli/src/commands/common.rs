use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use gmirror_core::config::MirrorConfig;
use gmirror_core::remote::{GroupMeClient, RateGate};
use gmirror_core::store::{SnapshotStore, SyncState};
use gmirror_core::util::normalize_text_option;
use gmirror_core::{Group, Message};
use serde::Serialize;

use crate::error::CliError;

const PREVIEW_CHARS: usize = 120;

/// Environment configuration with command-line overrides applied.
pub fn resolve_config(
    cli_token: Option<String>,
    cli_data_dir: Option<PathBuf>,
) -> Result<MirrorConfig, CliError> {
    let config = MirrorConfig::from_env()?;
    apply_overrides(config, cli_token, cli_data_dir)
}

pub fn apply_overrides(
    mut config: MirrorConfig,
    cli_token: Option<String>,
    cli_data_dir: Option<PathBuf>,
) -> Result<MirrorConfig, CliError> {
    if let Some(token) = normalize_text_option(cli_token) {
        config.token = Some(token);
    }
    if let Some(data_dir) = cli_data_dir {
        config.data_dir = Some(data_dir);
    }
    config.validate()?;
    Ok(config)
}

pub fn resolve_data_dir(config: &MirrorConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(default_data_dir)
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gmirror")
}

/// HTTP client for commands that talk to the remote.
pub fn build_client(config: &MirrorConfig) -> Result<GroupMeClient, CliError> {
    config.require_token()?;
    let gate = RateGate::new(config.quiet_period);
    Ok(GroupMeClient::from_config(config, gate)?)
}

/// Stored state for commands that only read the mirror.
pub fn load_existing_snapshot(data_dir: &Path, group_id: &str) -> Result<SyncState, CliError> {
    let state = SnapshotStore::new(data_dir).load(group_id)?;
    if state.is_fresh() && state.messages.is_empty() {
        return Err(CliError::NoSnapshot(group_id.to_string()));
    }
    Ok(state)
}

pub fn format_message_line(group: Option<&Group>, message: &Message) -> String {
    let timestamp = message
        .created_at_utc()
        .map(|created| DateTime::<Local>::from(created).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let sender = if message.name.trim().is_empty() {
        group.map_or(message.sender_id.as_str(), |group| {
            group.display_name(&message.sender_id)
        })
    } else {
        message.name.as_str()
    };
    let text = message
        .trimmed_text()
        .map_or_else(|| "<no text>".to_string(), |text| preview(text, PREVIEW_CHARS));
    let likes = match message.like_count() {
        0 => String::new(),
        count => format!(" (+{count})"),
    };
    format!("[{timestamp}] {sender}: {text}{likes}")
}

fn preview(text: &str, max_chars: usize) -> String {
    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() > max_chars {
        let mut cut: String = compact.chars().take(max_chars.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        compact
    }
}

#[derive(Debug, Serialize)]
pub struct GroupListItem {
    pub id: String,
    pub name: String,
    pub members: usize,
    pub updated_at: i64,
}

pub fn group_to_list_item(group: &Group) -> GroupListItem {
    GroupListItem {
        id: group.id.clone(),
        name: group.name.clone(),
        members: group.members.len(),
        updated_at: group.updated_at,
    }
}

pub fn format_group_line(group: &Group) -> String {
    format!("{}: {}", group.name, group.id)
}
