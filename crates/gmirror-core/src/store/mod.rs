//! Durable per-conversation snapshots.
//!
//! Each conversation is stored as one JSON document tagged with a format
//! version. Anything that does not decode as the current version loads as an
//! empty state, which makes the next sync a full resync. Saves go through a
//! temp file and a rename so a crash never leaves a half-written snapshot in
//! place.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Group, MessageSet};
use crate::util::is_numeric_id;
use crate::{Error, Result};

const SNAPSHOT_EXTENSION: &str = "snapshot.json";

/// Everything known locally about one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub group_id: String,
    pub messages: MessageSet,
    pub group: Option<Group>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SyncState {
    /// State for a conversation that has never been synced.
    pub fn empty(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            messages: MessageSet::new(),
            group: None,
            last_synced_at: None,
        }
    }

    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.last_synced_at.is_none()
    }
}

/// On-disk envelope. Older or unknown `format_version` tags fail to decode.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "format_version")]
enum Snapshot {
    #[serde(rename = "2")]
    V2(SyncState),
}

/// Directory of conversation snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, group_id: &str) -> Result<PathBuf> {
        if !is_numeric_id(group_id) {
            return Err(Error::InvalidInput(format!(
                "group id '{group_id}' must be a non-empty decimal id"
            )));
        }
        Ok(self.root.join(format!("{group_id}.{SNAPSHOT_EXTENSION}")))
    }

    /// Load the snapshot for `group_id`.
    ///
    /// Missing, unreadable-as-current-format, or foreign snapshots all come
    /// back as [`SyncState::empty`]. Only IO failures other than "not found"
    /// are errors.
    pub fn load(&self, group_id: &str) -> Result<SyncState> {
        let path = self.path_for(group_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No snapshot yet");
                return Ok(SyncState::empty(group_id));
            }
            Err(error) => return Err(error.into()),
        };

        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(Snapshot::V2(state)) if state.group_id == group_id => {
                tracing::debug!(
                    path = %path.display(),
                    messages = state.messages.len(),
                    "Loaded snapshot"
                );
                Ok(state)
            }
            Ok(Snapshot::V2(state)) => {
                tracing::warn!(
                    path = %path.display(),
                    found = %state.group_id,
                    "Snapshot belongs to another conversation; starting fresh"
                );
                Ok(SyncState::empty(group_id))
            }
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "Snapshot is incompatible or corrupt; starting fresh"
                );
                Ok(SyncState::empty(group_id))
            }
        }
    }

    /// Persist `state`, replacing the previous snapshot atomically.
    pub fn save(&self, state: &SyncState) -> Result<()> {
        let path = self.path_for(&state.group_id)?;
        fs::create_dir_all(&self.root)?;

        let temp_path = self
            .root
            .join(format!(".{}.{}.tmp", state.group_id, Uuid::now_v7()));
        let result = write_snapshot(&temp_path, state).and_then(|()| {
            fs::rename(&temp_path, &path)?;
            sync_dir(&self.root)?;
            Ok(())
        });

        if result.is_err() {
            fs::remove_file(&temp_path).ok();
        } else {
            tracing::debug!(
                path = %path.display(),
                messages = state.messages.len(),
                "Saved snapshot"
            );
        }
        result
    }
}

fn write_snapshot(path: &Path, state: &SyncState) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &SnapshotRef::V2(state))?;
    writer.flush()?;
    let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()?;
    Ok(())
}

/// Flush directory metadata so a completed rename survives power loss.
#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Borrowing twin of [`Snapshot`] so saving does not clone the message set.
#[derive(Serialize)]
#[serde(tag = "format_version")]
enum SnapshotRef<'a> {
    #[serde(rename = "2")]
    V2(&'a SyncState),
}
