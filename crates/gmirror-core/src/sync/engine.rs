//! One sync cycle for one conversation.

use chrono::Utc;

use super::merge::merge;
use super::walker::{validate_page_size, walk, SyncCursor};
use crate::config::{MirrorConfig, DEFAULT_FORCE_REFRESH};
use crate::models::Message;
use crate::remote::{GroupFetcher, PageFetcher, MAX_PAGE_SIZE};
use crate::store::SyncState;
use crate::util::is_numeric_id;
use crate::{Error, Result};

/// Tuning for a sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Messages requested per page, 1..=100
    pub page_size: usize,
    /// Cap on messages collected by the older and newer walks
    pub pull_limit: Option<usize>,
    /// Walk back from the oldest stored message to the start of history
    pub backfill: bool,
    /// Size of the re-fetch window over recent messages; 0 disables it
    pub force_refresh: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            pull_limit: None,
            backfill: false,
            force_refresh: DEFAULT_FORCE_REFRESH,
        }
    }
}

impl SyncOptions {
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self {
            page_size: config.page_size,
            force_refresh: config.force_refresh,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_backfill(mut self, backfill: bool) -> Self {
        self.backfill = backfill;
        self
    }

    #[must_use]
    pub const fn with_force_refresh(mut self, force_refresh: usize) -> Self {
        self.force_refresh = force_refresh;
        self
    }

    #[must_use]
    pub const fn with_pull_limit(mut self, pull_limit: Option<usize>) -> Self {
        self.pull_limit = pull_limit;
        self
    }
}

/// What a successful cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Messages found before the previously oldest one
    pub older_fetched: usize,
    /// Messages re-fetched by the force-refresh window
    pub refreshed: usize,
    /// Size of the canonical set after the merge
    pub total: usize,
    /// Messages discovered after the previously newest one, newest first
    pub new_messages: Vec<Message>,
}

/// Sync engine bound to one conversation and one remote.
pub struct MessageSync<'a, F> {
    remote: &'a F,
    group_id: String,
}

impl<'a, F> MessageSync<'a, F>
where
    F: PageFetcher + GroupFetcher,
{
    pub fn new(remote: &'a F, group_id: impl Into<String>) -> Result<Self> {
        let group_id = group_id.into();
        if !is_numeric_id(&group_id) {
            return Err(Error::InvalidInput(format!(
                "group id '{group_id}' must be a non-empty decimal id"
            )));
        }
        Ok(Self { remote, group_id })
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Run one cycle against `state`.
    ///
    /// `state` is only written after every walk and the merge have finished,
    /// so an error (or dropping the future) leaves it exactly as it was.
    pub async fn run(&self, state: &mut SyncState, options: &SyncOptions) -> Result<SyncReport> {
        self.check_state(state)?;
        validate_page_size(options.page_size)?;

        let group_id = self.group_id.as_str();
        let existing = &state.messages;

        let group = match self.remote.fetch_group(group_id).await {
            Ok(group) => Some(group),
            Err(error) if error.is_transient() => {
                tracing::warn!(group_id, %error, "Keeping previous group metadata");
                state.group.clone()
            }
            Err(error) => return Err(error.into()),
        };

        let backfill = options.backfill || existing.is_empty();
        let older = if backfill {
            let seed = existing.oldest().map(|message| message.id.as_str());
            walk(
                self.remote,
                group_id,
                &SyncCursor::older(seed),
                options.page_size,
                options.pull_limit,
            )
            .await?
        } else {
            Vec::new()
        };

        let newest_known = match (existing.newest(), older.first()) {
            (Some(stored), Some(walked)) if walked.created_at > stored.created_at => Some(walked),
            (Some(stored), _) => Some(stored),
            (None, walked) => walked,
        };
        let newer = walk(
            self.remote,
            group_id,
            &SyncCursor::newer(newest_known.map(|message| message.id.as_str())),
            options.page_size,
            options.pull_limit,
        )
        .await?;

        let forced = match (options.force_refresh, newer.last(), newest_known) {
            (0, _, _) | (_, None, None) => Vec::new(),
            (_, Some(oldest_new), _) => {
                walk(
                    self.remote,
                    group_id,
                    &SyncCursor::older(Some(oldest_new.id.as_str())),
                    options.page_size,
                    Some(options.force_refresh),
                )
                .await?
            }
            (_, None, Some(newest)) => self.refresh_below(newest, options).await?,
        };

        let older_fetched = older.len();
        let refreshed = forced.len();
        let new_messages = newer.clone();
        let merged = merge(existing, older, newer, forced);

        tracing::info!(
            group_id,
            older = older_fetched,
            newer = new_messages.len(),
            refreshed,
            total = merged.len(),
            "Sync cycle complete"
        );

        let report = SyncReport {
            older_fetched,
            refreshed,
            total: merged.len(),
            new_messages,
        };

        state.messages = merged;
        state.group = group;
        state.last_synced_at = Some(Utc::now());
        Ok(report)
    }

    /// Force-refresh window when nothing new arrived: the `force_refresh`
    /// messages below `newest`, plus `newest` itself re-read through a
    /// one-message `Newer` fetch from the message just below it.
    ///
    /// The window never starts above `newest`, so a newer walk that failed
    /// transiently cannot leave a hole between `newest` and the server head.
    async fn refresh_below(
        &self,
        newest: &Message,
        options: &SyncOptions,
    ) -> Result<Vec<Message>> {
        let group_id = self.group_id.as_str();
        let mut window = walk(
            self.remote,
            group_id,
            &SyncCursor::older(Some(newest.id.as_str())),
            options.page_size,
            Some(options.force_refresh),
        )
        .await?;

        let Some(below) = window.first().map(|message| message.id.clone()) else {
            return Ok(window);
        };
        let head = walk(
            self.remote,
            group_id,
            &SyncCursor::newer(Some(below.as_str())),
            options.page_size,
            Some(1),
        )
        .await?;
        let mut refreshed: Vec<Message> = head
            .into_iter()
            .filter(|message| message.id == newest.id)
            .collect();
        refreshed.append(&mut window);
        Ok(refreshed)
    }

    fn check_state(&self, state: &SyncState) -> Result<()> {
        if state.group_id != self.group_id {
            return Err(Error::ConversationMismatch {
                expected: self.group_id.clone(),
                found: state.group_id.clone(),
            });
        }
        if let Some(stray) = state
            .messages
            .iter()
            .find(|message| message.group_id != self.group_id)
        {
            return Err(Error::ConversationMismatch {
                expected: self.group_id.clone(),
                found: stray.group_id.clone(),
            });
        }
        Ok(())
    }
}
