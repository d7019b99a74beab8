//! Cursor walker: drives a [`PageFetcher`] in one direction until the
//! history runs out or a limit is reached.

use std::collections::HashSet;

use crate::models::message_set::sort_newest_first;
use crate::models::Message;
use crate::remote::{Direction, PageFetcher, MAX_PAGE_SIZE};
use crate::{Error, Result};

/// Where a walk starts and which way it goes.
///
/// `seed` of `None` means no boundary yet: the head of history when walking
/// older, the very beginning when walking newer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCursor {
    pub direction: Direction,
    pub seed: Option<String>,
}

impl SyncCursor {
    pub fn older(seed: Option<&str>) -> Self {
        Self {
            direction: Direction::Older,
            seed: seed.map(ToOwned::to_owned),
        }
    }

    pub fn newer(seed: Option<&str>) -> Self {
        Self {
            direction: Direction::Newer,
            seed: seed.map(ToOwned::to_owned),
        }
    }
}

/// Collect messages page by page from `cursor.seed` in `cursor.direction`.
///
/// Stops on an empty page, end-of-history, or once `limit` distinct messages
/// are collected. Duplicates keep their first copy. The result is sorted
/// newest first. A transient fetch failure ends the walk early with what was
/// collected so far; any other failure is returned.
pub async fn walk<F>(
    fetcher: &F,
    group_id: &str,
    cursor: &SyncCursor,
    page_size: usize,
    limit: Option<usize>,
) -> Result<Vec<Message>>
where
    F: PageFetcher + ?Sized,
{
    validate_page_size(page_size)?;

    let mut collected: Vec<Message> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut used_boundaries: HashSet<String> = cursor.seed.iter().cloned().collect();
    let mut boundary = cursor.seed.clone();
    let mut pages = 0usize;

    loop {
        let remaining = limit.map(|limit| limit.saturating_sub(collected.len()));
        if remaining == Some(0) {
            break;
        }
        let request_size = remaining.map_or(page_size, |remaining| remaining.min(page_size));

        let page = match fetcher
            .fetch_page(group_id, cursor.direction, boundary.as_deref(), request_size)
            .await
        {
            Ok(Some(page)) => page,
            Ok(None) => {
                tracing::debug!(group_id, direction = %cursor.direction, "End of history");
                break;
            }
            Err(error) if error.is_transient() => {
                tracing::warn!(
                    group_id,
                    direction = %cursor.direction,
                    collected = collected.len(),
                    %error,
                    "Walk stopped early on transient failure"
                );
                break;
            }
            Err(error) => return Err(error.into()),
        };
        pages += 1;

        let Some(last_id) = page.last().map(|message| message.id.clone()) else {
            break;
        };

        tracing::debug!(
            group_id,
            direction = %cursor.direction,
            page = pages,
            received = page.len(),
            "Fetched page"
        );

        for message in page {
            if limit.is_some_and(|limit| collected.len() >= limit) {
                break;
            }
            if seen_ids.insert(message.id.clone()) {
                collected.push(message);
            }
        }

        if !used_boundaries.insert(last_id.clone()) {
            tracing::warn!(
                group_id,
                direction = %cursor.direction,
                boundary = %last_id,
                "Remote repeated a page boundary; aborting walk"
            );
            break;
        }
        boundary = Some(last_id);
    }

    sort_newest_first(&mut collected);
    Ok(collected)
}

/// Reject page sizes the remote would refuse.
pub fn validate_page_size(page_size: usize) -> Result<()> {
    if (1..=MAX_PAGE_SIZE).contains(&page_size) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )))
    }
}
