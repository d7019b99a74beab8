//! Remote message source: fetcher contracts, the shared rate gate and the
//! HTTP client for the GroupMe v3 API.

mod client;
mod gate;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Group, Message};

pub use client::{classify_status, GroupMeClient, StatusClass, DEFAULT_API_URL};
pub use gate::{GatePermit, RateGate, DEFAULT_QUIET_PERIOD};

/// Largest page the remote API will serve.
pub const MAX_PAGE_SIZE: usize = 100;

/// Temporal direction of a paged fetch, relative to the boundary message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Messages created before the boundary (`before_id`)
    Older,
    /// Messages created after the boundary (`after_id`)
    Newer,
}

impl Direction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Older => "older",
            Self::Newer => "newer",
        }
    }

    /// Query parameter carrying the boundary id
    pub const fn query_key(self) -> &'static str {
        match self {
            Self::Older => "before_id",
            Self::Newer => "after_id",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure reported by a fetcher after its own retry budget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Timeout, rate limit or gateway failure; safe to try again later
    #[error("transient remote failure: {0}")]
    Transient(String),
    /// Credentials rejected
    #[error("remote rejected credentials: {0}")]
    Unauthorized(String),
    /// Malformed response or unexpected status
    #[error("remote failure: {0}")]
    Fatal(String),
}

impl FetchError {
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Source of message pages.
///
/// `Ok(None)` means the remote signalled end-of-history; `Ok(Some(vec![]))`
/// is an empty page. Within a page the last message is the one furthest from
/// the boundary in the requested direction.
pub trait PageFetcher {
    fn fetch_page(
        &self,
        group_id: &str,
        direction: Direction,
        boundary: Option<&str>,
        page_size: usize,
    ) -> impl Future<Output = FetchResult<Option<Vec<Message>>>> + Send;
}

/// Source of conversation metadata.
pub trait GroupFetcher {
    fn fetch_group(&self, group_id: &str) -> impl Future<Output = FetchResult<Group>> + Send;
}
