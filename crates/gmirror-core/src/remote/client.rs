//! HTTP client for the GroupMe v3 REST API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Direction, FetchError, FetchResult, GroupFetcher, PageFetcher, RateGate, MAX_PAGE_SIZE};
use crate::config::MirrorConfig;
use crate::models::{Group, Message};
use crate::util::{compact_text, is_http_url, is_numeric_id, normalize_text_option};
use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.groupme.com/v3";

const HTTP_TIMEOUT_SECS: u64 = 30;
const TOKEN_HEADER: &str = "X-Access-Token";

/// How a response status is handled by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// The remote has nothing more in the requested direction
    EndOfHistory,
    /// Worth retrying after the quiet period
    Transient,
    Unauthorized,
    Fatal,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::OK | StatusCode::ACCEPTED | StatusCode::CREATED => StatusClass::Success,
        StatusCode::NOT_MODIFIED | StatusCode::NO_CONTENT => StatusClass::EndOfHistory,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StatusClass::Unauthorized,
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => StatusClass::Transient,
        _ => StatusClass::Fatal,
    }
}

/// Authenticated API client.
///
/// Every request goes through the shared [`RateGate`]; clones share the gate.
#[derive(Clone)]
pub struct GroupMeClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
    gate: RateGate,
    retry_budget: u32,
}

impl std::fmt::Debug for GroupMeClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("GroupMeClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("retry_budget", &self.retry_budget)
            .finish_non_exhaustive()
    }
}

impl GroupMeClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        gate: RateGate,
        retry_budget: u32,
    ) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let token = normalize_text_option(Some(token.into()))
            .ok_or_else(|| Error::Config("API token must not be empty".to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|error| Error::Config(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            token,
            http,
            gate,
            retry_budget,
        })
    }

    /// Build a client from configuration; all clients built from the same
    /// gate are serialized together.
    pub fn from_config(config: &MirrorConfig, gate: RateGate) -> Result<Self> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| Error::Config("GROUPME_TOKEN is not set".to_string()))?;
        Self::new(config.api_url.clone(), token, gate, config.retry_budget)
    }

    pub const fn gate(&self) -> &RateGate {
        &self.gate
    }

    /// One page of the caller's groups (1-based page numbers).
    pub async fn list_groups(&self, page: u32, per_page: usize) -> FetchResult<Vec<Group>> {
        let query = [
            ("page", page.to_string()),
            ("per_page", per_page.min(MAX_PAGE_SIZE).to_string()),
        ];
        Ok(self
            .get_response::<Vec<Group>>("/groups", &query)
            .await?
            .unwrap_or_default())
    }

    /// Walk group pages until an empty one comes back.
    pub async fn list_all_groups(&self) -> FetchResult<Vec<Group>> {
        let mut groups = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.list_groups(page, MAX_PAGE_SIZE).await?;
            if batch.is_empty() {
                break;
            }
            groups.extend(batch);
            page += 1;
        }
        Ok(groups)
    }

    /// Groups the caller has left and can rejoin. The endpoint is not paged.
    pub async fn list_former_groups(&self) -> FetchResult<Vec<Group>> {
        Ok(self
            .get_response::<Vec<Group>>("/groups/former", &[])
            .await?
            .unwrap_or_default())
    }

    async fn get_response<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FetchResult<Option<T>> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt = 0;

        loop {
            let outcome = self.request_once::<T>(&url, query).await;
            match outcome {
                Err(FetchError::Transient(reason)) if attempt < self.retry_budget => {
                    attempt += 1;
                    tracing::debug!(path, attempt, %reason, "Retrying transient remote failure");
                }
                other => return other,
            }
        }
    }

    async fn request_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> FetchResult<Option<T>> {
        let _permit = self.gate.acquire().await;

        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        match classify_status(status) {
            StatusClass::Success => decode_envelope(&body),
            StatusClass::EndOfHistory => Ok(None),
            StatusClass::Transient => Err(FetchError::Transient(parse_api_error(status, &body))),
            StatusClass::Unauthorized => {
                Err(FetchError::Unauthorized(parse_api_error(status, &body)))
            }
            StatusClass::Fatal => Err(FetchError::Fatal(parse_api_error(status, &body))),
        }
    }
}

impl PageFetcher for GroupMeClient {
    async fn fetch_page(
        &self,
        group_id: &str,
        direction: Direction,
        boundary: Option<&str>,
        page_size: usize,
    ) -> FetchResult<Option<Vec<Message>>> {
        ensure_numeric("group id", group_id)?;
        let mut query = vec![("limit", page_size.clamp(1, MAX_PAGE_SIZE).to_string())];
        match (direction, boundary) {
            (direction, Some(boundary)) => {
                ensure_numeric("boundary id", boundary)?;
                query.push((direction.query_key(), boundary.to_string()));
            }
            // Walking forward from nothing starts at the beginning of history.
            (Direction::Newer, None) => query.push((Direction::Newer.query_key(), "0".to_string())),
            (Direction::Older, None) => {}
        }

        let page = self
            .get_response::<MessagePage>(&format!("/groups/{group_id}/messages"), &query)
            .await?;
        Ok(page.map(|page| page.messages))
    }
}

impl GroupFetcher for GroupMeClient {
    async fn fetch_group(&self, group_id: &str) -> FetchResult<Group> {
        ensure_numeric("group id", group_id)?;
        self.get_response::<Group>(&format!("/groups/{group_id}"), &[])
            .await?
            .ok_or_else(|| FetchError::Fatal(format!("group {group_id} returned no payload")))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    meta: Option<ErrorMeta>,
}

#[derive(Debug, Deserialize)]
struct ErrorMeta {
    #[serde(default)]
    errors: Vec<String>,
}

fn decode_envelope<T: DeserializeOwned>(body: &str) -> FetchResult<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.response)
        .map_err(|error| FetchError::Fatal(format!("malformed response: {error}")))
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(meta) = payload.meta.filter(|meta| !meta.errors.is_empty()) {
            return format!("{} ({})", meta.errors.join("; "), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{trimmed} ({})", status.as_u16())
    }
}

fn classify_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() || error.is_connect() {
        FetchError::Transient(error.to_string())
    } else {
        FetchError::Fatal(error.to_string())
    }
}

fn ensure_numeric(label: &str, value: &str) -> FetchResult<()> {
    if is_numeric_id(value) {
        Ok(())
    } else {
        Err(FetchError::Fatal(format!(
            "{label} '{value}' contained non-numeric characters"
        )))
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("API URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "API URL must include http:// or https://".to_string(),
        ))
    }
}
