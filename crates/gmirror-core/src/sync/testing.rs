//! In-memory remotes for sync tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::{Group, Message};
use crate::remote::{Direction, FetchError, FetchResult, GroupFetcher, PageFetcher};

pub const GROUP_ID: &str = "1";

pub fn message(id: &str, created_at: i64) -> Message {
    Message::new(id, GROUP_ID, created_at)
}

pub fn liked(id: &str, created_at: i64, likers: &[&str]) -> Message {
    let mut message = message(id, created_at);
    message.favorited_by = likers.iter().map(|liker| (*liker).to_string()).collect();
    message
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub direction: Direction,
    pub boundary: Option<String>,
    pub page_size: usize,
}

/// Replays a fixed list of responses, then reports end-of-history.
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<FetchResult<Option<Vec<Message>>>>>,
    repeat: Option<Vec<Message>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<FetchResult<Option<Vec<Message>>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the same page forever.
    pub fn repeating(page: Vec<Message>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            repeat: Some(page),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn boundaries(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.boundary.clone())
            .collect()
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.direction)
            .collect()
    }

    pub fn page_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.page_size)
            .collect()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(
        &self,
        _group_id: &str,
        direction: Direction,
        boundary: Option<&str>,
        page_size: usize,
    ) -> FetchResult<Option<Vec<Message>>> {
        self.calls.lock().unwrap().push(Call {
            direction,
            boundary: boundary.map(ToOwned::to_owned),
            page_size,
        });
        if let Some(page) = &self.repeat {
            return Ok(Some(page.clone()));
        }
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// A server holding one linear history, paging the way the real API does:
/// `Older` pages come newest first, `Newer` pages oldest first.
pub struct FakeRemote {
    history: Mutex<Vec<Message>>,
    group: Group,
    fail_next: Mutex<VecDeque<(Direction, FetchError)>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRemote {
    pub fn new(messages: Vec<Message>) -> Self {
        let mut history = messages;
        history.sort_by_key(|message| message.created_at);
        Self {
            history: Mutex::new(history),
            group: Group {
                id: GROUP_ID.to_string(),
                name: "Test group".to_string(),
                ..Default::default()
            },
            fail_next: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn post(&self, message: Message) {
        let mut history = self.history.lock().unwrap();
        history.push(message);
        history.sort_by_key(|message| message.created_at);
    }

    pub fn like(&self, id: &str, user_id: &str) {
        let mut history = self.history.lock().unwrap();
        if let Some(message) = history.iter_mut().find(|message| message.id == id) {
            message.favorited_by.push(user_id.to_string());
        }
    }

    /// Fail the next page request in `direction`.
    pub fn fail_next(&self, direction: Direction, error: FetchError) {
        self.fail_next.lock().unwrap().push_back((direction, error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl PageFetcher for FakeRemote {
    async fn fetch_page(
        &self,
        _group_id: &str,
        direction: Direction,
        boundary: Option<&str>,
        page_size: usize,
    ) -> FetchResult<Option<Vec<Message>>> {
        self.calls.lock().unwrap().push(Call {
            direction,
            boundary: boundary.map(ToOwned::to_owned),
            page_size,
        });

        {
            let mut failures = self.fail_next.lock().unwrap();
            if let Some(index) = failures.iter().position(|(dir, _)| *dir == direction) {
                if let Some((_, error)) = failures.remove(index) {
                    return Err(error);
                }
            }
        }

        let history = self.history.lock().unwrap();
        let position = |id: &str| history.iter().position(|message| message.id == id);
        let page: Vec<Message> = match (direction, boundary) {
            (Direction::Older, boundary) => {
                let end = match boundary {
                    Some(id) => position(id).unwrap_or(0),
                    None => history.len(),
                };
                let start = end.saturating_sub(page_size);
                history[start..end].iter().rev().cloned().collect()
            }
            (Direction::Newer, boundary) => {
                let start = match boundary {
                    Some(id) => position(id).map_or(history.len(), |index| index + 1),
                    None => 0,
                };
                let end = (start + page_size).min(history.len());
                history[start..end].to_vec()
            }
        };
        Ok(Some(page))
    }
}

impl GroupFetcher for FakeRemote {
    async fn fetch_group(&self, _group_id: &str) -> FetchResult<Group> {
        Ok(self.group.clone())
    }
}
