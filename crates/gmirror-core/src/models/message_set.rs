//! Id-unique, time-ordered collection of messages

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Message;

/// Messages keyed by id, kept sorted descending by `created_at`.
///
/// Ties on `created_at` keep the order in which messages were inserted.
/// Serialized as a plain array; deserialization re-applies both invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Message>", into = "Vec<Message>")]
pub struct MessageSet {
    messages: Vec<Message>,
}

impl MessageSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Build a set from messages in any order.
    ///
    /// The first copy of a duplicated id wins.
    pub fn from_unsorted(messages: impl IntoIterator<Item = Message>) -> Self {
        let mut seen = HashSet::new();
        let mut messages: Vec<Message> = messages
            .into_iter()
            .filter(|message| seen.insert(message.id.clone()))
            .collect();
        sort_newest_first(&mut messages);
        Self { messages }
    }

    /// Wrap messages that already satisfy the set invariants.
    pub(crate) fn from_sorted_unique(messages: Vec<Message>) -> Self {
        debug_assert!(messages
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
        Self { messages }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages, newest first
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Most recent message by `created_at`
    #[must_use]
    pub fn newest(&self) -> Option<&Message> {
        self.messages.first()
    }

    /// Oldest message by `created_at`
    #[must_use]
    pub fn oldest(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for MessageSet {
    fn from(messages: Vec<Message>) -> Self {
        Self::from_unsorted(messages)
    }
}

impl From<MessageSet> for Vec<Message> {
    fn from(set: MessageSet) -> Self {
        set.messages
    }
}

impl<'a> IntoIterator for &'a MessageSet {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Stable sort, descending by creation time.
pub(crate) fn sort_newest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
