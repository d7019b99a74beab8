//! Message model, shaped after the remote API's JSON payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in a conversation.
///
/// Only `id`, `group_id`, `created_at` and `favorited_by` matter to the sync
/// engine; the remaining fields are carried for analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque identifier, unique within a conversation
    pub id: String,
    /// Conversation the message belongs to
    pub group_id: String,
    /// Server creation timestamp (Unix seconds), the ordering key
    pub created_at: i64,
    /// User ids that liked the message
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorited_by: Vec<String>,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_type: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub event: Option<Event>,
}

impl Message {
    /// Minimal message, used by callers that only care about sync fields.
    pub fn new(id: impl Into<String>, group_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            created_at,
            favorited_by: Vec::new(),
            sender_id: String::new(),
            sender_type: String::new(),
            user_id: String::new(),
            name: String::new(),
            text: None,
            system: false,
            platform: None,
            attachments: Vec::new(),
            event: None,
        }
    }

    /// Creation time as a UTC datetime
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    #[must_use]
    pub fn like_count(&self) -> usize {
        self.favorited_by.len()
    }

    #[must_use]
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.favorited_by.iter().any(|id| id == user_id)
    }

    #[must_use]
    pub fn is_from_bot(&self) -> bool {
        self.sender_type == "bot"
    }

    /// Trimmed text, `None` for empty or whitespace-only bodies
    #[must_use]
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    #[must_use]
    pub fn event_kind(&self) -> Option<&str> {
        self.event.as_ref().map(|event| event.kind.as_str())
    }
}

/// Attachment on a message (image, poll, reply, mentions, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub poll_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub reply_id: Option<String>,
    #[serde(default)]
    pub base_reply_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_ids: Vec<String>,
}

impl Attachment {
    #[must_use]
    pub fn is_image(&self) -> bool {
        has_text(self.url.as_deref())
    }

    #[must_use]
    pub fn is_poll(&self) -> bool {
        has_text(self.poll_id.as_deref())
    }

    #[must_use]
    pub fn is_reply(&self) -> bool {
        has_text(self.reply_id.as_deref())
    }

    #[must_use]
    pub fn is_mention(&self) -> bool {
        self.kind == "mentions" && self.user_ids.iter().any(|id| !id.trim().is_empty())
    }
}

/// System event attached to a message (membership changes, deletions, polls)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: EventData,
}

/// The subset of event payload fields used by analytics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub user: Option<EventUser>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub added_users: Vec<EventUser>,
    #[serde(default)]
    pub removed_user: Option<EventUser>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub deleter_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<PollOption>,
}

/// A user referenced from an event; the API sends numeric ids here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUser {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub nickname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub votes: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub voter_ids: Vec<String>,
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

/// The API sends `null` for empty arrays in several places.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_payload_with_nulls() {
        let payload = r#"{
            "id": "170000000000000001",
            "group_id": "1234",
            "created_at": 1700000000,
            "favorited_by": null,
            "sender_id": "42",
            "sender_type": "user",
            "user_id": "42",
            "name": "Ada",
            "text": "hello +200 sc",
            "system": false,
            "attachments": [
                {"type": "reply", "reply_id": "99", "base_reply_id": "99"},
                {"type": "mentions", "user_ids": ["7"], "loci": [[0, 3]]}
            ],
            "avatar_url": null
        }"#;

        let message: Message = serde_json::from_str(payload).unwrap();
        assert_eq!(message.id, "170000000000000001");
        assert!(message.favorited_by.is_empty());
        assert!(message.attachments[0].is_reply());
        assert!(message.attachments[1].is_mention());
        assert!(!message.attachments[1].is_reply());
        assert_eq!(message.trimmed_text(), Some("hello +200 sc"));
    }

    #[test]
    fn deserializes_event_payload() {
        let payload = r#"{
            "id": "2",
            "group_id": "1234",
            "created_at": 1700000001,
            "system": true,
            "event": {
                "type": "membership.nickname_changed",
                "data": {"user": {"id": 42, "nickname": "Ada"}, "name": "Countess"}
            }
        }"#;

        let message: Message = serde_json::from_str(payload).unwrap();
        assert_eq!(message.event_kind(), Some("membership.nickname_changed"));
        let data = &message.event.unwrap().data;
        assert_eq!(data.user.as_ref().map(|user| user.id), Some(42));
        assert_eq!(data.name.as_deref(), Some("Countess"));
    }

    #[test]
    fn liked_by_checks_membership() {
        let mut message = Message::new("1", "1234", 10);
        message.favorited_by = vec!["u1".to_string(), "u2".to_string()];
        assert!(message.is_liked_by("u2"));
        assert!(!message.is_liked_by("u3"));
        assert_eq!(message.like_count(), 2);
    }

    #[test]
    fn whitespace_text_is_treated_as_missing() {
        let mut message = Message::new("1", "1234", 10);
        message.text = Some("  \n ".to_string());
        assert_eq!(message.trimmed_text(), None);
    }
}
