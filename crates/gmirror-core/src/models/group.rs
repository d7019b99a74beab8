//! Conversation metadata snapshot

use serde::{Deserialize, Serialize};

/// A conversation as reported by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creator_user_id: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl Group {
    /// Look up a member by user id
    #[must_use]
    pub fn member(&self, user_id: &str) -> Option<&GroupMember> {
        self.members.iter().find(|member| member.user_id == user_id)
    }

    /// Display name for a user id, falling back to the id itself
    #[must_use]
    pub fn display_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.member(user_id)
            .map_or(user_id, |member| member.name.as_str())
    }
}

/// A member of a conversation.
///
/// `user_id` is the account id used in messages; `id` is the membership id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}
