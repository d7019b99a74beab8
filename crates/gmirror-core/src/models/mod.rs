//! Data models for gmirror

mod group;
mod message;
pub(crate) mod message_set;

pub use group::{Group, GroupMember};
pub use message::{Attachment, Event, EventData, EventUser, Message, PollOption};
pub use message_set::MessageSet;
