//! Leaderboards and the per-user statistics they rank.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Display;

use super::table::{write_table, Align};
use crate::models::{Group, GroupMember, Message};
use crate::Result;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

const SECONDS_PER_DAY: i64 = 86_400;
const NICKNAME_CHANGED: &str = "membership.nickname_changed";

/// Rank every member of `group` by `score` and render the top `size`.
///
/// Ties keep member order. `align` applies to the score column.
pub fn leaderboard_by_user<S, F>(
    title: &str,
    group: &Group,
    messages: &[Message],
    score: F,
    align: Align,
    size: usize,
) -> Result<String>
where
    S: PartialOrd + Display,
    F: Fn(&GroupMember, &[Message]) -> S,
{
    let mut ranked: Vec<(&GroupMember, S)> = group
        .members
        .iter()
        .map(|member| (member, score(member, messages)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| descending(a, b));

    let rows: Vec<Vec<String>> = ranked
        .into_iter()
        .take(size)
        .map(|(member, score)| vec![member.name.clone(), score.to_string()])
        .collect();
    write_table(title, &rows, &[Align::Right, align])
}

/// Rank individual messages by `score` and render the top `size` with their
/// date, sender and text.
pub fn leaderboard_by_message<S, F>(
    title: &str,
    group: &Group,
    messages: &[Message],
    score: F,
    size: usize,
) -> Result<String>
where
    S: PartialOrd + Display,
    F: Fn(&Message) -> S,
{
    let mut ranked: Vec<(&Message, S)> = messages
        .iter()
        .map(|message| (message, score(message)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| descending(a, b));

    let rows: Vec<Vec<String>> = ranked
        .into_iter()
        .take(size)
        .enumerate()
        .map(|(index, (message, score))| {
            let sender = group
                .member(&message.user_id)
                .map(|member| member.name.as_str())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or("<User not in group>");
            vec![
                format!("#{}", index + 1),
                short_date(message),
                sender.to_string(),
                score.to_string(),
                message.text.clone().unwrap_or_default(),
            ]
        })
        .collect();
    write_table(
        title,
        &rows,
        &[Align::Right, Align::Right, Align::Left, Align::Right, Align::Left],
    )
}

fn descending<S: PartialOrd>(a: &S, b: &S) -> Ordering {
    b.partial_cmp(a).unwrap_or(Ordering::Equal)
}

fn short_date(message: &Message) -> String {
    message
        .created_at_utc()
        .map(|date| date.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[must_use]
pub fn posts_by(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| message.sender_id == user_id)
        .count()
}

#[must_use]
pub fn likes_received(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| message.sender_id == user_id)
        .map(Message::like_count)
        .sum()
}

#[must_use]
pub fn likes_given(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| message.is_liked_by(user_id))
        .count()
}

/// Likes received per like given, rounded to three places. A user who never
/// liked anything scores their raw received count.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn like_ratio(user_id: &str, messages: &[Message]) -> f64 {
    let received = likes_received(user_id, messages) as f64;
    let given = likes_given(user_id, messages);
    if given == 0 {
        received
    } else {
        round3(received / given as f64)
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_likes(user_id: &str, messages: &[Message]) -> f64 {
    let posts = posts_by(user_id, messages);
    if posts == 0 {
        return 0.0;
    }
    round3(likes_received(user_id, messages) as f64 / posts as f64)
}

/// Whole days between `now` and the user's most recent activity (a post, a
/// like, or being added to the group). Zero when there is no activity.
#[must_use]
pub fn days_inactive(user_id: &str, messages: &[Message], now: i64) -> i64 {
    messages
        .iter()
        .filter(|message| represents_activity(user_id, message))
        .map(|message| (now - message.created_at) / SECONDS_PER_DAY)
        .min()
        .unwrap_or(0)
}

fn represents_activity(user_id: &str, message: &Message) -> bool {
    message.sender_id == user_id
        || message.is_liked_by(user_id)
        || message.event.as_ref().is_some_and(|event| {
            event
                .data
                .added_users
                .iter()
                .any(|user| user.id.to_string() == user_id)
        })
}

#[must_use]
pub fn times_mentioned(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| {
            message.attachments.iter().any(|attachment| {
                attachment.kind == "mentions" && attachment.user_ids.iter().any(|id| id == user_id)
            })
        })
        .count()
}

/// Number of distinct nicknames the user switched to.
#[must_use]
pub fn distinct_nicknames(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter_map(|message| message.event.as_ref())
        .filter(|event| event.kind == NICKNAME_CHANGED)
        .filter(|event| {
            event
                .data
                .user
                .as_ref()
                .is_some_and(|user| user.id.to_string() == user_id)
        })
        .filter_map(|event| event.data.name.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

#[must_use]
pub fn polls_created(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| message.sender_id == user_id)
        .filter(|message| message.attachments.iter().any(|attachment| attachment.is_poll()))
        .count()
}

#[must_use]
pub fn polls_answered(user_id: &str, messages: &[Message]) -> usize {
    messages
        .iter()
        .filter_map(|message| message.event.as_ref())
        .filter(|event| {
            event
                .data
                .options
                .iter()
                .any(|option| option.voter_ids.iter().any(|id| id == user_id))
        })
        .count()
}
