//! Reputation ("social credit") scores awarded in replies and mentions.
//!
//! A message such as `+200 sc` or `- 1,000 social credit` that replies to or
//! mentions someone adjusts each target's score once.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::table::{write_table, Align};
use crate::models::{Group, Message};
use crate::Result;

static AWARD_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)([+-])\s*([\d,]+)\s*sc").expect("Invalid regex"),
        Regex::new(r"(?i)([+-])\s*([\d,]+)\s*social\s*credit").expect("Invalid regex"),
    ]
});

/// A signed adjustment parsed from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award(pub i64);

/// Parse the first award in `text`, if any.
///
/// Thousands separators are accepted. Amounts that overflow are ignored.
#[must_use]
pub fn parse_award(text: &str) -> Option<Award> {
    let captures = AWARD_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))?;
    let amount: i64 = captures[2].replace(',', "").parse().ok()?;
    match &captures[1] {
        "-" => Some(Award(-amount)),
        _ => Some(Award(amount)),
    }
}

/// Scores per user id.
///
/// Every sender appears with at least zero. Replies to unknown or bot
/// messages award nobody; a user targeted both by reply and mention in the
/// same message is adjusted once.
#[must_use]
pub fn reputation_scores(messages: &[Message]) -> BTreeMap<String, i64> {
    let by_id: HashMap<&str, &Message> = messages
        .iter()
        .map(|message| (message.id.as_str(), message))
        .collect();

    let mut scores: BTreeMap<String, i64> = messages
        .iter()
        .filter(|message| !message.sender_id.is_empty())
        .map(|message| (message.sender_id.clone(), 0))
        .collect();

    for message in messages {
        let Some(text) = message.trimmed_text() else {
            continue;
        };
        if !message
            .attachments
            .iter()
            .any(|attachment| attachment.is_reply() || attachment.is_mention())
        {
            continue;
        }
        let Some(Award(amount)) = parse_award(text) else {
            continue;
        };

        let mut judged: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for attachment in &message.attachments {
            if attachment.is_reply() {
                let target = attachment
                    .reply_id
                    .as_deref()
                    .and_then(|id| by_id.get(id))
                    .filter(|replied| !replied.is_from_bot());
                if let Some(replied) = target {
                    judged.push(replied.user_id.as_str());
                }
            } else if attachment.is_mention() {
                judged.extend(attachment.user_ids.iter().map(String::as_str));
            }
        }

        for user_id in judged {
            if user_id.is_empty() || !seen.insert(user_id) {
                continue;
            }
            let score = scores.entry(user_id.to_string()).or_insert(0);
            *score = score.saturating_add(amount);
        }
    }

    scores
}

/// Non-zero scores, highest first, as a two-column table of display names.
pub fn scores_table(group: Option<&Group>, scores: &BTreeMap<String, i64>) -> Result<String> {
    let mut ranked: Vec<(&String, &i64)> = scores.iter().filter(|(_, score)| **score != 0).collect();
    ranked.sort_by(|(_, a), (_, b)| b.cmp(a));

    let rows: Vec<Vec<String>> = ranked
        .into_iter()
        .map(|(user_id, score)| {
            let name = group.map_or(user_id.as_str(), |group| group.display_name(user_id));
            vec![name.to_string(), score.to_string()]
        })
        .collect();
    write_table("Social Credit Scores", &rows, &[Align::Left, Align::Right])
}
