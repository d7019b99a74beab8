//! Merge of a persisted message set with freshly walked ranges.

use std::collections::HashMap;

use crate::models::message_set::sort_newest_first;
use crate::models::{Message, MessageSet};

/// Combine the persisted set with the results of one sync cycle.
///
/// Groups are applied in the order `existing`, `older`, `newer`, `forced`.
/// A later copy of an id replaces the earlier one but keeps the slot where
/// the id first appeared, so ties on `created_at` stay stable across runs.
/// `forced` is therefore authoritative, and walked data beats the snapshot.
pub fn merge(
    existing: &MessageSet,
    older: Vec<Message>,
    newer: Vec<Message>,
    forced: Vec<Message>,
) -> MessageSet {
    let capacity = existing.len() + older.len() + newer.len();
    let mut merged: Vec<Message> = Vec::with_capacity(capacity);
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(capacity);

    let mut upsert = |message: Message| match slots.get(&message.id) {
        Some(&slot) => merged[slot] = message,
        None => {
            slots.insert(message.id.clone(), merged.len());
            merged.push(message);
        }
    };

    existing.iter().cloned().for_each(&mut upsert);
    older.into_iter().for_each(&mut upsert);
    newer.into_iter().for_each(&mut upsert);
    forced.into_iter().for_each(&mut upsert);

    sort_newest_first(&mut merged);
    MessageSet::from_sorted_unique(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{liked, message};
    use pretty_assertions::assert_eq;

    fn ids(set: &MessageSet) -> Vec<&str> {
        set.iter().map(|message| message.id.as_str()).collect()
    }

    #[test]
    fn appends_newer_messages_in_order() {
        let existing = MessageSet::from_unsorted(vec![message("A", 100), message("B", 200)]);

        let merged = merge(&existing, vec![], vec![message("C", 300)], vec![]);

        assert_eq!(ids(&merged), vec!["C", "B", "A"]);
    }

    #[test]
    fn forced_copy_replaces_existing() {
        let existing = MessageSet::from_unsorted(vec![message("A", 100)]);

        let merged = merge(&existing, vec![], vec![], vec![liked("A", 100, &["u1"])]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("A").unwrap().favorited_by, vec!["u1"]);
    }

    #[test]
    fn forced_wins_over_newer() {
        let merged = merge(
            &MessageSet::new(),
            vec![],
            vec![liked("A", 100, &["u1"])],
            vec![liked("A", 100, &["u1", "u2"])],
        );

        assert_eq!(merged.get("A").unwrap().like_count(), 2);
    }

    #[test]
    fn walked_data_beats_stale_snapshot() {
        let existing = MessageSet::from_unsorted(vec![message("A", 100)]);

        let merged = merge(&existing, vec![], vec![liked("A", 100, &["u9"])], vec![]);

        assert_eq!(merged.get("A").unwrap().favorited_by, vec!["u9"]);
    }

    #[test]
    fn empty_inputs_give_empty_set() {
        let merged = merge(&MessageSet::new(), vec![], vec![], vec![]);
        assert!(merged.is_empty());
    }

    #[test]
    fn older_messages_are_placed_at_the_end() {
        let existing = MessageSet::from_unsorted(vec![message("C", 300)]);

        let merged = merge(
            &existing,
            vec![message("B", 200), message("A", 100)],
            vec![],
            vec![],
        );

        assert_eq!(ids(&merged), vec!["C", "B", "A"]);
    }

    #[test]
    fn equal_timestamps_keep_first_appearance_order() {
        let existing = MessageSet::from_unsorted(vec![message("x", 100), message("y", 100)]);

        let merged = merge(
            &existing,
            vec![],
            vec![message("z", 100)],
            vec![liked("x", 100, &["u1"])],
        );

        assert_eq!(ids(&merged), vec!["x", "y", "z"]);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let existing = MessageSet::from_unsorted(vec![message("A", 100), message("B", 200)]);
        let older = vec![message("Z", 50)];
        let newer = vec![message("C", 300), message("D", 300)];
        let forced = vec![liked("B", 200, &["u1"])];

        let first = merge(&existing, older.clone(), newer.clone(), forced.clone());
        let second = merge(&existing, older, newer, forced);

        assert_eq!(first, second);
    }
}
