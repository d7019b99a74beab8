//! Full statistics report, rendered section by section on blocking tasks.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::sync::Arc;

use tokio::sync::Semaphore;

use super::leaderboard::{
    average_likes, days_inactive, distinct_nicknames, leaderboard_by_message,
    leaderboard_by_user, like_ratio, likes_given, likes_received, polls_answered, polls_created,
    posts_by, times_mentioned, DEFAULT_LEADERBOARD_SIZE,
};
use super::table::{write_table, Align};
use crate::models::{Group, Message};
use crate::{Error, Result};

const MOST_LIKED_SIZE: usize = 20;

/// Immutable inputs shared by every report section.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub group: Group,
    pub messages: Vec<Message>,
    /// Reference time (Unix seconds) for inactivity
    pub now: i64,
}

/// One independently rendered block of the report.
pub type Section = fn(&ReportContext) -> Result<String>;

/// The standard report, in output order.
pub const STANDARD_SECTIONS: &[Section] = &[
    member_table,
    totals,
    top_posters,
    most_likes_received,
    most_likes_given,
    like_ratio_board,
    average_likes_board,
    longest_inactive,
    most_mentioned,
    most_nicknames,
    most_polls_created,
    most_polls_answered,
    most_liked_messages,
];

/// Render `sections` with at most `parallelism` running at once.
///
/// Output follows the order of `sections` regardless of completion order.
pub async fn render_report(
    context: ReportContext,
    sections: &[Section],
    parallelism: usize,
) -> Result<String> {
    let context = Arc::new(context);
    let permits = Arc::new(Semaphore::new(parallelism.max(1)));

    let mut handles = Vec::with_capacity(sections.len());
    for &section in sections {
        let context = Arc::clone(&context);
        let permits = Arc::clone(&permits);
        handles.push(tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|error| Error::Task(error.to_string()))?;
            tokio::task::spawn_blocking(move || section(&context))
                .await
                .map_err(|error| Error::Task(error.to_string()))?
        }));
    }

    tracing::debug!(sections = handles.len(), parallelism, "Rendering report");

    let mut output = String::new();
    for handle in handles {
        let block = handle
            .await
            .map_err(|error| Error::Task(error.to_string()))??;
        output.push_str(&block);
        if !block.ends_with('\n') {
            output.push('\n');
        }
    }
    Ok(output)
}

/// Render the standard report.
pub async fn render_standard_report(context: ReportContext, parallelism: usize) -> Result<String> {
    render_report(context, STANDARD_SECTIONS, parallelism).await
}

/// Short summary for one user: posts, likes given, likes received.
#[must_use]
pub fn user_summary(group: &Group, messages: &[Message], user_id: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Statistics for {}:", group.display_name(user_id));
    let _ = writeln!(output, "Total posts: {}", posts_by(user_id, messages));
    let _ = writeln!(output, "Likes given: {}", likes_given(user_id, messages));
    let _ = writeln!(output, "Likes received: {}", likes_received(user_id, messages));
    output
}

fn member_table(context: &ReportContext) -> Result<String> {
    let mut members: Vec<_> = context.group.members.iter().collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));
    let rows: Vec<Vec<String>> = members
        .into_iter()
        .map(|member| {
            vec![
                member.nickname.clone(),
                member.name.clone(),
                member.user_id.clone(),
            ]
        })
        .collect();
    write_table("User IDs", &rows, &[])
}

fn totals(context: &ReportContext) -> Result<String> {
    let messages = &context.messages;
    let system = messages.iter().filter(|message| message.system).count();
    let polls = messages
        .iter()
        .filter(|message| message.attachments.iter().any(|attachment| attachment.kind == "poll"))
        .count();
    let platforms: BTreeSet<String> = messages
        .iter()
        .map(|message| format!("'{}'", message.platform.as_deref().unwrap_or_default()))
        .collect();
    let deleted = messages
        .iter()
        .filter(|message| {
            message
                .event
                .as_ref()
                .is_some_and(|event| event.data.deleter_id.is_some())
        })
        .count();

    let mut output = String::new();
    let _ = writeln!(output, "--TOTALS--");
    let _ = writeln!(output, "All messages: {}", messages.len());
    let _ = writeln!(output, "System messages: {system}");
    let _ = writeln!(output, "Polls: {polls}");
    let _ = writeln!(
        output,
        "Platforms: {}",
        platforms.into_iter().collect::<Vec<_>>().join(", ")
    );
    let _ = writeln!(output, "Deleted messages: {deleted}");
    Ok(output)
}

fn by_user<S, F>(context: &ReportContext, title: &str, align: Align, score: F) -> Result<String>
where
    S: PartialOrd + std::fmt::Display,
    F: Fn(&str, &[Message]) -> S,
{
    leaderboard_by_user(
        title,
        &context.group,
        &context.messages,
        |member, messages| score(&member.user_id, messages),
        align,
        DEFAULT_LEADERBOARD_SIZE,
    )
}

fn top_posters(context: &ReportContext) -> Result<String> {
    by_user(context, "Top posters", Align::Right, posts_by)
}

fn most_likes_received(context: &ReportContext) -> Result<String> {
    by_user(context, "Most likes received", Align::Right, likes_received)
}

fn most_likes_given(context: &ReportContext) -> Result<String> {
    by_user(context, "Most likes given", Align::Right, likes_given)
}

fn like_ratio_board(context: &ReportContext) -> Result<String> {
    by_user(context, "Likes received/given ratio", Align::Left, like_ratio)
}

fn average_likes_board(context: &ReportContext) -> Result<String> {
    by_user(
        context,
        "Average likes received per message",
        Align::Left,
        average_likes,
    )
}

fn longest_inactive(context: &ReportContext) -> Result<String> {
    let now = context.now;
    by_user(context, "Longest inactive", Align::Right, |user_id, messages| {
        days_inactive(user_id, messages, now)
    })
}

fn most_mentioned(context: &ReportContext) -> Result<String> {
    by_user(context, "Most mentioned", Align::Right, times_mentioned)
}

fn most_nicknames(context: &ReportContext) -> Result<String> {
    by_user(context, "Most distinct usernames", Align::Right, distinct_nicknames)
}

fn most_polls_created(context: &ReportContext) -> Result<String> {
    by_user(context, "Created most polls", Align::Right, polls_created)
}

fn most_polls_answered(context: &ReportContext) -> Result<String> {
    by_user(context, "Responded to most polls", Align::Right, polls_answered)
}

fn most_liked_messages(context: &ReportContext) -> Result<String> {
    leaderboard_by_message(
        "Most liked messages",
        &context.group,
        &context.messages,
        Message::like_count,
        MOST_LIKED_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupMember;
    use pretty_assertions::assert_eq;

    fn context() -> ReportContext {
        let mut first = Message::new("1", "1", 0);
        first.sender_id = "42".to_string();
        first.user_id = "42".to_string();
        first.platform = Some("gm".to_string());
        first.favorited_by = vec!["7".to_string()];
        let mut second = Message::new("2", "1", 86_400);
        second.system = true;
        ReportContext {
            group: Group {
                id: "1".to_string(),
                name: "Book club".to_string(),
                members: vec![
                    GroupMember {
                        user_id: "42".to_string(),
                        nickname: "ada".to_string(),
                        name: "Ada".to_string(),
                        ..Default::default()
                    },
                    GroupMember {
                        user_id: "7".to_string(),
                        nickname: "gh".to_string(),
                        name: "Grace".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
            messages: vec![second, first],
            now: 3 * 86_400,
        }
    }

    fn numbered(context: &ReportContext) -> Result<String> {
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(format!("first {}", context.messages.len()))
    }

    fn quick(_: &ReportContext) -> Result<String> {
        Ok("second\n".to_string())
    }

    fn failing(_: &ReportContext) -> Result<String> {
        Err(Error::InvalidInput("broken section".to_string()))
    }

    #[tokio::test]
    async fn sections_are_emitted_in_declaration_order() {
        let report = render_report(context(), &[numbered, quick], 2).await.unwrap();
        assert_eq!(report, "first 2\nsecond\n");
    }

    #[tokio::test]
    async fn zero_parallelism_still_runs() {
        let report = render_report(context(), &[quick, quick], 0).await.unwrap();
        assert_eq!(report, "second\nsecond\n");
    }

    #[tokio::test]
    async fn failing_section_fails_the_report() {
        let error = render_report(context(), &[quick, failing], 4)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
    }

    #[test]
    fn totals_count_system_messages_and_platforms() {
        assert_eq!(
            totals(&context()).unwrap(),
            "--TOTALS--\nAll messages: 2\nSystem messages: 1\nPolls: 0\n\
             Platforms: '', 'gm'\nDeleted messages: 0\n"
        );
    }

    #[test]
    fn member_table_is_sorted_by_name() {
        assert_eq!(
            member_table(&context()).unwrap(),
            "---User IDs---\nada Ada   42 \ngh  Grace 7  \n"
        );
    }

    #[test]
    fn user_summary_lists_activity() {
        let context = context();
        assert_eq!(
            user_summary(&context.group, &context.messages, "42"),
            "Statistics for Ada:\nTotal posts: 1\nLikes given: 0\nLikes received: 1\n"
        );
    }

    #[tokio::test]
    async fn standard_report_contains_every_section() {
        let report = render_standard_report(context(), 3).await.unwrap();

        let titles: Vec<&str> = report
            .lines()
            .filter(|line| line.starts_with("---") || line.starts_with("--TOTALS"))
            .collect();
        assert_eq!(titles.len(), STANDARD_SECTIONS.len());
        assert_eq!(titles[0], "---User IDs---");
        assert_eq!(titles[1], "--TOTALS--");
        assert_eq!(titles.last(), Some(&"---Most liked messages---"));
        assert!(report.contains("Longest inactive"));
    }
}
