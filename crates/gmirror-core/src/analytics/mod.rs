//! Read-only statistics over a mirrored conversation.

mod leaderboard;
mod report;
mod reputation;
mod table;

pub use leaderboard::{
    average_likes, days_inactive, distinct_nicknames, leaderboard_by_message,
    leaderboard_by_user, like_ratio, likes_given, likes_received, polls_answered, polls_created,
    posts_by, times_mentioned, DEFAULT_LEADERBOARD_SIZE,
};
pub use report::{
    render_report, render_standard_report, user_summary, ReportContext, Section,
    STANDARD_SECTIONS,
};
pub use reputation::{parse_award, reputation_scores, scores_table, Award};
pub use table::{write_list, write_table, write_table_with, Align, TableOptions};
