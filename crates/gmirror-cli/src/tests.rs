use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use gmirror_core::config::MirrorConfig;
use gmirror_core::store::{SnapshotStore, SyncState};
use gmirror_core::sync::SyncReport;
use gmirror_core::{Group, Message, MessageSet};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::cli::{Cli, Commands, CompletionShell};
use crate::commands::common::{
    apply_overrides, default_data_dir, format_group_line, format_message_line,
    load_existing_snapshot, resolve_data_dir,
};
use crate::commands::completions::render_completions;
use crate::commands::scores::run_scores;
use crate::commands::stats::{default_parallelism, run_stats};
use crate::commands::sync::{format_sync_summary, sync_options};
use crate::commands::watch::new_message_lines;
use crate::error::CliError;

fn message(id: &str, created_at: i64, name: &str, text: &str) -> Message {
    let mut message = Message::new(id, "1234", created_at);
    message.sender_id = format!("u{id}");
    message.user_id = format!("u{id}");
    message.sender_type = "user".to_string();
    message.name = name.to_string();
    message.text = Some(text.to_string());
    message
}

fn saved_state(dir: &std::path::Path) -> SyncState {
    let mut reply = message("2", 200, "Bob", "+10 sc");
    reply.attachments.push(gmirror_core::models::Attachment {
        kind: "reply".to_string(),
        reply_id: Some("1".to_string()),
        ..Default::default()
    });
    let state = SyncState {
        group_id: "1234".to_string(),
        messages: MessageSet::from_unsorted(vec![message("1", 100, "Ada", "hello"), reply]),
        group: Some(Group {
            id: "1234".to_string(),
            name: "Book club".to_string(),
            ..Default::default()
        }),
        last_synced_at: chrono::DateTime::from_timestamp(1_700_000_000, 0),
    };
    SnapshotStore::new(dir).save(&state).unwrap();
    state
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parses_sync_flags() {
    let cli = Cli::try_parse_from([
        "gmirror",
        "--data-dir",
        "/tmp/mirror",
        "sync",
        "1234",
        "--backfill",
        "--limit",
        "50",
        "--force-refresh",
        "0",
    ])
    .unwrap();

    assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mirror")));
    match cli.command {
        Commands::Sync {
            group_id,
            backfill,
            force_refresh,
            limit,
        } => {
            assert_eq!(group_id, "1234");
            assert!(backfill);
            assert_eq!(force_refresh, Some(0));
            assert_eq!(limit, Some(50));
        }
        _ => panic!("expected sync command"),
    }
}

#[test]
fn global_token_flag_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["gmirror", "groups", "--token", "abc", "--json"]).unwrap();
    assert_eq!(cli.token.as_deref(), Some("abc"));
    assert!(matches!(
        cli.command,
        Commands::Groups {
            limit: 10,
            json: true,
            former: false
        }
    ));
}

#[test]
fn groups_former_flag_is_parsed() {
    let cli = Cli::try_parse_from(["gmirror", "groups", "--former"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Groups {
            former: true,
            json: false,
            ..
        }
    ));
}

#[test]
fn overrides_replace_environment_values() {
    let config = MirrorConfig {
        token: Some("from-env".to_string()),
        ..MirrorConfig::default()
    };

    let config = apply_overrides(
        config,
        Some("  from-flag ".to_string()),
        Some(PathBuf::from("/data")),
    )
    .unwrap();

    assert_eq!(config.token.as_deref(), Some("from-flag"));
    assert_eq!(resolve_data_dir(&config), PathBuf::from("/data"));
}

#[test]
fn blank_token_flag_keeps_environment_token() {
    let config = MirrorConfig {
        token: Some("from-env".to_string()),
        ..MirrorConfig::default()
    };

    let config = apply_overrides(config, Some("   ".to_string()), None).unwrap();

    assert_eq!(config.token.as_deref(), Some("from-env"));
}

#[test]
fn overrides_are_validated() {
    let config = MirrorConfig {
        api_url: "api.example.com".to_string(),
        ..MirrorConfig::default()
    };

    let error = apply_overrides(config, None, None).unwrap_err();
    assert!(matches!(error, CliError::Core(gmirror_core::Error::Config(_))));
}

#[test]
fn default_data_dir_is_app_specific() {
    assert!(default_data_dir().ends_with("gmirror"));
    assert_eq!(
        resolve_data_dir(&MirrorConfig::default()),
        default_data_dir()
    );
}

#[test]
fn message_line_shows_sender_text_and_likes() {
    let mut liked = message("1", 100, "Ada", "  hello\n  world ");
    liked.favorited_by = vec!["u2".to_string(), "u3".to_string()];

    let line = format_message_line(None, &liked);

    assert!(line.starts_with('['));
    assert!(line.ends_with("] Ada: hello world (+2)"));
}

#[test]
fn message_line_falls_back_to_member_name_and_placeholder() {
    let mut silent = message("7", 100, "", "");
    silent.text = None;
    let group = Group {
        id: "1234".to_string(),
        members: vec![gmirror_core::models::GroupMember {
            user_id: "u7".to_string(),
            name: "Grace".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };

    assert!(format_message_line(Some(&group), &silent).ends_with("] Grace: <no text>"));
}

#[test]
fn long_messages_are_shortened() {
    let long = message("1", 100, "Ada", &"x".repeat(500));
    let line = format_message_line(None, &long);
    assert!(line.ends_with("..."));
    assert!(line.len() < 200);
}

#[test]
fn new_messages_print_oldest_first_without_bots() {
    let mut bot = message("3", 300, "Bot", "beep");
    bot.sender_type = "bot".to_string();
    let newest_first = vec![
        bot,
        message("2", 200, "Bob", "second"),
        message("1", 100, "Ada", "first"),
    ];

    let lines = new_message_lines(None, &newest_first);

    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("Ada: first"));
    assert!(lines[1].ends_with("Bob: second"));
}

#[test]
fn sync_options_follow_config_and_flags() {
    let config = MirrorConfig {
        page_size: 40,
        force_refresh: 75,
        ..MirrorConfig::default()
    };

    let defaults = sync_options(&config, false, None, None);
    assert_eq!(defaults.page_size, 40);
    assert_eq!(defaults.force_refresh, 75);
    assert!(!defaults.backfill);

    let flagged = sync_options(&config, true, Some(0), Some(500));
    assert!(flagged.backfill);
    assert_eq!(flagged.force_refresh, 0);
    assert_eq!(flagged.pull_limit, Some(500));
}

#[test]
fn sync_summary_counts_each_walk() {
    let report = SyncReport {
        older_fetched: 3,
        refreshed: 200,
        total: 1203,
        new_messages: vec![message("9", 900, "Ada", "hi")],
    };

    assert_eq!(
        format_sync_summary("Book club", &report),
        "Synced Book club: 1 new, 3 older, 200 refreshed, 1203 total"
    );
}

#[test]
fn group_line_shows_name_and_id() {
    let group = Group {
        id: "1234".to_string(),
        name: "Book club".to_string(),
        ..Default::default()
    };
    assert_eq!(format_group_line(&group), "Book club: 1234");
}

#[test]
fn read_only_commands_require_a_snapshot() {
    let dir = tempdir().unwrap();

    let error = load_existing_snapshot(dir.path(), "1234").unwrap_err();

    assert!(matches!(error, CliError::NoSnapshot(id) if id == "1234"));
}

#[test]
fn stored_snapshot_is_loaded_for_reports() {
    let dir = tempdir().unwrap();
    let state = saved_state(dir.path());

    assert_eq!(load_existing_snapshot(dir.path(), "1234").unwrap(), state);
    assert!(run_scores(dir.path(), "1234", true).is_ok());
    assert!(run_scores(dir.path(), "1234", false).is_ok());
}

#[tokio::test]
async fn stats_render_from_snapshot() {
    let dir = tempdir().unwrap();
    saved_state(dir.path());

    assert!(run_stats(dir.path(), "1234", Some(2), None).await.is_ok());
    assert!(run_stats(dir.path(), "1234", None, Some("u1")).await.is_ok());
}

#[test]
fn default_parallelism_is_positive() {
    assert!(default_parallelism() >= 1);
}

#[test]
fn completions_mention_binary_name() {
    for shell in [CompletionShell::Bash, CompletionShell::Zsh, CompletionShell::Fish] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("gmirror"), "{shell:?}");
    }
}
