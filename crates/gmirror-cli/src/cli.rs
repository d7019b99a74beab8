use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gmirror")]
#[command(about = "Mirror group chat history locally and report on it")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding conversation snapshots
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// API access token (overrides GROUPME_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List your groups
    Groups {
        /// Number of groups to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// List groups you have left instead
        #[arg(long)]
        former: bool,
    },
    /// Run one sync cycle for a group and save the snapshot
    Sync {
        /// Group id
        group_id: String,
        /// Also walk back past the oldest stored message
        #[arg(long)]
        backfill: bool,
        /// Recent messages to re-fetch for like/deletion updates
        #[arg(long, value_name = "N")]
        force_refresh: Option<usize>,
        /// Stop each walk after this many messages
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Sync repeatedly and print new messages as they arrive
    Watch {
        /// Group id
        group_id: String,
        /// Seconds between cycles
        #[arg(long, default_value = "10", value_name = "SECS")]
        interval: u64,
        /// Stop after this many cycles
        #[arg(long, value_name = "N")]
        cycles: Option<usize>,
        /// Recent messages to re-fetch for like/deletion updates
        #[arg(long, value_name = "N")]
        force_refresh: Option<usize>,
    },
    /// Print statistics from the stored snapshot
    Stats {
        /// Group id
        group_id: String,
        /// Report sections rendered at once
        #[arg(long, value_name = "N")]
        parallelism: Option<usize>,
        /// Only summarize this user id
        #[arg(long, value_name = "USER_ID")]
        user: Option<String>,
    },
    /// Print social credit scores from the stored snapshot
    Scores {
        /// Group id
        group_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
