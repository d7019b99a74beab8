pub mod common;
pub mod completions;
pub mod groups;
pub mod scores;
pub mod stats;
pub mod sync;
pub mod watch;
