use gmirror_core::config::MirrorConfig;

use crate::commands::common::{build_client, format_group_line, group_to_list_item, GroupListItem};
use crate::error::CliError;

pub async fn run_groups(
    config: &MirrorConfig,
    limit: usize,
    as_json: bool,
    former: bool,
) -> Result<(), CliError> {
    let client = build_client(config)?;
    let mut groups = if limit == 0 {
        Vec::new()
    } else if former {
        client.list_former_groups().await?
    } else {
        client.list_groups(1, limit).await?
    };
    groups.truncate(limit);

    if as_json {
        let json_items = groups
            .iter()
            .map(group_to_list_item)
            .collect::<Vec<GroupListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("{}", if former { "No former groups found." } else { "No groups found." });
        return Ok(());
    }

    let lines = groups.iter().map(format_group_line);
    print!("{}", gmirror_core::analytics::write_list("Groups", lines));
    Ok(())
}
