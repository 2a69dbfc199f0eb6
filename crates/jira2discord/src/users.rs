use crate::prelude::{println, *};
use colored::Colorize;

use jira2discord_core::users::UserDirectory;

use crate::config::load_directory;

#[derive(Debug, clap::Parser)]
#[command(name = "users")]
#[command(about = "Show the Jira to Discord user mapping")]
pub struct App {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// One row per mapping, under a header row
pub fn users_table(directory: &UserDirectory) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Account ID".bold().cyan(),
        "Display Name".bold().cyan(),
        "Discord".bold().cyan()
    ]);

    for user in &directory.users {
        let discord = if user.discord_id.is_empty() {
            "-".bright_black()
        } else {
            user.mention().green()
        };
        table.add_row(prettytable::row![
            user.account_id.bright_white(),
            user.display_name.bright_yellow(),
            discord
        ]);
    }

    table
}

/// Module entry point
pub fn run(app: App, global: crate::Global) -> Result<()> {
    let directory = load_directory(&global.user_mapping_path)?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&directory)?);
    } else if directory.is_empty() {
        println!(
            "No user mappings found in {}",
            global.user_mapping_path.display()
        );
    } else {
        users_table(&directory).printstd();
    }

    Ok(())
}
