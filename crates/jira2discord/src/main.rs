use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod compose;
mod config;
mod convert;
mod error;
mod prelude;
mod users;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Turn Jira wiki markup and webhook events into Discord messages"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Jira site root used for issue links (e.g. https://acme.atlassian.net/browse)
    #[clap(long, env = "JIRA_BASE_URL", global = true)]
    jira_base_url: Option<String>,

    /// Jira to Discord user mapping file (YAML, or TOML with a .toml extension)
    #[clap(
        long,
        env = "USER_MAPPING_PATH",
        global = true,
        default_value = "config/user_mapping.yaml"
    )]
    user_mapping_path: PathBuf,

    /// Embed color for issue events (#RRGGBB, 0xRRGGBB or decimal)
    #[clap(long, env = "ISSUE_COLOR", global = true)]
    issue_color: Option<String>,

    /// Embed color for comment events
    #[clap(long, env = "COMMENT_COLOR", global = true)]
    comment_color: Option<String>,

    /// Embed color for changelog events
    #[clap(long, env = "CHANGELOG_COLOR", global = true)]
    changelog_color: Option<String>,

    /// Embed color for events with both a comment and a changelog
    #[clap(long, env = "COMMENT_CHANGELOG_COLOR", global = true)]
    comment_changelog_color: Option<String>,

    /// Whether to display additional information.
    #[clap(
        long,
        env = "JIRA2DISCORD_VERBOSE",
        global = true,
        default_value = "false"
    )]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Convert Jira wiki markup to Discord markdown
    Convert(crate::convert::App),

    /// Turn a Jira webhook payload into a Discord webhook message
    Compose(crate::compose::App),

    /// Show the Jira to Discord user mapping
    Users(crate::users::App),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Convert(sub_app) => crate::convert::run(sub_app, app.global),
        SubCommands::Compose(sub_app) => crate::compose::run(sub_app, app.global),
        SubCommands::Users(sub_app) => crate::users::run(sub_app, app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
