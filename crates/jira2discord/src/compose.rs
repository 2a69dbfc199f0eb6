use crate::prelude::{eprintln, println, *};
use std::path::PathBuf;

use jira2discord_core::atlassian::jira::parse_webhook;
use jira2discord_core::compose::{to_discord_message, ComposeOptions};
use jira2discord_core::discord::WebhookMessage;
use jira2discord_core::users::UserDirectory;

use crate::config::{compose_options, load_directory, read_input};

#[derive(Debug, clap::Parser)]
#[command(name = "compose")]
#[command(about = "Turn a Jira webhook payload into a Discord webhook message")]
#[command(after_help = "EXAMPLES:
  # Compose the message for a saved webhook body:
  jira2discord compose payload.json

  # Pipe a payload and link issues back to Jira:
  cat payload.json | jira2discord compose --jira-base-url https://acme.atlassian.net/browse")]
pub struct App {
    /// File with the webhook JSON body (reads stdin when omitted or `-`)
    file: Option<PathBuf>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    compact: bool,
}

/// Parse a webhook body and compose the Discord message for it
pub fn compose_message(
    body: &str,
    options: &ComposeOptions,
    directory: &UserDirectory,
) -> Result<WebhookMessage> {
    if body.trim().is_empty() {
        return Err(Error::InvalidInput("empty webhook payload".to_string()).into());
    }

    log::debug!("JIRA payload: {body}");

    let webhook = parse_webhook(body).context("Failed to decode JIRA payload")?;
    let message = to_discord_message(&webhook, options, directory);

    log::debug!("Discord payload: {}", serde_json::to_string(&message)?);

    Ok(message)
}

/// Module entry point
pub fn run(app: App, global: crate::Global) -> Result<()> {
    let options = compose_options(&global);
    if global.verbose {
        eprintln!(
            "Base URL: {}",
            options.base_url.as_deref().unwrap_or("(none)")
        );
    }

    let directory = load_directory(&global.user_mapping_path)?;
    let body = read_input(app.file.as_deref())?;
    let message = compose_message(&body, &options, &directory)?;

    if app.compact {
        println!("{}", serde_json::to_string(&message)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&message)?);
    }

    Ok(())
}
