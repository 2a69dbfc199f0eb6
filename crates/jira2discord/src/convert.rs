use crate::prelude::{eprintln, println, *};
use std::path::PathBuf;

use jira2discord_core::markup::{jira_to_markdown, jira_to_markdown_with, rules};
use jira2discord_core::users::UserDirectory;

use crate::config::{load_directory, read_input};

#[derive(Debug, clap::Parser)]
#[command(name = "convert")]
#[command(about = "Convert Jira wiki markup to Discord markdown")]
#[command(after_help = "EXAMPLES:
  # Convert a file:
  jira2discord convert description.txt

  # Convert from stdin, keeping [~user] mentions as @user:
  echo 'h2. Title' | jira2discord convert --no-mentions")]
pub struct App {
    /// File with Jira wiki markup (reads stdin when omitted or `-`)
    file: Option<PathBuf>,

    /// Do not resolve [~user] mentions through the user mapping
    #[clap(long)]
    no_mentions: bool,
}

/// Convert `input`, resolving mentions through `directory` when given
pub fn convert_text(input: &str, directory: Option<&UserDirectory>) -> String {
    match directory {
        Some(directory) => jira_to_markdown_with(input, directory),
        None => jira_to_markdown(input),
    }
}

/// Module entry point
pub fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        let names: Vec<&str> = rules().iter().map(|rule| rule.name()).collect();
        eprintln!("Rules: {}", names.join(", "));
    }

    let input = read_input(app.file.as_deref())?;
    log::debug!("Converting {} byte(s) of wiki markup", input.len());

    let directory = if app.no_mentions {
        None
    } else {
        Some(load_directory(&global.user_mapping_path)?)
    };

    println!("{}", convert_text(&input, directory.as_ref()));

    Ok(())
}
