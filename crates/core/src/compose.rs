//! Field composer: Jira webhook event to Discord webhook message
//!
//! The composer decides the embed layout. Free-text bodies are converted with
//! [`crate::atlassian::jira::render_body`], user names are mapped through the
//! [`UserDirectory`], and every string is cut to the Discord embed limits.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::atlassian::jira::{render_body, JiraChangelogItem, JiraWebhook};
use crate::discord::{self, Embed, EmbedField, WebhookMessage};
use crate::users::UserDirectory;

pub const DEFAULT_USERNAME: &str = "Jira";

pub const ISSUE_COLOR: u32 = 0x00B0F4;
pub const COMMENT_COLOR: u32 = 0x347433;
pub const CHANGELOG_COLOR: u32 = 0xFF6F3C;
pub const COMMENT_CHANGELOG_COLOR: u32 = 0x5409DA;

/// What a webhook event carries, which decides the embed color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Issue,
    Comment,
    Changelog,
    CommentChangelog,
}

impl EventKind {
    pub fn of(webhook: &JiraWebhook) -> Self {
        match (webhook.comment.is_some(), webhook.changelog.is_some()) {
            (true, true) => EventKind::CommentChangelog,
            (true, false) => EventKind::Comment,
            (false, true) => EventKind::Changelog,
            (false, false) => EventKind::Issue,
        }
    }
}

/// Embed color per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub issue: u32,
    pub comment: u32,
    pub changelog: u32,
    pub comment_changelog: u32,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            issue: ISSUE_COLOR,
            comment: COMMENT_COLOR,
            changelog: CHANGELOG_COLOR,
            comment_changelog: COMMENT_CHANGELOG_COLOR,
        }
    }
}

impl ColorScheme {
    pub fn for_event(&self, kind: EventKind) -> u32 {
        match kind {
            EventKind::Issue => self.issue,
            EventKind::Comment => self.comment,
            EventKind::Changelog => self.changelog,
            EventKind::CommentChangelog => self.comment_changelog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Jira site root used to build issue links, e.g. `https://acme.atlassian.net/browse`
    pub base_url: Option<String>,
    pub colors: ColorScheme,
    pub username: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            colors: ColorScheme::default(),
            username: DEFAULT_USERNAME.to_string(),
        }
    }
}

/// Parse a color written as `#RRGGBB`, `0xRRGGBB` or a decimal number
///
/// Returns `None` for anything that is not a 24-bit RGB value.
pub fn parse_color(value: &str) -> Option<u32> {
    let value = value.trim();
    let parsed = if let Some(hex) = value.strip_prefix('#') {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse::<u32>()
    };

    parsed.ok().filter(|color| *color <= 0xFF_FF_FF)
}

/// First letter upper-cased, the rest lower-cased
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `<base_url>/<KEY>`, or `None` without a base URL
pub fn issue_url(base_url: Option<&str>, key: &str) -> Option<String> {
    base_url
        .map(|base| base.trim_end_matches('/'))
        .filter(|base| !base.is_empty())
        .map(|base| format!("{base}/{key}"))
}

/// Epoch milliseconds to an RFC 3339 UTC timestamp
pub fn format_timestamp(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// One line of the `Changes` field, or `None` for an item with no values
///
/// Values are passed through the directory so assignee changes become
/// mentions.
pub fn describe_change(item: &JiraChangelogItem, directory: &UserDirectory) -> Option<String> {
    let name = capitalize(&item.field);
    let change = match (item.from_value(), item.to_value()) {
        (None, None) => return None,
        (None, Some(to)) => format!("{name} set to {}", directory.mention_for(to)),
        (Some(from), Some(to)) => format!(
            "{name}: {} → {}",
            directory.mention_for(from),
            directory.mention_for(to)
        ),
        (Some(from), None) => format!("{name}: {} → (none)", directory.mention_for(from)),
    };
    Some(discord::truncate(&change, discord::FIELD_VALUE_MAX))
}

/// Convert a Jira webhook payload into a Discord webhook message
pub fn to_discord_message(
    webhook: &JiraWebhook,
    options: &ComposeOptions,
    directory: &UserDirectory,
) -> WebhookMessage {
    let issue = &webhook.issue;
    let fields = &issue.fields;
    let kind = EventKind::of(webhook);

    let mut embed = Embed {
        title: discord::truncate(
            &format!("{}: {}", issue.key, fields.summary),
            discord::TITLE_MAX,
        ),
        url: issue_url(options.base_url.as_deref(), &issue.key),
        color: options.colors.for_event(kind),
        timestamp: webhook.timestamp.and_then(format_timestamp),
        ..Embed::default()
    };

    if webhook.comment.is_none() {
        if let Some(description) = fields
            .description
            .as_ref()
            .and_then(|value| render_body(value, directory))
        {
            embed.push_field(EmbedField::new("Description", &description, false));
        }
    }

    if let Some(comment) = &webhook.comment {
        if let Some(body) = comment
            .body
            .as_ref()
            .and_then(|value| render_body(value, directory))
        {
            embed.push_field(EmbedField::new("Comment", &body, false));
        }
        let author = comment
            .author
            .as_ref()
            .and_then(|author| directory.mention_for_user(author))
            .unwrap_or_else(|| "Unknown".to_string());
        embed.push_field(EmbedField::new("Comment by", &author, true));
    }

    if let Some(changelog) = &webhook.changelog {
        let changes: Vec<String> = changelog
            .items
            .iter()
            .filter_map(|item| describe_change(item, directory))
            .collect();
        if !changes.is_empty() {
            embed.push_field(EmbedField::new("Changes", &changes.join("\n"), false));
        }
    }

    if let Some(priority) = fields.priority.as_ref().filter(|p| !p.name.is_empty()) {
        embed.push_field(EmbedField::new("Priority", &priority.name, true));
    }
    let assignee = fields
        .assignee
        .as_ref()
        .and_then(|user| directory.mention_for_user(user))
        .unwrap_or_else(|| "Unassigned".to_string());
    embed.push_field(EmbedField::new("Assignee", &assignee, true));
    if let Some(status) = fields.status.as_ref().filter(|s| !s.name.is_empty()) {
        embed.push_field(EmbedField::new("Status", &status.name, true));
    }
    if let Some(issue_type) = fields.issuetype.as_ref().filter(|t| !t.name.is_empty()) {
        embed.push_field(EmbedField::new("Type", &issue_type.name, true));
    }

    WebhookMessage {
        username: options.username.clone(),
        embeds: vec![embed],
    }
}
