//! Jira webhook payloads and their free-text bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::markup::{self, block::TABLE_PLACEHOLDER, protect, MentionResolver};

/// Top level structure sent by Jira webhooks
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraWebhook {
    #[serde(rename = "webhookEvent", default)]
    pub webhook_event: Option<String>,
    /// Event time in epoch milliseconds
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub issue: JiraIssue,
    #[serde(default)]
    pub comment: Option<JiraComment>,
    #[serde(default)]
    pub changelog: Option<JiraChangelog>,
}

/// Issue carried by a webhook event
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub fields: JiraIssueFields,
}

/// Fields from Jira issue
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<Value>, // Can be a string or ADF (Atlassian Document Format)
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub priority: Option<JiraPriority>,
    #[serde(default)]
    pub issuetype: Option<JiraIssueType>,
}

/// Jira status field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraStatus {
    pub name: String,
}

/// Jira priority field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraPriority {
    #[serde(default)]
    pub name: String,
}

/// Jira issue type field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraIssueType {
    pub name: String,
}

/// Jira user (assignee, comment author)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct JiraUser {
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

impl JiraUser {
    /// Prefer displayName over emailAddress
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .or(self.email_address.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// Comment attached to a `comment_*` event
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraComment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub author: Option<JiraUser>,
}

/// Changed fields of an `issue_updated` event
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct JiraChangelog {
    #[serde(default)]
    pub items: Vec<JiraChangelogItem>,
}

/// A single changed field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraChangelogItem {
    pub field: String,
    #[serde(rename = "fromString", default)]
    pub from_string: Option<String>,
    #[serde(rename = "toString", default)]
    pub to_string: Option<String>,
}

impl JiraChangelogItem {
    pub fn from_value(&self) -> Option<&str> {
        self.from_string.as_deref().filter(|v| !v.is_empty())
    }

    pub fn to_value(&self) -> Option<&str> {
        self.to_string.as_deref().filter(|v| !v.is_empty())
    }
}

/// Parse a webhook request body
pub fn parse_webhook(body: &str) -> Result<JiraWebhook, Error> {
    serde_json::from_str(body).map_err(|e| Error::Payload(e.to_string()))
}

/// Render a free-text field (description or comment body) as Discord markdown
///
/// Jira sends wiki markup strings from the v2 API and ADF documents from v3.
/// Strings go through the markup transformer, ADF documents through
/// [`render_adf`]. Anything else, and blank text, yields `None`.
pub fn render_body(value: &Value, mentions: &dyn MentionResolver) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(markup::jira_to_markdown_with(s, mentions)),
        Value::Object(_) if value.get("type").and_then(Value::as_str) == Some("doc") => {
            render_adf(value, mentions)
        }
        _ => None,
    }
}

fn content(node: &Value) -> impl Iterator<Item = &Value> {
    node.get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn attr<'a>(node: &'a Value, name: &str) -> Option<&'a str> {
    node.get("attrs")
        .and_then(|a| a.get(name))
        .and_then(Value::as_str)
}

/// Render ADF (Atlassian Document Format) to Discord markdown
///
/// Walks the ADF tree and emits the same dialect the wiki markup transformer
/// produces. Returns `None` for an empty document.
pub fn render_adf(value: &Value, mentions: &dyn MentionResolver) -> Option<String> {
    let mut output = String::new();

    for node in content(value) {
        if let Some(rendered) = render_adf_node(node, 0, mentions) {
            output.push_str(&rendered);
            if !rendered.ends_with('\n') {
                output.push('\n');
            }
        }
    }

    let output = output.trim();
    if output.is_empty() {
        None
    } else {
        Some(output.to_string())
    }
}

fn render_children(node: &Value, depth: usize, mentions: &dyn MentionResolver) -> String {
    content(node)
        .filter_map(|child| render_adf_node(child, depth, mentions))
        .collect()
}

/// Render a single ADF node recursively
fn render_adf_node(node: &Value, depth: usize, mentions: &dyn MentionResolver) -> Option<String> {
    let node_type = node.get("type")?.as_str()?;

    match node_type {
        "paragraph" => Some(format!("{}\n", render_children(node, depth, mentions))),
        "heading" => {
            let level = node
                .get("attrs")
                .and_then(|a| a.get("level"))
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            let text = render_children(node, 0, mentions);
            Some(format!("{} {}\n", "#".repeat(level), text.trim()))
        }
        "bulletList" => Some(render_list(node, depth, "-", mentions)),
        "orderedList" => Some(render_list(node, depth, "1.", mentions)),
        "codeBlock" => {
            let text: String = content(node)
                .filter_map(|child| child.get("text").and_then(Value::as_str))
                .collect();
            Some(format!(
                "```{}\n{}\n```\n",
                attr(node, "language").unwrap_or(""),
                text.trim_matches('\n')
            ))
        }
        "blockquote" | "panel" => {
            let inner = render_children(node, 0, mentions);
            let quoted = inner
                .trim()
                .lines()
                .map(|line| {
                    if line.trim().is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            Some(format!("{quoted}\n"))
        }
        "rule" => Some("---\n".to_string()),
        "table" => Some(format!("{TABLE_PLACEHOLDER}\n")),
        "text" => render_text(node),
        "hardBreak" => Some("\n".to_string()),
        "mention" => {
            let id = attr(node, "id").unwrap_or_default();
            mentions.resolve(id).or_else(|| {
                attr(node, "text")
                    .map(|text| format!("@{}", text.trim_start_matches('@')))
                    .or_else(|| (!id.is_empty()).then(|| format!("@{id}")))
            })
        }
        "emoji" => attr(node, "text")
            .or_else(|| attr(node, "shortName"))
            .map(str::to_string),
        "inlineCard" | "blockCard" => attr(node, "url").map(|url| format!("<{url}>")),
        _ => {
            // For unknown node types, try to extract text content
            let text = render_children(node, depth, mentions);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
    }
}

/// Render list items, nesting child lists two spaces deeper
fn render_list(node: &Value, depth: usize, marker: &str, mentions: &dyn MentionResolver) -> String {
    let indent = "  ".repeat(depth);
    let mut output = String::new();

    for item in content(node) {
        let mut first = true;
        for child in content(item) {
            match child.get("type").and_then(Value::as_str) {
                Some("bulletList") => output.push_str(&render_list(child, depth + 1, "-", mentions)),
                Some("orderedList") => {
                    output.push_str(&render_list(child, depth + 1, "1.", mentions))
                }
                _ => {
                    let Some(rendered) = render_adf_node(child, depth, mentions) else {
                        continue;
                    };
                    let text = rendered.trim();
                    if first {
                        output.push_str(&format!("{indent}{marker} {text}\n"));
                        first = false;
                    } else if !text.is_empty() {
                        output.push_str(&format!("{indent}  {text}\n"));
                    }
                }
            }
        }
    }

    output
}

fn mark_type<'a>(mark: &&'a Value) -> Option<&'a str> {
    mark.get("type").and_then(Value::as_str)
}

/// Render a text node and its marks
fn render_text(node: &Value) -> Option<String> {
    let text = node.get("text")?.as_str()?;
    let marks: Vec<&Value> = node
        .get("marks")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .collect();
    let literal = marks
        .iter()
        .any(|mark| matches!(mark_type(mark), Some("code") | Some("link")));
    let mut output = if literal {
        text.to_string()
    } else {
        protect::protect_bare_references(text)
    };

    for mark in &marks {
        output = match mark_type(mark) {
            Some("code") => format!("`{output}`"),
            Some("strong") => format!("**{output}**"),
            Some("em") => format!("_{output}_"),
            Some("underline") => format!("__{output}__"),
            Some("strike") => format!("~~{output}~~"),
            Some("link") => match attr(mark, "href") {
                Some(href) => format!("[{output}]({href})"),
                None => output,
            },
            _ => output,
        };
    }

    Some(output)
}
