//! Discord webhook message model

use serde::{Deserialize, Serialize};

/// Embed limits enforced by the Discord API
pub const TITLE_MAX: usize = 256;
pub const FIELD_NAME_MAX: usize = 256;
pub const FIELD_VALUE_MAX: usize = 1024;
pub const MAX_FIELDS: usize = 25;

/// Payload posted to a Discord webhook
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct WebhookMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Embed {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// RFC 3339 timestamp shown in the embed footer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    /// Build a field, truncating name and value to the embed limits
    pub fn new(name: &str, value: &str, inline: bool) -> Self {
        Self {
            name: truncate(name, FIELD_NAME_MAX),
            value: truncate(value, FIELD_VALUE_MAX),
            inline,
        }
    }
}

impl Embed {
    /// Append a field unless the embed already holds [`MAX_FIELDS`]
    pub fn push_field(&mut self, field: EmbedField) {
        if self.fields.len() < MAX_FIELDS {
            self.fields.push(field);
        }
    }
}

/// Cut `s` to at most `max` characters
///
/// Discord counts characters, not bytes, so the cut always lands on a char
/// boundary.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((at, _)) => s[..at].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("abcdef", 4), "abcd");
        assert_eq!(truncate("héllo → wörld", 7), "héllo →");
    }

    #[test]
    fn test_field_new_applies_limits() {
        let long = "x".repeat(2000);
        let field = EmbedField::new(&long, &long, true);
        assert_eq!(field.name.chars().count(), FIELD_NAME_MAX);
        assert_eq!(field.value.chars().count(), FIELD_VALUE_MAX);
        assert!(field.inline);
    }

    #[test]
    fn test_push_field_caps_at_limit() {
        let mut embed = Embed::default();
        for i in 0..30 {
            embed.push_field(EmbedField::new("n", &i.to_string(), false));
        }
        assert_eq!(embed.fields.len(), MAX_FIELDS);
        assert_eq!(embed.fields[MAX_FIELDS - 1].value, "24");
    }

    #[test]
    fn test_message_serialization_skips_empty_parts() {
        let message = WebhookMessage {
            username: "Jira".to_string(),
            embeds: vec![Embed {
                title: "T".to_string(),
                color: 1,
                ..Embed::default()
            }],
        };

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "username": "Jira",
                "embeds": [{ "title": "T", "color": 1 }]
            })
        );
    }
}
