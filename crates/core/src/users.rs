//! Jira to Discord user directory
//!
//! The directory is read from a YAML or TOML document of the form:
//!
//! ```yaml
//! jira_to_discord:
//!   - accountId: "557058:abc"
//!     displayName: "Ana Lima"
//!     discordId: "123456789012345678"
//! ```
//!
//! Lookups match either the account id or the display name. Parsing takes the
//! document text; reading the file is left to the caller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atlassian::jira::JiraUser;
use crate::error::Error;
use crate::markup::MentionResolver;

/// One Jira user and the Discord account it maps to
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct UserMapping {
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(rename = "discordId", default)]
    pub discord_id: String,
}

impl UserMapping {
    fn matches(&self, key: &str) -> bool {
        !key.is_empty() && (self.account_id == key || self.display_name == key)
    }

    /// `<@id>` mention syntax
    pub fn mention(&self) -> String {
        format!("<@{}>", self.discord_id)
    }
}

/// Document format of a mapping file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    Yaml,
    Toml,
}

impl MappingFormat {
    /// `.toml` files are TOML, everything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => MappingFormat::Toml,
            _ => MappingFormat::Yaml,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct UserDirectory {
    #[serde(rename = "jira_to_discord", default)]
    pub users: Vec<UserMapping>,
}

impl UserDirectory {
    pub fn parse(document: &str, format: MappingFormat) -> Result<Self, Error> {
        if document.trim().is_empty() {
            return Ok(Self::default());
        }

        match format {
            MappingFormat::Yaml => serde_yaml::from_str(document)
                .map_err(|e| Error::UserMapping(format!("yaml: {e}"))),
            MappingFormat::Toml => {
                toml::from_str(document).map_err(|e| Error::UserMapping(format!("toml: {e}")))
            }
        }
    }

    pub fn from_yaml(document: &str) -> Result<Self, Error> {
        Self::parse(document, MappingFormat::Yaml)
    }

    pub fn from_toml(document: &str) -> Result<Self, Error> {
        Self::parse(document, MappingFormat::Toml)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// First entry whose account id or display name equals `key`
    ///
    /// Entries without a Discord id are skipped.
    pub fn find(&self, key: &str) -> Option<&UserMapping> {
        self.users
            .iter()
            .find(|user| !user.discord_id.is_empty() && user.matches(key))
    }

    /// `<@discordId>` for a known user, `key` unchanged otherwise
    pub fn mention_for(&self, key: &str) -> String {
        self.find(key)
            .map(UserMapping::mention)
            .unwrap_or_else(|| key.to_string())
    }

    /// Mention for a Jira user, trying the account id before the display name
    ///
    /// Falls back to the user's display name (or email) when neither maps.
    pub fn mention_for_user(&self, user: &JiraUser) -> Option<String> {
        [user.account_id.as_deref(), user.display_name.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|key| self.find(key))
            .map(UserMapping::mention)
            .or_else(|| user.label().map(str::to_string))
    }
}

impl MentionResolver for UserDirectory {
    fn resolve(&self, identifier: &str) -> Option<String> {
        self.find(identifier).map(UserMapping::mention)
    }
}
