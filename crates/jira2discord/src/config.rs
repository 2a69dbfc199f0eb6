use crate::prelude::*;
use std::io::Read;
use std::path::Path;

use jira2discord_core::compose::{parse_color, ColorScheme, ComposeOptions};
use jira2discord_core::users::{MappingFormat, UserDirectory};

/// Load the user directory from `path`
///
/// A missing file is not an error: mentions simply stay unresolved. A file
/// that exists but cannot be read or parsed is.
pub fn load_directory(path: &Path) -> Result<UserDirectory> {
    if !path.exists() {
        log::warn!(
            "User mapping {} not found, mentions will not be resolved",
            path.display()
        );
        return Ok(UserDirectory::default());
    }

    let document = std::fs::read_to_string(path)
        .with_context(|| f!("Failed to read user mapping {}", path.display()))?;

    let directory = UserDirectory::parse(&document, MappingFormat::from_path(path)).map_err(
        |e| Error::UserMapping {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    )?;

    log::debug!(
        "Loaded {} user mapping(s) from {}",
        directory.len(),
        path.display()
    );

    Ok(directory)
}

/// Parse a configured color, falling back to `default` with a warning
fn color_or_default(name: &str, value: Option<&str>, default: u32) -> u32 {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return default;
    };

    parse_color(raw).unwrap_or_else(|| {
        log::warn!("{name}={raw:?} is not a valid color, using #{default:06X}");
        default
    })
}

/// Compose options from the global flags and their environment fallbacks
pub fn compose_options(global: &crate::Global) -> ComposeOptions {
    let defaults = ColorScheme::default();

    ComposeOptions {
        base_url: global
            .jira_base_url
            .clone()
            .filter(|url| !url.trim().is_empty()),
        colors: ColorScheme {
            issue: color_or_default("ISSUE_COLOR", global.issue_color.as_deref(), defaults.issue),
            comment: color_or_default(
                "COMMENT_COLOR",
                global.comment_color.as_deref(),
                defaults.comment,
            ),
            changelog: color_or_default(
                "CHANGELOG_COLOR",
                global.changelog_color.as_deref(),
                defaults.changelog,
            ),
            comment_changelog: color_or_default(
                "COMMENT_CHANGELOG_COLOR",
                global.comment_changelog_color.as_deref(),
                defaults.comment_changelog,
            ),
        },
        ..ComposeOptions::default()
    }
}

/// Read the whole of `file`, or stdin when no file (or `-`) is given
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| f!("Failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::global;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    // ============================================================================
    // load_directory tests
    // ============================================================================

    #[test]
    fn test_load_directory_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let directory = load_directory(&dir.path().join("nope.yaml")).unwrap();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_load_directory_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "user_mapping.yaml",
            "jira_to_discord:\n  - accountId: \"a1\"\n    displayName: \"Ana\"\n    discordId: \"111\"\n",
        );

        let directory = load_directory(&path).unwrap();

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.mention_for("Ana"), "<@111>");
    }

    #[test]
    fn test_load_directory_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "users.toml",
            "[[jira_to_discord]]\naccountId = \"a1\"\ndisplayName = \"Ana\"\ndiscordId = \"111\"\n",
        );

        let directory = load_directory(&path).unwrap();

        assert_eq!(directory.mention_for("a1"), "<@111>");
    }

    #[test]
    fn test_load_directory_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "user_mapping.yaml", "jira_to_discord: [oops");

        let err = load_directory(&path).unwrap_err();

        assert!(err.to_string().starts_with("User mapping"));
    }

    // ============================================================================
    // compose_options tests
    // ============================================================================

    #[test]
    fn test_compose_options_defaults() {
        let options = compose_options(&global("x.yaml".into()));
        assert_eq!(options, ComposeOptions::default());
    }

    #[test]
    fn test_compose_options_overrides() {
        let mut g = global("x.yaml".into());
        g.jira_base_url = Some("https://acme.atlassian.net/browse".to_string());
        g.issue_color = Some("#112233".to_string());
        g.comment_color = Some("not-a-color".to_string());
        g.changelog_color = Some("0x445566".to_string());
        g.comment_changelog_color = Some("".to_string());

        let options = compose_options(&g);
        let defaults = ColorScheme::default();

        assert_eq!(
            options.base_url.as_deref(),
            Some("https://acme.atlassian.net/browse")
        );
        assert_eq!(options.colors.issue, 0x112233);
        assert_eq!(options.colors.comment, defaults.comment);
        assert_eq!(options.colors.changelog, 0x445566);
        assert_eq!(options.colors.comment_changelog, defaults.comment_changelog);
    }

    // ============================================================================
    // read_input tests
    // ============================================================================

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "in.txt", "h1. Title");
        assert_eq!(read_input(Some(&path)).unwrap(), "h1. Title");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/definitely/not/here.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
