//! Bare-reference protection: wrap loose URLs and domain names in inline code.
//!
//! Discord auto-links and previews anything that looks like a host. Wrapping
//! bare references in backticks keeps them as plain text. References that are
//! already part of a link, an image, or a code span are left alone, as are
//! filenames, email addresses, and fragments of longer hyphenated tokens.

use std::sync::OnceLock;

use regex::Regex;

use super::mask::{protection_mask, trim_trailing, underscores_join, url_ranges};
use super::span::ByteRange;

/// Final components that mark a token as a filename rather than a host
const FILE_EXTENSIONS: &[&str] = &[
    "7z", "bak", "bat", "bin", "bmp", "c", "cfg", "conf", "cpp", "cs", "css", "csv", "dll",
    "doc", "docx", "env", "exe", "gif", "go", "gz", "h", "heic", "htm", "html", "ini", "jar",
    "java", "jpeg", "jpg", "js", "json", "jsx", "kt", "log", "md", "mov", "mp3", "mp4", "msi",
    "pdf", "php", "png", "ppt", "pptx", "py", "rb", "rs", "rtf", "scss", "sh", "sql", "svg",
    "swift", "tar", "tgz", "tif", "tiff", "toml", "ts", "tsx", "txt", "wav", "webp", "xls",
    "xlsx", "xml", "yaml", "yml", "zip",
];

fn domain_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}(?::[0-9]{1,5})?(?:/[^\s<>\[\]()`|]*)?",
        )
        .unwrap()
    })
}

/// True for `name.ext` tokens whose extension is a well-known file type
pub fn looks_like_filename(token: &str) -> bool {
    if token.contains('/') || token.contains(':') {
        return false;
    }
    token
        .rsplit('.')
        .next()
        .map(|ext| FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// True when the token continues on either side: an alphanumeric, `@`, `/`,
/// `:` or `-` touching it, `_` leading into a longer identifier, or a `.`
/// followed by more token characters.
fn is_fragment(text: &str, range: ByteRange) -> bool {
    let mut before = text[..range.start].chars().rev();
    let mut after = text[range.end..].chars();

    let joined_before = match before.next() {
        Some('_') => underscores_join(&mut before),
        Some(c) => c.is_alphanumeric() || matches!(c, '@' | '/' | ':' | '-' | '.' | '\\' | '~'),
        None => false,
    };
    if joined_before {
        return true;
    }

    match after.next() {
        Some('_') => underscores_join(&mut after),
        Some(c) if c.is_alphanumeric() || matches!(c, '@' | '-') => true,
        Some('.') => after.next().is_some_and(|c| c.is_alphanumeric()),
        _ => false,
    }
}

fn wrap_ranges<I, F>(text: &str, ranges: I, mut accept: F) -> String
where
    I: IntoIterator<Item = ByteRange>,
    F: FnMut(&str, ByteRange) -> bool,
{
    let mask = protection_mask(text);
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;

    for range in ranges {
        if range.is_empty() || mask.overlaps(&range) || !accept(text, range) {
            continue;
        }
        out.push_str(&text[last..range.start]);
        out.push('`');
        out.push_str(range.slice(text));
        out.push('`');
        last = range.end;
    }

    out.push_str(&text[last..]);
    out
}

/// Wrap absolute URLs that are not already inside a link or code span
pub fn protect_urls(text: &str) -> String {
    wrap_ranges(text, url_ranges(text), |_, _| true)
}

/// Wrap bare host names such as `example.com` or `api.example.com/v1`
pub fn protect_domains(text: &str) -> String {
    let ranges = domain_pattern()
        .find_iter(text)
        .map(|m| trim_trailing(text, ByteRange::from(m)));
    wrap_ranges(text, ranges, |text, range| {
        !is_fragment(text, range) && !looks_like_filename(range.slice(text))
    })
}

/// URLs first, then domains; the URL spans become code spans and so are part
/// of the mask when domains are scanned.
pub fn protect_bare_references(text: &str) -> String {
    protect_domains(&protect_urls(text))
}
