//! Protection masks: byte ranges that later rules must leave alone.

use std::sync::OnceLock;

use regex::Regex;

use super::span::{ByteRange, SpanSet};

struct Patterns {
    placeholder: Regex,
    inline_code: Regex,
    image: Regex,
    link: Regex,
    monospace: Regex,
    url: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        placeholder: Regex::new(r"[\x{E000}\x{E002}][0-9]+\x{E001}").unwrap(),
        inline_code: Regex::new(r"`[^`\n]*`").unwrap(),
        image: Regex::new(r"!\[[^\]\n]*\]\([^)\s]*\)").unwrap(),
        link: Regex::new(r"\[[^\]\n]*\]\([^)\s]*\)").unwrap(),
        monospace: Regex::new(r"\{\{.+?\}\}").unwrap(),
        url: Regex::new(URL_PATTERN).unwrap(),
    })
}

/// Absolute URL with one of the schemes we recognise
pub(crate) const URL_PATTERN: &str = r"(?i)(?:https?|ftps?|file)://[^\s<>\[\]()`|]+";

/// Characters that end a sentence or close inline markup, never a reference
const TRAILING: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '*', '+', '_', '~', '-',
];

/// Shorten a reference match so punctuation and closing emphasis delimiters
/// after it stay outside.
pub(crate) fn trim_trailing(text: &str, range: ByteRange) -> ByteRange {
    let trimmed = range.slice(text).trim_end_matches(TRAILING);
    ByteRange::new(range.start, range.start + trimmed.len())
}

/// True when a run of `_` (already consumed up to its first character) leads
/// into more word characters, as in `x_foo.com`. A run that ends in
/// whitespace, markup or the end of the text is an emphasis delimiter.
pub(crate) fn underscores_join(chars: &mut impl Iterator<Item = char>) -> bool {
    chars
        .find(|c| *c != '_')
        .is_some_and(char::is_alphanumeric)
}

/// Bare URLs in `text`, trimmed of trailing punctuation and delimiters.
///
/// A scheme glued to a preceding letter or digit (`xhttp://`) is not a URL.
pub(crate) fn url_ranges(text: &str) -> impl Iterator<Item = ByteRange> + '_ {
    patterns()
        .url
        .find_iter(text)
        .filter(move |m| {
            !text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric)
        })
        .map(move |m| trim_trailing(text, ByteRange::from(m)))
        .filter(|range| !range.is_empty())
}

/// Ranges already claimed by a link, an image, an inline code span, or a
/// literal-segment placeholder.
pub fn protection_mask(text: &str) -> SpanSet {
    let p = patterns();
    let mut mask = SpanSet::new();
    mask.extend(p.placeholder.find_iter(text));
    mask.extend(p.inline_code.find_iter(text));
    mask.extend(p.image.find_iter(text));
    mask.extend(p.link.find_iter(text));
    mask
}

/// [`protection_mask`] plus `{{monospace}}` spans and bare URLs.
///
/// Emphasis and strikethrough rules consult this wider mask so that an
/// underscore or hyphen inside a URL or a monospace span is never rewritten.
pub fn inline_mask(text: &str) -> SpanSet {
    let p = patterns();
    let mut mask = protection_mask(text);
    mask.extend(p.monospace.find_iter(text));
    mask.extend(url_ranges(text));
    mask
}
