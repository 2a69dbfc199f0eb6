//! Inline rewrites: mentions, attachments, images, links, emphasis,
//! monospace, strikethrough and colour markup.
//!
//! The delimiter rules (underline, emphasis, strong, strikethrough) only fire
//! when the delimiters sit at word boundaries and neither delimiter falls
//! inside the [`inline_mask`], so identifiers such as `snake_case`, `C++`,
//! `a-b-c.com`, `2025-06-03` and anything inside a link target pass through
//! untouched. A span may still enclose a whole link, URL or code span.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::mask::{inline_mask, underscores_join, URL_PATTERN};
use super::span::ByteRange;
use super::MentionResolver;

struct Patterns {
    mention: Regex,
    attachment: Regex,
    image: Regex,
    link: Regex,
    bare_link: Regex,
    scheme: Regex,
    url: Regex,
    underline: Regex,
    emphasis: Regex,
    strong: Regex,
    monospace: Regex,
    strikethrough: Regex,
    color: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        mention: Regex::new(r"\[~([^\]\n]+)\]").unwrap(),
        attachment: Regex::new(r"\[\^([^\]\n]+)\]").unwrap(),
        image: Regex::new(r"!([^!\s|]+)(?:\|[^!\n]*)?!").unwrap(),
        link: Regex::new(r"\[([^\[\]|\n]+)\|([^\[\]\n]+)\]").unwrap(),
        bare_link: Regex::new(r"(?i)\[((?:https?|ftps?|file)://[^\[\]|\s]+)\]").unwrap(),
        scheme: Regex::new(r"(?i)^(?:https?|ftps?|file)://").unwrap(),
        url: Regex::new(&format!("^{URL_PATTERN}$")).unwrap(),
        underline: Regex::new(r"_([^_\s](?:[^_\n]*[^_\s])?)_").unwrap(),
        emphasis: Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap(),
        strong: Regex::new(r"\+([^+\s](?:[^+\n]*[^+\s])?)\+").unwrap(),
        monospace: Regex::new(r"\{\{(.+?)\}\}").unwrap(),
        strikethrough: Regex::new(r"-([A-Za-z0-9](?:[^-\n]*[A-Za-z0-9])?)-").unwrap(),
        color: Regex::new(r"(?s)\{color(?::[^}]*)?\}(.*?)\{color\}").unwrap(),
    })
}

/// Rewrite matches of `re` whose one-byte delimiters lie outside the inline
/// mask.
///
/// `render` returns `None` to keep a match as it is.
fn replace_unclaimed<F>(text: &str, re: &Regex, mut render: F) -> String
where
    F: FnMut(&Captures, ByteRange) -> Option<String>,
{
    let mask = inline_mask(text);
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        let range = ByteRange::from(m);
        let open = ByteRange::new(range.start, range.start + 1);
        let close = ByteRange::new(range.end - 1, range.end);
        if mask.overlaps(&open) || mask.overlaps(&close) {
            continue;
        }
        let Some(rendered) = render(&caps, range) else {
            continue;
        };
        out.push_str(&text[last..range.start]);
        out.push_str(&rendered);
        last = range.end;
    }

    out.push_str(&text[last..]);
    out
}

/// True when the next character of `chars` continues a word or repeats
/// `delimiter`. Underscores emitted by an enclosing emphasis rule do not count.
fn joins(chars: &mut impl Iterator<Item = char>, delimiter: char) -> bool {
    match chars.next() {
        Some(c) if c == delimiter => true,
        Some('_') => underscores_join(chars),
        Some(c) => c.is_alphanumeric(),
        None => false,
    }
}

fn at_word_boundary(text: &str, range: ByteRange, delimiter: char) -> bool {
    !joins(&mut text[..range.start].chars().rev(), delimiter)
        && !joins(&mut text[range.end..].chars(), delimiter)
}

fn wrap_delimited(text: &str, re: &Regex, delimiter: char, wrapper: &str) -> String {
    replace_unclaimed(text, re, |caps, range| {
        at_word_boundary(text, range, delimiter).then(|| format!("{wrapper}{}{wrapper}", &caps[1]))
    })
}

/// Strip a recognised scheme from a label that is itself a URL
fn display_label(label: &str) -> String {
    let p = patterns();
    let trimmed = label.trim();
    if p.url.is_match(trimmed) {
        p.scheme.replace(trimmed, "").into_owned()
    } else {
        label.to_string()
    }
}

/// `[~user]` and `[~accountid:…]` to `@identifier`, or to whatever the
/// resolver returns for the identifier.
pub fn mentions(text: &str, resolver: &dyn MentionResolver) -> String {
    patterns()
        .mention
        .replace_all(text, |caps: &Captures| {
            let identifier = &caps[1];
            let key = identifier.strip_prefix("accountid:").unwrap_or(identifier);
            resolver
                .resolve(key)
                .unwrap_or_else(|| format!("@{identifier}"))
        })
        .into_owned()
}

/// `[^file.txt]` to `file.txt`
pub fn attachments(text: &str) -> String {
    patterns().attachment.replace_all(text, "$1").into_owned()
}

/// `!pic.png!` and `!pic.png|thumbnail!` to `![](pic.png)`
///
/// The name must look like a file or a URL (contain `.` or `/`), which keeps
/// exclamations such as `Done!Next!` as text.
pub fn images(text: &str) -> String {
    patterns()
        .image
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            if name.contains('.') || name.contains('/') {
                format!("![]({name})")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// `[label|target]` to `[label](target)` and `[http://x]` to `[x](http://x)`
pub fn links(text: &str) -> String {
    let p = patterns();

    let text = p.link.replace_all(text, |caps: &Captures| {
        format!("[{}]({})", display_label(&caps[1]), caps[2].trim())
    });

    p.bare_link
        .replace_all(&text, |caps: &Captures| {
            let followed_by_target = caps
                .get(0)
                .is_some_and(|m| text[m.end()..].starts_with('('));
            if followed_by_target {
                caps[0].to_string()
            } else {
                format!("[{}]({})", display_label(&caps[1]), &caps[1])
            }
        })
        .into_owned()
}

/// `_text_` to `__text__`
pub fn underline(text: &str) -> String {
    wrap_delimited(text, &patterns().underline, '_', "__")
}

/// `*text*` to `_text_`
pub fn emphasis(text: &str) -> String {
    wrap_delimited(text, &patterns().emphasis, '*', "_")
}

/// `+text+` to `**text**`
pub fn strong(text: &str) -> String {
    wrap_delimited(text, &patterns().strong, '+', "**")
}

/// `{{text}}` to `` `text` ``
pub fn monospace(text: &str) -> String {
    patterns().monospace.replace_all(text, "`$1`").into_owned()
}

/// `-text-` to `~~text~~`
///
/// Both dashes must sit at word boundaries and the content may not contain a
/// dash, so `a-b-c-d-e.abc.com` and `2025-06-03` are left as they are.
pub fn strikethrough(text: &str) -> String {
    wrap_delimited(text, &patterns().strikethrough, '-', "~~")
}

/// `{color:red}text{color}` to `text`
pub fn color(text: &str) -> String {
    patterns().color.replace_all(text, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Verbatim;

    struct Directory;

    impl MentionResolver for Directory {
        fn resolve(&self, identifier: &str) -> Option<String> {
            (identifier == "557058:abc").then(|| "<@42>".to_string())
        }
    }

    // ============================================================================
    // mentions / attachments / images tests
    // ============================================================================

    #[test]
    fn test_mentions_verbatim() {
        assert_eq!(mentions("hi [~bob]", &Verbatim), "hi @bob");
        assert_eq!(
            mentions("[~accountid:557058:abc]", &Verbatim),
            "@accountid:557058:abc"
        );
    }

    #[test]
    fn test_mentions_resolved_by_directory() {
        assert_eq!(
            mentions("ping [~accountid:557058:abc] and [~carol]", &Directory),
            "ping <@42> and @carol"
        );
    }

    #[test]
    fn test_attachments() {
        assert_eq!(attachments("see [^file.txt]"), "see file.txt");
    }

    #[test]
    fn test_images() {
        assert_eq!(images("!pic.png!"), "![](pic.png)");
        assert_eq!(images("!pic.png|thumbnail!"), "![](pic.png)");
        assert_eq!(
            images("!https://x.io/a.png!"),
            "![](https://x.io/a.png)"
        );
    }

    #[test]
    fn test_images_ignore_exclamations() {
        assert_eq!(images("Done!Next!"), "Done!Next!");
        assert_eq!(images("Hello! How are you!"), "Hello! How are you!");
    }

    // ============================================================================
    // links tests
    // ============================================================================

    #[test]
    fn test_links_label_and_target() {
        assert_eq!(
            links("[link|http://example.com]"),
            "[link](http://example.com)"
        );
    }

    #[test]
    fn test_links_url_label_loses_scheme() {
        assert_eq!(
            links("[https://example.com/a|https://example.com/a]"),
            "[example.com/a](https://example.com/a)"
        );
    }

    #[test]
    fn test_links_domain_label_kept() {
        assert_eq!(
            links("[example.com|http://example.com]"),
            "[example.com](http://example.com)"
        );
    }

    #[test]
    fn test_links_bare_url_in_brackets() {
        assert_eq!(
            links("[http://example.com]"),
            "[example.com](http://example.com)"
        );
    }

    #[test]
    fn test_links_leave_markdown_links_alone() {
        let md = "[http://example.com](http://example.com)";
        assert_eq!(links(md), md);
        assert_eq!(links("[text](http://x.io)"), "[text](http://x.io)");
    }

    #[test]
    fn test_links_unbalanced_bracket() {
        assert_eq!(links("[oops|http://x"), "[oops|http://x");
    }

    // ============================================================================
    // emphasis family tests
    // ============================================================================

    #[test]
    fn test_underline() {
        assert_eq!(underline("_underline_"), "__underline__");
    }

    #[test]
    fn test_underline_skips_snake_case() {
        assert_eq!(underline("my_var_name"), "my_var_name");
        assert_eq!(underline("__init__"), "__init__");
    }

    #[test]
    fn test_underline_skips_link_targets() {
        let text = "[docs](http://x.com/a_b_c)";
        assert_eq!(underline(text), text);
        assert_eq!(underline("http://x.com/a_b_c"), "http://x.com/a_b_c");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(emphasis("*italic*"), "_italic_");
        assert_eq!(emphasis("a *b c* d"), "a _b c_ d");
    }

    #[test]
    fn test_emphasis_keeps_markdown_bold() {
        assert_eq!(emphasis("**bold**"), "**bold**");
        assert_eq!(emphasis("2 * 3 * 4"), "2 * 3 * 4");
    }

    #[test]
    fn test_strong() {
        assert_eq!(strong("+bold+"), "**bold**");
        assert_eq!(strong("C++ and C++"), "C++ and C++");
        assert_eq!(strong("a+b+c"), "a+b+c");
    }

    #[test]
    fn test_emphasis_rules_skip_monospace() {
        assert_eq!(emphasis("{{*ptr*}}"), "{{*ptr*}}");
        assert_eq!(underline("{{_x_}}"), "{{_x_}}");
    }

    #[test]
    fn test_emphasis_rules_wrap_whole_placeholders() {
        assert_eq!(
            underline("_\u{E000}0\u{E001}_"),
            "__\u{E000}0\u{E001}__"
        );
    }

    #[test]
    fn test_emphasis_rules_skip_delimiters_inside_links() {
        let text = "[a](http://x.io/_y) z_";
        assert_eq!(underline(text), text);
        assert_eq!(
            emphasis("*see [a](http://x.io/a_b)*"),
            "_see [a](http://x.io/a_b)_"
        );
    }

    #[test]
    fn test_emphasis_around_url() {
        assert_eq!(emphasis("*see https://x.io/a*"), "_see https://x.io/a_");
        assert_eq!(strong("+https://x.io+"), "**https://x.io**");
        assert_eq!(strikethrough("-http://x.io-"), "~~http://x.io~~");
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(emphasis(&underline("_*x*_")), "___x___");
        assert_eq!(strong(&emphasis("*+x+*")), "_**x**_");
        assert_eq!(strong(&emphasis("+*x*+")), "**_x_**");
    }

    #[test]
    fn test_emphasis_skips_identifier_underscores() {
        assert_eq!(emphasis("file_*name*"), "file_*name*");
    }

    // ============================================================================
    // monospace / strikethrough / color tests
    // ============================================================================

    #[test]
    fn test_monospace() {
        assert_eq!(monospace("{{code}}"), "`code`");
        assert_eq!(monospace("{{a}} and {{b}}"), "`a` and `b`");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(strikethrough("-strike-"), "~~strike~~");
        assert_eq!(strikethrough("a -gone now- b"), "a ~~gone now~~ b");
    }

    #[test]
    fn test_strikethrough_leaves_hyphenated_domains() {
        assert_eq!(strikethrough("a-b-c-d-e.abc.com"), "a-b-c-d-e.abc.com");
    }

    #[test]
    fn test_strikethrough_leaves_dates() {
        assert_eq!(strikethrough("2025-06-03"), "2025-06-03");
        assert_eq!(
            strikethrough("from 2025-06-03 to 2025-07-01"),
            "from 2025-06-03 to 2025-07-01"
        );
    }

    #[test]
    fn test_strikethrough_leaves_list_markers_and_rules() {
        assert_eq!(strikethrough("- item"), "- item");
        assert_eq!(strikethrough("---"), "---");
    }

    #[test]
    fn test_strikethrough_skips_url_paths() {
        let text = "[x](http://h.com/-draft-/)";
        assert_eq!(strikethrough(text), text);
    }

    #[test]
    fn test_color() {
        assert_eq!(color("{color:red}red text{color}"), "red text");
        assert_eq!(color("{color:#00ff00}a\nb{color}"), "a\nb");
        assert_eq!(color("{color:red}open"), "{color:red}open");
    }
}
