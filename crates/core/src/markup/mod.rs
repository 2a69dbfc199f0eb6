//! Jira wiki markup to Discord markdown.
//!
//! The transformer runs in four steps:
//!
//! 1. [`segment`] splits the input into literal code segments and markup
//!    segments.
//! 2. The markup segments are joined into one stream in which every literal
//!    segment is replaced by an opaque placeholder token.
//! 3. The ordered [`PIPELINE`] of [`Rule`]s rewrites the stream: block rules,
//!    then inline rules, then the bare-reference protection pass.
//! 4. The assembler collapses blank lines in the stream and substitutes each
//!    placeholder with its literal segment, rendering `{code}` and
//!    `{noformat}` blocks as fenced code.
//!
//! Literal segments never pass through a rule, so code is reproduced byte for
//! byte. All patterns are compiled once and shared; a call keeps no state.
//!
//! ```
//! use jira2discord_core::markup::jira_to_markdown;
//!
//! assert_eq!(
//!     jira_to_markdown("{code:go}fmt.Println(1){code}"),
//!     "```go\nfmt.Println(1)\n```"
//! );
//! assert_eq!(jira_to_markdown("+bold+ _under_ *it*"), "**bold** __under__ _it_");
//! ```

pub mod block;
pub mod inline;
pub mod mask;
pub mod protect;
pub mod segment;
pub mod span;

use std::sync::OnceLock;

use regex::{Captures, Regex};

pub use segment::{segment, Fence, Segment, SegmentKind};
pub use span::{ByteRange, SpanSet};

/// Opens the placeholder of an inline literal segment
const INLINE_OPEN: char = '\u{E000}';
/// Closes every placeholder
const PLACEHOLDER_CLOSE: char = '\u{E001}';
/// Opens the placeholder of a `{code}` / `{noformat}` segment
const BLOCK_OPEN: char = '\u{E002}';
/// Marks the start of a line that a block rule has already rewritten
pub(crate) const LINE_GUARD: char = '\u{E003}';

/// Maps a Jira user identifier to a chat mention.
///
/// Returning `None` leaves the mention as `@identifier`.
pub trait MentionResolver {
    fn resolve(&self, identifier: &str) -> Option<String>;
}

/// Resolver that keeps every identifier as written
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl MentionResolver for Verbatim {
    fn resolve(&self, _identifier: &str) -> Option<String> {
        None
    }
}

/// Where a rule sits in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Block,
    Inline,
    Protect,
}

/// One rewrite stage of the transformer.
///
/// Stages run in the order of [`PIPELINE`]. The order is part of the
/// contract: block rules run before inline rules so inline rules never see
/// block delimiters, underline runs before emphasis so `*x*` output (`_x_`)
/// is not read as underline, and protection runs last so it only sees final
/// link and code syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    CodeBlocks,
    Quotes,
    Headings,
    HorizontalRules,
    Lists,
    Tables,
    Mentions,
    Attachments,
    Images,
    Links,
    Underline,
    Emphasis,
    Strong,
    Monospace,
    Strikethrough,
    Color,
    BareReferences,
}

/// Every rule, in execution order
pub const PIPELINE: [Rule; 17] = [
    Rule::CodeBlocks,
    Rule::Quotes,
    Rule::Headings,
    Rule::HorizontalRules,
    Rule::Lists,
    Rule::Tables,
    Rule::Mentions,
    Rule::Attachments,
    Rule::Images,
    Rule::Links,
    Rule::Underline,
    Rule::Emphasis,
    Rule::Strong,
    Rule::Monospace,
    Rule::Strikethrough,
    Rule::Color,
    Rule::BareReferences,
];

/// The ordered rule table
pub fn rules() -> &'static [Rule] {
    &PIPELINE
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::CodeBlocks => "code-blocks",
            Rule::Quotes => "quotes",
            Rule::Headings => "headings",
            Rule::HorizontalRules => "horizontal-rules",
            Rule::Lists => "lists",
            Rule::Tables => "tables",
            Rule::Mentions => "mentions",
            Rule::Attachments => "attachments",
            Rule::Images => "images",
            Rule::Links => "links",
            Rule::Underline => "underline",
            Rule::Emphasis => "emphasis",
            Rule::Strong => "strong",
            Rule::Monospace => "monospace",
            Rule::Strikethrough => "strikethrough",
            Rule::Color => "color",
            Rule::BareReferences => "bare-references",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Rule::CodeBlocks
            | Rule::Quotes
            | Rule::Headings
            | Rule::HorizontalRules
            | Rule::Lists
            | Rule::Tables => Phase::Block,
            Rule::BareReferences => Phase::Protect,
            _ => Phase::Inline,
        }
    }

    /// Run this stage alone over a markup stream
    pub fn apply(&self, text: &str, mentions: &dyn MentionResolver) -> String {
        match self {
            Rule::CodeBlocks => block::code_blocks(text),
            Rule::Quotes => block::quotes(text),
            Rule::Headings => block::headings(text),
            Rule::HorizontalRules => block::horizontal_rules(text),
            Rule::Lists => block::lists(text),
            Rule::Tables => block::tables(text),
            Rule::Mentions => inline::mentions(text, mentions),
            Rule::Attachments => inline::attachments(text),
            Rule::Images => inline::images(text),
            Rule::Links => inline::links(text),
            Rule::Underline => inline::underline(text),
            Rule::Emphasis => inline::emphasis(text),
            Rule::Strong => inline::strong(text),
            Rule::Monospace => inline::monospace(text),
            Rule::Strikethrough => inline::strikethrough(text),
            Rule::Color => inline::color(text),
            Rule::BareReferences => protect::protect_bare_references(text),
        }
    }
}

struct Patterns {
    placeholder: Regex,
    newline_runs: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        placeholder: Regex::new(r"[\x{E000}\x{E002}]([0-9]+)\x{E001}").unwrap(),
        newline_runs: Regex::new(r"\n{2,}").unwrap(),
    })
}

fn is_reserved(c: char) -> bool {
    matches!(c, INLINE_OPEN | PLACEHOLDER_CLOSE | BLOCK_OPEN | LINE_GUARD)
}

/// Join markup segments into one stream, replacing literal segments with
/// placeholders. Reserved characters in the markup are replaced with U+FFFD
/// so they cannot forge a placeholder.
fn markup_stream(segments: &[Segment<'_>]) -> String {
    let mut stream = String::new();
    for (index, seg) in segments.iter().enumerate() {
        match seg.fence() {
            None => {
                let text = seg.text.replace("\r\n", "\n");
                if text.contains(is_reserved) {
                    stream.extend(
                        text.chars()
                            .map(|c| if is_reserved(c) { '\u{FFFD}' } else { c }),
                    );
                } else {
                    stream.push_str(&text);
                }
            }
            Some(fence) => {
                let open = if fence.is_wiki_block() && seg.terminated() {
                    BLOCK_OPEN
                } else {
                    INLINE_OPEN
                };
                stream.push(open);
                stream.push_str(&index.to_string());
                stream.push(PLACEHOLDER_CLOSE);
            }
        }
    }
    stream
}

/// Drop blank lines at the start and end of a code block body
fn trim_blank_lines(body: &str) -> &str {
    if body.trim().is_empty() {
        return "";
    }

    // Keep the indentation of the first non-blank line.
    let leading = body.len() - body.trim_start().len();
    let start = body[..leading].rfind('\n').map_or(0, |i| i + 1);
    let body = &body[start..];

    let content_end = body.trim_end().len();
    let end = body[content_end..]
        .find('\n')
        .map_or(body.len(), |i| content_end + i);
    body[..end].trim_end_matches('\r')
}

/// Final text of a literal segment
fn render_literal(seg: &Segment<'_>) -> String {
    match seg.fence() {
        Some(Fence::Code { language }) if seg.terminated() => format!(
            "```{}\n{}\n```",
            language.as_deref().unwrap_or(""),
            trim_blank_lines(seg.interior())
        ),
        Some(Fence::NoFormat) if seg.terminated() => {
            format!("```\n{}\n```", trim_blank_lines(seg.interior()))
        }
        _ => seg.text.to_string(),
    }
}

/// Quote prefix (`> `, `> > `) of the line that ends at `offset`, if any
fn quote_prefix(text: &str, offset: usize) -> Option<&str> {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..offset];
    (prefix.starts_with('>') && prefix.chars().all(|c| c == '>' || c == ' ')).then_some(prefix)
}

/// Repeat `prefix` on every line after the first, so a fenced block opened
/// inside a quote stays inside it.
fn continue_quote(rendered: &str, prefix: &str) -> String {
    rendered
        .split('\n')
        .enumerate()
        .map(|(i, line)| match i {
            0 => line.to_string(),
            _ if line.is_empty() => prefix.trim_end().to_string(),
            _ => format!("{prefix}{line}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assemble(stream: &str, segments: &[Segment<'_>]) -> String {
    let p = patterns();
    let collapsed = p.newline_runs.replace_all(stream, "\n");
    let unguarded = collapsed.replace(LINE_GUARD, "");
    p.placeholder
        .replace_all(&unguarded, |caps: &Captures| {
            let Some(rendered) = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| segments.get(index))
                .map(render_literal)
            else {
                return String::new();
            };

            let quoted = caps
                .get(0)
                .filter(|m| m.as_str().starts_with(BLOCK_OPEN))
                .and_then(|m| quote_prefix(&unguarded, m.start()));
            match quoted {
                Some(prefix) => continue_quote(&rendered, prefix),
                None => rendered,
            }
        })
        .into_owned()
}

/// Convert Jira wiki markup to Discord markdown, keeping mentions verbatim
pub fn jira_to_markdown(input: &str) -> String {
    jira_to_markdown_with(input, &Verbatim)
}

/// Convert Jira wiki markup to Discord markdown, resolving `[~user]`
/// mentions through `mentions`.
pub fn jira_to_markdown_with(input: &str, mentions: &dyn MentionResolver) -> String {
    if input.is_empty() {
        return String::new();
    }

    let segments = segment(input);
    let stream = PIPELINE
        .iter()
        .fold(markup_stream(&segments), |text, rule| {
            rule.apply(&text, mentions)
        });

    assemble(&stream, &segments)
}
