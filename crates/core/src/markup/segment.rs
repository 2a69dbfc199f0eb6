//! Splits a document into literal (code) and markup segments.
//!
//! The scan recognises four literal constructs: triple-backtick fences,
//! single-backtick spans, and Jira `{code}` / `{noformat}` blocks. Whichever
//! delimiter opens first is closed only by the same delimiter, so a backtick
//! inside a `{code}` block or a `{{` inside a fence is plain content.

use std::sync::OnceLock;

use regex::Regex;

use super::span::ByteRange;

/// The delimiter that opened a literal segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fence {
    /// `` `code` ``
    Backtick,
    /// ```` ```code``` ````
    TripleBacktick,
    /// `{code}` or `{code:lang}`
    Code { language: Option<String> },
    /// `{noformat}`
    NoFormat,
}

impl Fence {
    /// True for the Jira block forms that get rendered as fenced code
    pub fn is_wiki_block(&self) -> bool {
        matches!(self, Fence::Code { .. } | Fence::NoFormat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Markup,
    Literal {
        fence: Fence,
        /// False when the input ended before the closing delimiter
        terminated: bool,
    },
}

/// A contiguous slice of the input, tagged literal or markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub range: ByteRange,
    pub kind: SegmentKind,
    open_len: usize,
    close_len: usize,
}

impl<'a> Segment<'a> {
    fn markup(input: &'a str, range: ByteRange) -> Self {
        Segment {
            text: range.slice(input),
            range,
            kind: SegmentKind::Markup,
            open_len: 0,
            close_len: 0,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, SegmentKind::Literal { .. })
    }

    pub fn fence(&self) -> Option<&Fence> {
        match &self.kind {
            SegmentKind::Literal { fence, .. } => Some(fence),
            SegmentKind::Markup => None,
        }
    }

    /// False only for a literal whose closing delimiter never appeared
    pub fn terminated(&self) -> bool {
        !matches!(
            self.kind,
            SegmentKind::Literal {
                terminated: false,
                ..
            }
        )
    }

    /// The text between the delimiters (the whole text for markup segments)
    pub fn interior(&self) -> &'a str {
        &self.text[self.open_len..self.text.len() - self.close_len]
    }
}

struct Opener {
    fence: Fence,
    open_len: usize,
    close: &'static str,
}

fn wiki_block_opener() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\{(code|noformat)(?::([^}\n]*))?\}").unwrap())
}

/// Pick the language out of `{code:...}` parameters.
///
/// Accepts both the short form (`{code:java}`) and the keyed form
/// (`{code:title=Foo.java|language=java}`).
fn code_language(params: &str) -> Option<String> {
    params
        .split('|')
        .map(str::trim)
        .find_map(|param| match param.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("language") => {
                Some(value.trim())
            }
            Some(_) => None,
            None => Some(param),
        })
        .filter(|lang| {
            !lang.is_empty()
                && lang
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "_+#.-".contains(c))
        })
        .map(str::to_string)
}

/// Byte offsets of the last `{code}` and `{noformat}` closers.
///
/// A wiki block only opens when its closer appears later in the input, which
/// keeps a run of unterminated openers from rescanning the tail each time.
struct Closers {
    code: Option<usize>,
    noformat: Option<usize>,
}

fn opener_at(input: &str, pos: usize, closers: &Closers) -> Option<Opener> {
    let rest = &input[pos..];
    let bytes = input.as_bytes();

    if rest.starts_with("```") {
        return Some(Opener {
            fence: Fence::TripleBacktick,
            open_len: 3,
            close: "```",
        });
    }
    if rest.starts_with('`') {
        return Some(Opener {
            fence: Fence::Backtick,
            open_len: 1,
            close: "`",
        });
    }
    if !rest.starts_with('{') || (pos > 0 && bytes[pos - 1] == b'{') {
        return None;
    }

    let caps = wiki_block_opener().captures(rest)?;
    let open_len = caps.get(0)?.end();
    let body_start = pos + open_len;
    let (fence, close, last_close) = match &caps[1] {
        "code" => (
            Fence::Code {
                language: caps.get(2).and_then(|p| code_language(p.as_str())),
            },
            "{code}",
            closers.code,
        ),
        _ => (Fence::NoFormat, "{noformat}", closers.noformat),
    };

    match last_close {
        Some(at) if at >= body_start => Some(Opener {
            fence,
            open_len,
            close,
        }),
        _ => None,
    }
}

/// Partition `input` into literal and markup segments.
///
/// Concatenating the `text` of every returned segment reproduces `input`
/// exactly. An unterminated backtick or fence turns the remaining input into
/// one literal segment with `terminated: false`.
pub fn segment(input: &str) -> Vec<Segment<'_>> {
    let closers = Closers {
        code: input.rfind("{code}"),
        noformat: input.rfind("{noformat}"),
    };
    let mut segments = Vec::new();
    let mut markup_start = 0;
    let mut pos = 0;

    while pos < input.len() {
        if !input.is_char_boundary(pos) {
            pos += 1;
            continue;
        }
        let Some(opener) = opener_at(input, pos, &closers) else {
            pos += 1;
            continue;
        };

        if markup_start < pos {
            segments.push(Segment::markup(input, ByteRange::new(markup_start, pos)));
        }

        let body_start = pos + opener.open_len;
        let (end, terminated) = match input[body_start..].find(opener.close) {
            Some(offset) => (body_start + offset + opener.close.len(), true),
            None => (input.len(), false),
        };
        let range = ByteRange::new(pos, end);
        segments.push(Segment {
            text: range.slice(input),
            range,
            kind: SegmentKind::Literal {
                fence: opener.fence,
                terminated,
            },
            open_len: opener.open_len,
            close_len: if terminated { opener.close.len() } else { 0 },
        });

        pos = end;
        markup_start = end;
    }

    if markup_start < input.len() {
        segments.push(Segment::markup(
            input,
            ByteRange::new(markup_start, input.len()),
        ));
    }

    segments
}
