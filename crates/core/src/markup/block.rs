//! Block-level rewrites: code blocks, quotes, panels, headings, rules, lists
//! and tables.
//!
//! Every function here takes the markup stream (literal segments already
//! replaced by placeholders) and returns the rewritten stream.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::LINE_GUARD;

/// Token that replaces a whole run of table lines
pub const TABLE_PLACEHOLDER: &str = "[TABLE Content]";

struct Patterns {
    code_block: Regex,
    quote: Regex,
    panel: Regex,
    bq: Regex,
    heading: Regex,
    rule: Regex,
    list: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        code_block: Regex::new(r"\x{E002}[0-9]+\x{E001}").unwrap(),
        quote: Regex::new(r"(?s)\{quote\}(.*?)\{quote\}").unwrap(),
        panel: Regex::new(r"(?s)\{panel(?::([^}]*))?\}(.*?)\{panel\}").unwrap(),
        bq: Regex::new(r"(?m)^bq\.[ \t]+").unwrap(),
        heading: Regex::new(r"(?m)^((?:> ?)*)h([1-6])\.[ \t]+(\S.*)$").unwrap(),
        rule: Regex::new(r"(?m)^((?:> ?)*)[ \t]*-{4,}[ \t]*$").unwrap(),
        list: Regex::new(r"(?m)^((?:> ?)*)[ \t]*([*#]+)[ \t]+").unwrap(),
    })
}

/// Surround `block` with newlines where the neighbouring text would otherwise
/// share its first or last line.
fn isolate(text: &str, start: usize, end: usize, block: &str) -> String {
    let mut out = String::with_capacity(block.len() + 2);
    if start > 0 && !text[..start].ends_with('\n') {
        out.push('\n');
    }
    out.push_str(block);
    if end < text.len() && !text[end..].starts_with('\n') {
        out.push('\n');
    }
    out
}

fn quote_lines(content: &str) -> String {
    content
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
        .join("\n")
}

fn panel_title(params: &str) -> Option<&str> {
    params
        .split('|')
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("title"))
        .map(|(_, value)| value.trim())
        .filter(|title| !title.is_empty())
}

/// Put every `{code}` / `{noformat}` placeholder on its own line
pub fn code_blocks(text: &str) -> String {
    patterns()
        .code_block
        .replace_all(text, |caps: &Captures| match caps.get(0) {
            Some(m) => isolate(text, m.start(), m.end(), m.as_str()),
            None => String::new(),
        })
        .into_owned()
}

/// `{quote}`, `{panel}` and `bq.` to `>` block quotes
pub fn quotes(text: &str) -> String {
    let p = patterns();

    let text = p.quote.replace_all(text, |caps: &Captures| match caps.get(0) {
        Some(m) => isolate(text, m.start(), m.end(), &quote_lines(&caps[1])),
        None => String::new(),
    });

    let text = p.panel.replace_all(&text, |caps: &Captures| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        let body = quote_lines(&caps[2]);
        let block = match caps.get(1).and_then(|params| panel_title(params.as_str())) {
            Some(title) if body.is_empty() => format!("> **{title}**"),
            Some(title) => format!("> **{title}**\n{body}"),
            None => body,
        };
        isolate(&text, m.start(), m.end(), &block)
    });

    p.bq.replace_all(&text, "> ").into_owned()
}

/// `h1.` … `h6.` to `#` … `######`
///
/// Rewritten lines start with [`LINE_GUARD`] so the list rule does not read
/// the new `#` run as a numbered-list marker.
pub fn headings(text: &str) -> String {
    patterns()
        .heading
        .replace_all(text, |caps: &Captures| {
            let level = caps[2].parse::<usize>().unwrap_or(1);
            format!(
                "{}{}{} {}",
                LINE_GUARD,
                &caps[1],
                "#".repeat(level),
                caps[3].trim_end()
            )
        })
        .into_owned()
}

/// Four or more dashes alone on a line to `---`
pub fn horizontal_rules(text: &str) -> String {
    patterns().rule.replace_all(text, "${1}---").into_owned()
}

/// `*` bullets to `-`, `#` numbered items to `1.`
///
/// Nested markers (`**`, `##`, `*#`) indent two spaces per extra level; the
/// innermost marker decides bullet versus number.
pub fn lists(text: &str) -> String {
    patterns()
        .list
        .replace_all(text, |caps: &Captures| {
            let markers = &caps[2];
            let depth = markers.chars().count();
            let marker = if markers.ends_with('#') { "1." } else { "-" };
            format!("{}{}{} ", &caps[1], "  ".repeat(depth - 1), marker)
        })
        .into_owned()
}

fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed[1..].contains('|')
}

/// Collapse each contiguous run of table lines into [`TABLE_PLACEHOLDER`]
pub fn tables(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut in_table = false;

    for line in text.split('\n') {
        if is_table_line(line) {
            if !in_table {
                out.push(TABLE_PLACEHOLDER);
                in_table = true;
            }
        } else {
            in_table = false;
            out.push(line);
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_guards(text: String) -> String {
        text.replace(LINE_GUARD, "")
    }

    // ============================================================================
    // code_blocks tests
    // ============================================================================

    #[test]
    fn test_code_blocks_isolates_inline_placeholder() {
        let text = "run \u{E002}0\u{E001} now";
        assert_eq!(code_blocks(text), "run \n\u{E002}0\u{E001}\n now");
    }

    #[test]
    fn test_code_blocks_leaves_isolated_placeholder() {
        let text = "a\n\u{E002}0\u{E001}\nb";
        assert_eq!(code_blocks(text), text);
    }

    #[test]
    fn test_code_blocks_ignores_inline_literal_placeholders() {
        let text = "x \u{E000}0\u{E001} y";
        assert_eq!(code_blocks(text), text);
    }

    // ============================================================================
    // quotes tests
    // ============================================================================

    #[test]
    fn test_quotes_quote_block() {
        assert_eq!(quotes("{quote}line1\nline2{quote}"), "> line1\n> line2");
    }

    #[test]
    fn test_quotes_quote_block_trims_edges() {
        assert_eq!(quotes("{quote}\n  line1\n{quote}"), "> line1");
    }

    #[test]
    fn test_quotes_blank_line_inside_quote() {
        assert_eq!(quotes("{quote}a\n\nb{quote}"), "> a\n>\n> b");
    }

    #[test]
    fn test_quotes_panel_with_title() {
        assert_eq!(
            quotes("{panel:title=Notes}line one\nline two{panel}"),
            "> **Notes**\n> line one\n> line two"
        );
    }

    #[test]
    fn test_quotes_panel_with_extra_parameters() {
        assert_eq!(
            quotes("{panel:borderStyle=dashed|title=Deploy}go{panel}"),
            "> **Deploy**\n> go"
        );
    }

    #[test]
    fn test_quotes_panel_without_title() {
        assert_eq!(quotes("{panel}just text{panel}"), "> just text");
    }

    #[test]
    fn test_quotes_block_is_moved_to_its_own_line() {
        assert_eq!(
            quotes("before {quote}q{quote} after"),
            "before \n> q\n after"
        );
    }

    #[test]
    fn test_quotes_bq_line() {
        assert_eq!(quotes("bq. quote\nplain"), "> quote\nplain");
    }

    #[test]
    fn test_quotes_unterminated_quote_is_left_alone() {
        assert_eq!(quotes("{quote}never closed"), "{quote}never closed");
    }

    // ============================================================================
    // headings / rules / lists tests
    // ============================================================================

    #[test]
    fn test_headings_all_levels() {
        for level in 1..=6 {
            let input = format!("h{level}. Title");
            let expected = format!("{} Title", "#".repeat(level));
            assert_eq!(strip_guards(headings(&input)), expected);
        }
    }

    #[test]
    fn test_headings_requires_line_start() {
        assert_eq!(headings("see h2. here"), "see h2. here");
    }

    #[test]
    fn test_headings_does_not_span_lines() {
        assert_eq!(headings("h2.\nTitle"), "h2.\nTitle");
    }

    #[test]
    fn test_headings_require_text() {
        assert_eq!(headings("h1.  "), "h1.  ");
        assert_eq!(headings("h2.\t\nnext"), "h2.\t\nnext");
    }

    #[test]
    fn test_headings_inside_quote() {
        assert_eq!(strip_guards(headings("> h3. Quoted")), "> ### Quoted");
    }

    #[test]
    fn test_headings_survive_list_rule() {
        assert_eq!(strip_guards(lists(&headings("h1. Title"))), "# Title");
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(horizontal_rules("----"), "---");
        assert_eq!(horizontal_rules("a\n-------  \nb"), "a\n---\nb");
        assert_eq!(horizontal_rules("---"), "---");
        assert_eq!(horizontal_rules("x ----"), "x ----");
    }

    #[test]
    fn test_lists_bullets_and_numbers() {
        assert_eq!(lists("* item"), "- item");
        assert_eq!(lists("# item"), "1. item");
        assert_eq!(lists("  * indented"), "- indented");
    }

    #[test]
    fn test_lists_nested_markers() {
        assert_eq!(
            lists("* one\n** two\n*# three"),
            "- one\n  - two\n  1. three"
        );
    }

    #[test]
    fn test_lists_ignores_emphasis_at_line_start() {
        assert_eq!(lists("*bold* start"), "*bold* start");
    }

    // ============================================================================
    // tables tests
    // ============================================================================

    #[test]
    fn test_tables_header_row() {
        assert_eq!(tables("||A||B||"), TABLE_PLACEHOLDER);
    }

    #[test]
    fn test_tables_body_row() {
        assert_eq!(tables("|1|2|"), TABLE_PLACEHOLDER);
    }

    #[test]
    fn test_tables_collapse_whole_run() {
        let input = "intro\n||A||B||\n|1|2|\n|3|4|\n|5|6|\noutro";
        assert_eq!(tables(input), format!("intro\n{TABLE_PLACEHOLDER}\noutro"));
    }

    #[test]
    fn test_tables_separate_runs_get_separate_placeholders() {
        let input = "|1|2|\ntext\n|3|4|";
        assert_eq!(
            tables(input),
            format!("{TABLE_PLACEHOLDER}\ntext\n{TABLE_PLACEHOLDER}")
        );
    }

    #[test]
    fn test_tables_ignore_inline_pipes() {
        assert_eq!(tables("[foo|http://bar]"), "[foo|http://bar]");
        assert_eq!(tables("a | b | c"), "a | b | c");
    }
}
