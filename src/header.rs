//! Navigation headers linking a note to its chronological neighbours.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Extension stripped from note names before they become link targets
pub const NOTE_EXTENSION: &str = ".md";

static PREV_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{prev\}").expect("prev token regex"));
static NEXT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{next\}").expect("next token regex"));
static ANY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{(prev|next)\}").expect("link token regex"));

/// Region replaced when a folder is conformed: the tag marker through the
/// last closing `span>` in the note. Greedy, so conforming is not
/// idempotent for hand-edited headers. The region spans `\n` but stops at
/// `\r` and the Unicode line and paragraph separators.
static HEADER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#zettelkasten[^\r\x{2028}\x{2029}]*span>").expect("header block regex")
});

/// Wrap a note name in a wiki-link token
pub fn link(name: &str) -> String {
    format!("[[{}]]", name)
}

/// Drop the first `.md` occurrence from a file name
pub fn bare_name(name: &str) -> String {
    name.replacen(NOTE_EXTENSION, "", 1)
}

/// Replace the first generated header block in `text` with `block`.
///
/// Text without a block is returned unchanged.
pub fn replace_header_block(text: &str, block: &str) -> String {
    HEADER_BLOCK.replace(text, NoExpand(block)).into_owned()
}

/// A header template with `{prev}` and `{next}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFormat {
    format: String,
}

impl HeaderFormat {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.format
    }

    /// Substitute every `{prev}`/`{next}` (any case) with a link to the
    /// given names. Names are used as-is; callers strip extensions.
    pub fn render(&self, prev: &str, next: &str) -> String {
        let prev_link = link(prev);
        let next_link = link(next);
        let with_prev = PREV_TOKEN.replace_all(&self.format, NoExpand(&prev_link));
        NEXT_TOKEN
            .replace_all(&with_prev, NoExpand(&next_link))
            .into_owned()
    }

    /// Recover the `(prev, next)` link names from text rendered with this
    /// format. Returns `None` if the format lacks either token or the text
    /// does not contain a rendered header.
    pub fn parse_links(&self, text: &str) -> Option<(String, String)> {
        let mut pattern = String::new();
        let mut cursor = 0;
        let mut seen_prev = false;
        let mut seen_next = false;

        for token in ANY_TOKEN.captures_iter(&self.format) {
            let whole = token.get(0)?;
            pattern.push_str(&regex::escape(&self.format[cursor..whole.start()]));
            cursor = whole.end();

            let is_prev = token.get(1)?.as_str().eq_ignore_ascii_case("prev");
            // the regex crate rejects duplicate group names
            let group = match (is_prev, seen_prev, seen_next) {
                (true, false, _) => {
                    seen_prev = true;
                    "(?P<prev>[^\\]]*)"
                }
                (false, _, false) => {
                    seen_next = true;
                    "(?P<next>[^\\]]*)"
                }
                _ => "[^\\]]*",
            };
            pattern.push_str("\\[\\[");
            pattern.push_str(group);
            pattern.push_str("\\]\\]");
        }
        pattern.push_str(&regex::escape(&self.format[cursor..]));

        if !(seen_prev && seen_next) {
            return None;
        }

        let captures = Regex::new(&pattern).ok()?.captures(text)?;
        Some((
            captures.name("prev")?.as_str().to_string(),
            captures.name("next")?.as_str().to_string(),
        ))
    }
}
