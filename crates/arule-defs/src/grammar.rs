//! Line grammar shared by SDEF and NDEF files.
//!
//! ```text
//! KEY = VALUE;      % trailing comment
//! % full-line comment
//! ```
//!
//! `KEY` is an identifier at the start of a line. `VALUE` is either a
//! single-quoted string or a bare token of word, digit, dot, minus and
//! underscore characters. Anything after the `;` is ignored.

use regex::Regex;
use std::sync::LazyLock;

static ENTRY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*([A-Za-z_][A-Za-z0-9_]*)[ \t]*=[ \t]*(?:'([^'\r\n]*)'|([A-Za-z0-9_.\-]+))[ \t]*;")
        .expect("entry line pattern is valid")
});

static BARE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("bare token pattern is valid"));

/// One `KEY = VALUE;` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefEntry {
    pub key: String,
    pub value: String,
    pub quoted: bool,
    /// 1-based line number in the source text.
    pub line: usize,
}

/// Extract every entry in file order. Comment and blank lines are skipped.
pub fn parse_entries(text: &str) -> Vec<DefEntry> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = ENTRY_LINE.captures(line)?;
            let key = caps.get(1)?.as_str().to_string();
            let (value, quoted) = match (caps.get(2), caps.get(3)) {
                (Some(q), _) => (q.as_str().to_string(), true),
                (None, Some(bare)) => (bare.as_str().to_string(), false),
                (None, None) => return None,
            };
            Some(DefEntry {
                key,
                value,
                quoted,
                line: idx + 1,
            })
        })
        .collect()
}

/// True when `token` can be written unquoted and read back unchanged.
pub fn is_bare_token(token: &str) -> bool {
    BARE_TOKEN.is_match(token)
}

/// Render a float so it reads back to the same value and always carries a
/// decimal point (`24` becomes `24.0`, `1.275` stays `1.275`).
pub fn format_real(value: f64) -> String {
    let mut text = format!("{value}");
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}
