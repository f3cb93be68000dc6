use std::sync::LazyLock;

use fancy_regex::Regex;

/// Matches a single quote, or a backslash that starts an escape other than
/// `\\` or `\"`. Those escapes only mean something inside a double-quote-style
/// literal.
///
/// `(?<!\\)(?:\\\\)*` skips over escaped backslash pairs so that `\\n` (an
/// escaped backslash followed by `n`) is not mistaken for `\n`.
static DOUBLE_QUOTES_REQUIRED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'|(?<!\\)(?:\\\\)*\\(?![\\"])"#).unwrap());

/// Whether `raw` (literal source text, escapes unprocessed) can only be
/// written inside a double-quote-style literal.
///
/// Non-UTF-8 text and regex evaluation failures answer `true`: when in doubt,
/// keep the interpolating form.
pub fn double_quotes_required(raw: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(raw) else {
        return true;
    };
    DOUBLE_QUOTES_REQUIRED_RE.is_match(text).unwrap_or(true)
}
