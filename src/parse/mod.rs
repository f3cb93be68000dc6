pub mod directives;
pub mod source;

/// Parse Ruby source bytes using Prism.
///
/// `ParseResult` is `!Send`, so call this on the thread that walks the tree.
pub fn parse_source(source: &[u8]) -> ruby_prism::ParseResult<'_> {
    ruby_prism::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_word_arrays_cleanly() {
        let result = parse_source(b"a = %W(x y)\nb = %w[z]\n");
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn unterminated_literal_reports_errors() {
        let result = parse_source(b"%W(a b");
        assert!(result.errors().count() > 0);
    }
}
