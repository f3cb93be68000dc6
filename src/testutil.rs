use ruby_prism::Visit;

use crate::cop::registry::CopRegistry;
use crate::cop::walker::{ActiveCop, LiteralWalker};
use crate::cop::{Cop, CopConfig};
use crate::correction::EditSet;
use crate::diagnostic::Diagnostic;
use crate::parse::parse_source;
use crate::parse::source::SourceFile;

/// An expected offense parsed from a fixture annotation.
#[derive(Debug, Clone)]
pub struct ExpectedOffense {
    pub line: usize,
    pub column: usize,
    pub cop_name: String,
    pub message: String,
}

struct RawAnnotation {
    column: usize,
    cop_name: String,
    message: String,
}

/// Try to parse an annotation line.
///
/// Annotation format: optional leading whitespace, one or more `^`, a space,
/// then `Department/CopName: Message`. The offense column is the position of
/// the first `^`.
///
/// Lines that merely contain `^` (Ruby XOR, carets in strings) are rejected:
/// the caret must be the first non-whitespace character and must be followed
/// by a `Dept/Name: ` prefix.
fn try_parse_annotation(line: &str) -> Option<RawAnnotation> {
    let trimmed = line.trim_start();
    let carets = trimmed.bytes().take_while(|&b| b == b'^').count();
    if carets == 0 {
        return None;
    }
    let rest = trimmed[carets..].strip_prefix(' ')?.trim_end();
    let (cop_name, message) = rest.split_once(": ")?;
    if !cop_name.contains('/') || cop_name.contains(' ') {
        return None;
    }

    Some(RawAnnotation {
        column: line.len() - trimmed.len(),
        cop_name: cop_name.to_string(),
        message: message.to_string(),
    })
}

/// Split fixture content into clean source bytes and expected offenses.
///
/// Annotations must appear *after* the source line they reference; the
/// annotated line number is the count of source lines seen so far.
///
/// # Panics
///
/// Panics if an annotation appears before any source line.
pub fn parse_fixture(raw: &[u8]) -> (Vec<u8>, Vec<ExpectedOffense>) {
    let text = std::str::from_utf8(raw).expect("fixture must be valid UTF-8");

    let mut source_lines: Vec<&str> = Vec::new();
    let mut expected: Vec<ExpectedOffense> = Vec::new();

    for (raw_idx, line) in text.split('\n').enumerate() {
        match try_parse_annotation(line) {
            Some(annotation) => {
                assert!(
                    !source_lines.is_empty(),
                    "Annotation on raw line {} appears before any source line: {line:?}",
                    raw_idx + 1,
                );
                expected.push(ExpectedOffense {
                    line: source_lines.len(),
                    column: annotation.column,
                    cop_name: annotation.cop_name,
                    message: annotation.message,
                });
            }
            None => source_lines.push(line),
        }
    }

    (source_lines.join("\n").into_bytes(), expected)
}

fn single_cop_registry(cop: impl Cop + 'static) -> CopRegistry {
    let mut registry = CopRegistry::new();
    registry.register(Box::new(cop));
    registry
}

/// Run one cop over `source_bytes`. Returns its diagnostics and, when
/// `correcting`, the corrected source.
fn run(
    cop: impl Cop + 'static,
    source_bytes: &[u8],
    config: &CopConfig,
    correcting: bool,
) -> (Vec<Diagnostic>, Option<Vec<u8>>) {
    let registry = single_cop_registry(cop);
    let source = SourceFile::from_bytes("test.rb", source_bytes.to_vec());
    let parse_result = parse_source(source.as_bytes());
    assert_eq!(
        parse_result.errors().count(),
        0,
        "fixture source does not parse:\n{}",
        String::from_utf8_lossy(source_bytes),
    );

    let active = [Some(ActiveCop {
        config,
        autocorrect: correcting,
    })];
    let mut walker = LiteralWalker::new(&registry, &source, &active, correcting);
    walker.visit(&parse_result.node());

    let corrected = walker
        .corrector
        .map(|c| EditSet::from_edits(c.into_edits()).apply(source.as_bytes()));
    let mut diagnostics = walker.diagnostics;
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    (diagnostics, corrected)
}

/// Run a cop on raw source bytes and return the diagnostics.
pub fn run_cop_full(cop: impl Cop + 'static, source_bytes: &[u8]) -> Vec<Diagnostic> {
    run_cop_full_with_config(cop, source_bytes, CopConfig::default())
}

pub fn run_cop_full_with_config(
    cop: impl Cop + 'static,
    source_bytes: &[u8],
    config: CopConfig,
) -> Vec<Diagnostic> {
    run(cop, source_bytes, &config, false).0
}

/// Run a cop with correction enabled and return the rewritten source.
pub fn autocorrect_source(cop: impl Cop + 'static, source_bytes: &[u8]) -> Vec<u8> {
    let config = CopConfig::default();
    run(cop, source_bytes, &config, true)
        .1
        .unwrap_or_else(|| source_bytes.to_vec())
}

/// Run a cop on an annotated fixture and assert the offenses match.
///
/// Expected and actual offenses are compared in (line, column) order, so
/// annotation order in the fixture does not matter.
pub fn assert_cop_offenses_full(cop: impl Cop + 'static, fixture_bytes: &[u8]) {
    let (clean_source, mut expected) = parse_fixture(fixture_bytes);
    let diagnostics = run_cop_full(cop, &clean_source);
    expected.sort_by_key(|e| (e.line, e.column));

    assert_eq!(
        diagnostics.len(),
        expected.len(),
        "Expected {} offense(s) but got {}.\nExpected:\n{}\nActual:\n{}",
        expected.len(),
        diagnostics.len(),
        format_expected(&expected),
        format_diagnostics(&diagnostics),
    );

    for (i, (diag, exp)) in diagnostics.iter().zip(&expected).enumerate() {
        assert_eq!(
            (diag.location.line, diag.location.column),
            (exp.line, exp.column),
            "Offense #{}: position mismatch\n  expected: {}:{} {}: {}\n  actual:   {diag}",
            i + 1,
            exp.line,
            exp.column,
            exp.cop_name,
            exp.message,
        );
        assert_eq!(diag.cop_name, exp.cop_name, "Offense #{}: cop name mismatch", i + 1);
        assert_eq!(diag.message, exp.message, "Offense #{}: message mismatch", i + 1);
    }
}

/// Assert a cop produces no offenses on the given source bytes.
pub fn assert_cop_no_offenses_full(cop: impl Cop + 'static, source_bytes: &[u8]) {
    let diagnostics = run_cop_full(cop, source_bytes);
    assert!(
        diagnostics.is_empty(),
        "Expected no offenses but got {}:\n{}",
        diagnostics.len(),
        format_diagnostics(&diagnostics),
    );
}

/// Autocorrect an annotated fixture and compare against the expected output.
pub fn assert_cop_autocorrect(cop: impl Cop + 'static, fixture_bytes: &[u8], expected: &[u8]) {
    let (clean_source, _) = parse_fixture(fixture_bytes);
    let corrected = autocorrect_source(cop, &clean_source);
    assert_eq!(
        String::from_utf8_lossy(&corrected),
        String::from_utf8_lossy(expected),
        "autocorrected output differs from expected",
    );
}

fn format_expected(expected: &[ExpectedOffense]) -> String {
    expected
        .iter()
        .map(|e| format!("  {}:{} {}: {}", e.line, e.column, e.cop_name, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate `offense_fixture` / `no_offense_fixture` tests reading
/// `testdata/<dir>/offense.rb` and `testdata/<dir>/no_offense.rb`.
#[macro_export]
macro_rules! cop_fixture_tests {
    ($cop:expr, $dir:literal) => {
        #[test]
        fn offense_fixture() {
            $crate::testutil::assert_cop_offenses_full(
                $cop,
                include_bytes!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/testdata/",
                    $dir,
                    "/offense.rb"
                )),
            );
        }

        #[test]
        fn no_offense_fixture() {
            $crate::testutil::assert_cop_no_offenses_full(
                $cop,
                include_bytes!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/testdata/",
                    $dir,
                    "/no_offense.rb"
                )),
            );
        }
    };
}

/// Generate an `autocorrect_fixture` test checking that correcting
/// `offense.rb` yields `corrected.rb`.
#[macro_export]
macro_rules! cop_autocorrect_fixture_tests {
    ($cop:expr, $dir:literal) => {
        #[test]
        fn autocorrect_fixture() {
            $crate::testutil::assert_cop_autocorrect(
                $cop,
                include_bytes!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/testdata/",
                    $dir,
                    "/offense.rb"
                )),
                include_bytes!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/testdata/",
                    $dir,
                    "/corrected.rb"
                )),
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_annotation_with_indent() {
        let ann = try_parse_annotation("    ^^^ Style/RedundantCapitalW: some message").unwrap();
        assert_eq!(ann.column, 4);
        assert_eq!(ann.cop_name, "Style/RedundantCapitalW");
        assert_eq!(ann.message, "some message");
    }

    #[test]
    fn parse_annotation_keeps_backticks() {
        let ann = try_parse_annotation("^ Style/X: Use `%w` instead of `%W`.").unwrap();
        assert_eq!(ann.column, 0);
        assert_eq!(ann.message, "Use `%w` instead of `%W`.");
    }

    #[test]
    fn rejects_non_annotations() {
        assert!(try_parse_annotation("x = 1").is_none());
        assert!(try_parse_annotation("x ^ y").is_none());
        assert!(try_parse_annotation("^^^ no slash here").is_none());
        assert!(try_parse_annotation("^^^Style/Foo: msg").is_none());
        assert!(try_parse_annotation("^^^ Style/Foo msg").is_none());
        assert!(try_parse_annotation("").is_none());
    }

    #[test]
    fn parse_fixture_strips_annotations() {
        let raw = b"a = %W(x)\n    ^^^^^ Style/RedundantCapitalW: m\nb = 1\n";
        let (clean, expected) = parse_fixture(raw);
        assert_eq!(clean, b"a = %W(x)\nb = 1\n");
        assert_eq!(expected.len(), 1);
        assert_eq!(expected[0].line, 1);
        assert_eq!(expected[0].column, 4);
    }

    #[test]
    fn parse_fixture_multiple_annotations_for_one_line() {
        let raw = b"[%W(a), %W(b)]\n ^^^^^ A/B: m1\n        ^^^^^ A/B: m2\n";
        let (_, expected) = parse_fixture(raw);
        assert_eq!(expected.len(), 2);
        assert!(expected.iter().all(|e| e.line == 1));
        assert_eq!(expected[1].column, 8);
    }

    #[test]
    #[should_panic(expected = "appears before any source line")]
    fn annotation_before_source_panics() {
        parse_fixture(b"^^^ A/B: m\nx = 1\n");
    }
}
