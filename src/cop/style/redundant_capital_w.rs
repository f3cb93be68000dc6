use crate::cop::percent_literal::{Element, LiteralKind, PercentLiteral, Span};
use crate::cop::util::double_quotes_required;
use crate::cop::{Cop, CopConfig};
use crate::correction::Corrector;
use crate::diagnostic::Diagnostic;
use crate::parse::source::SourceFile;

pub const MSG: &str = "Do not use `%W` unless interpolation is needed. If not, use `%w`.";

/// Checks for usage of the `%W()` syntax when `%w()` would do.
///
/// ```ruby
/// # bad
/// %W(cat dog pig)
/// %W[door wall floor]
///
/// # good
/// %w/swim run bike/
/// %w[shirt pants shoes]
/// %W(apple #{fruit} grape)
/// ```
///
/// Elements whose source contains an escape that `%w` would read differently
/// (`\t`, `\ `, `\#{}`) or a single quote keep `%W`.
pub struct RedundantCapitalW;

impl Cop for RedundantCapitalW {
    fn name(&self) -> &'static str {
        "Style/RedundantCapitalW"
    }

    fn legacy_names(&self) -> &'static [&'static str] {
        &["Style/UnneededCapitalW"]
    }

    fn supports_autocorrect(&self) -> bool {
        true
    }

    fn interested_literal_kinds(&self) -> &'static [LiteralKind] {
        &[LiteralKind::InterpolatedWordArray]
    }

    fn check_literal(
        &self,
        source: &SourceFile,
        literal: &PercentLiteral<'_>,
        _config: &CopConfig,
        diagnostics: &mut Vec<Diagnostic>,
        corrector: Option<&mut Corrector>,
    ) {
        debug_assert_eq!(literal.kind, LiteralKind::InterpolatedWordArray);
        if requires_interpolation(literal) {
            return;
        }

        let mut diag = self.diagnostic(source, literal.span.start, MSG.to_string());
        if let Some(corrector) = corrector {
            let (span, replacement) = lowercase_marker(source.as_bytes(), literal);
            corrector.replace(span.start, span.end, replacement);
            diag.corrected = true;
        }
        diagnostics.push(diag);
    }
}

/// Whether any element needs `%W`: it embeds an expression, or its raw text
/// only means the same thing inside a double-quote-style literal.
/// An empty literal never does.
pub fn requires_interpolation(literal: &PercentLiteral<'_>) -> bool {
    literal.elements.iter().any(|element| match element {
        Element::Interpolated => true,
        Element::Plain { raw } => double_quotes_required(raw),
    })
}

/// The edit turning `%W<delim>` into `%w<delim>`. Only the opening delimiter
/// is touched; the bracket characters are copied through.
pub fn lowercase_marker(source: &[u8], literal: &PercentLiteral<'_>) -> (Span, String) {
    let mut replacement = literal.kind.counterpart().marker().to_string();
    replacement.push_str(&String::from_utf8_lossy(literal.delimiter(source)));
    (literal.opening, replacement)
}
