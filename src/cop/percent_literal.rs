//! Recognition of percent-delimited array literals (`%w %W %i %I`).
//!
//! Cops that care about a particular percent-array family go through this
//! module instead of re-slicing the opening delimiter themselves. The walker
//! classifies every array node once and hands matching cops a
//! [`PercentLiteral`] view.

use std::ops::Range;

/// Byte range into the source, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn of(loc: &ruby_prism::Location<'_>) -> Self {
        Self::new(loc.start_offset(), loc.end_offset())
    }
}

/// The closed set of percent-array families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// `%w(...)`
    WordArray,
    /// `%W(...)`
    InterpolatedWordArray,
    /// `%i(...)`
    SymbolArray,
    /// `%I(...)`
    InterpolatedSymbolArray,
}

impl LiteralKind {
    /// Classify an array's opening delimiter. Returns `None` for bracketed
    /// (`[`) and implicit arrays.
    pub fn classify(opening: &[u8]) -> Option<LiteralKind> {
        match marker(opening)? {
            b"%w" => Some(LiteralKind::WordArray),
            b"%W" => Some(LiteralKind::InterpolatedWordArray),
            b"%i" => Some(LiteralKind::SymbolArray),
            b"%I" => Some(LiteralKind::InterpolatedSymbolArray),
            _ => None,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            LiteralKind::WordArray => "%w",
            LiteralKind::InterpolatedWordArray => "%W",
            LiteralKind::SymbolArray => "%i",
            LiteralKind::InterpolatedSymbolArray => "%I",
        }
    }

    /// The family with the same element type but the opposite interpolation
    /// behavior (`%W` <-> `%w`, `%I` <-> `%i`).
    pub fn counterpart(self) -> LiteralKind {
        match self {
            LiteralKind::WordArray => LiteralKind::InterpolatedWordArray,
            LiteralKind::InterpolatedWordArray => LiteralKind::WordArray,
            LiteralKind::SymbolArray => LiteralKind::InterpolatedSymbolArray,
            LiteralKind::InterpolatedSymbolArray => LiteralKind::SymbolArray,
        }
    }
}

/// The two-byte `%X` marker at the front of a percent-array opening, if any.
pub fn marker(opening: &[u8]) -> Option<&[u8]> {
    match opening {
        [b'%', b'w' | b'W' | b'i' | b'I', ..] => Some(&opening[..2]),
        _ => None,
    }
}

/// One entry of a percent array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element<'a> {
    /// Literal text only. `raw` is the element's source exactly as written,
    /// escapes included.
    Plain { raw: &'a [u8] },
    /// Contains at least one `#{...}` (or `#@ivar`-style) embedded expression.
    Interpolated,
}

/// A percent-array literal occurrence, borrowed from the source for the
/// duration of one check.
#[derive(Debug, Clone)]
pub struct PercentLiteral<'a> {
    pub kind: LiteralKind,
    /// Marker plus opening delimiter, e.g. `%W(`.
    pub opening: Span,
    /// The whole literal, opening through closing delimiter.
    pub span: Span,
    pub elements: Vec<Element<'a>>,
}

impl<'a> PercentLiteral<'a> {
    /// Build a view over `array` if it is a percent literal. `source` must be
    /// the bytes `array` was parsed from.
    pub fn from_array(array: &ruby_prism::ArrayNode<'_>, source: &'a [u8]) -> Option<Self> {
        let opening_loc = array.opening_loc()?;
        let kind = LiteralKind::classify(opening_loc.as_slice())?;

        let elements = array
            .elements()
            .iter()
            .map(|node| element_from_node(&node, source))
            .collect();

        Some(Self {
            kind,
            opening: Span::of(&opening_loc),
            span: Span::of(&array.location()),
            elements,
        })
    }

    pub fn opening_text<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        source.get(self.opening.range()).unwrap_or_default()
    }

    /// The delimiter character(s) after the marker, e.g. `(` or `[`.
    pub fn delimiter<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        self.opening_text(source).get(2..).unwrap_or_default()
    }
}

fn element_from_node<'a>(node: &ruby_prism::Node<'_>, source: &'a [u8]) -> Element<'a> {
    if node.as_string_node().is_some() || node.as_symbol_node().is_some() {
        let span = Span::of(&node.location());
        Element::Plain {
            raw: source.get(span.range()).unwrap_or_default(),
        }
    } else {
        // Interpolated string/symbol nodes, and anything unexpected, are
        // treated as needing the interpolating form.
        Element::Interpolated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruby_prism::Visit;

    /// Collect every percent literal in `src`, outermost first.
    fn literals(src: &[u8]) -> Vec<PercentLiteral<'_>> {
        struct Collect<'s> {
            source: &'s [u8],
            found: Vec<PercentLiteral<'s>>,
        }
        impl<'pr> Visit<'pr> for Collect<'_> {
            fn visit_array_node(&mut self, node: &ruby_prism::ArrayNode<'pr>) {
                if let Some(lit) = PercentLiteral::from_array(node, self.source) {
                    self.found.push(lit);
                }
                ruby_prism::visit_array_node(self, node);
            }
        }
        let result = ruby_prism::parse(src);
        let mut c = Collect {
            source: src,
            found: Vec::new(),
        };
        c.visit(&result.node());
        c.found
    }

    #[test]
    fn marker_extraction() {
        assert_eq!(marker(b"%W("), Some(&b"%W"[..]));
        assert_eq!(marker(b"%i["), Some(&b"%i"[..]));
        assert_eq!(marker(b"%q("), None);
        assert_eq!(marker(b"["), None);
        assert_eq!(marker(b"%"), None);
    }

    #[test]
    fn classify_each_family() {
        assert_eq!(LiteralKind::classify(b"%w("), Some(LiteralKind::WordArray));
        assert_eq!(
            LiteralKind::classify(b"%W["),
            Some(LiteralKind::InterpolatedWordArray)
        );
        assert_eq!(LiteralKind::classify(b"%i<"), Some(LiteralKind::SymbolArray));
        assert_eq!(
            LiteralKind::classify(b"%I{"),
            Some(LiteralKind::InterpolatedSymbolArray)
        );
        assert_eq!(LiteralKind::classify(b"["), None);
    }

    #[test]
    fn counterpart_and_marker_agree() {
        let kinds = [
            LiteralKind::WordArray,
            LiteralKind::InterpolatedWordArray,
            LiteralKind::SymbolArray,
            LiteralKind::InterpolatedSymbolArray,
        ];
        for kind in kinds {
            assert_eq!(kind.counterpart().counterpart(), kind);
            assert_ne!(kind.counterpart(), kind);
            assert_eq!(LiteralKind::classify(format!("{}(", kind.marker()).as_bytes()), Some(kind));
        }
    }

    #[test]
    fn plain_word_array_view() {
        let src = b"x = %W(cat dog)";
        let lits = literals(src);
        assert_eq!(lits.len(), 1);
        let lit = &lits[0];
        assert_eq!(lit.kind, LiteralKind::InterpolatedWordArray);
        assert_eq!(lit.opening_text(src), b"%W(");
        assert_eq!(lit.delimiter(src), b"(");
        assert_eq!(lit.span, Span::new(4, 15));
        assert_eq!(lit.elements.len(), 2);
        match &lit.elements[1] {
            Element::Plain { raw } => assert_eq!(*raw, b"dog"),
            other => panic!("expected plain element, got {other:?}"),
        }
    }

    #[test]
    fn interpolated_element_is_tagged() {
        let lits = literals(b"%W(apple #{fruit} grape)");
        assert_eq!(
            lits[0].elements,
            vec![
                Element::Plain { raw: &b"apple"[..] },
                Element::Interpolated,
                Element::Plain { raw: &b"grape"[..] },
            ]
        );
    }

    #[test]
    fn raw_keeps_escapes() {
        let src = br"%W(a\tb c)";
        let lits = literals(src);
        match &lits[0].elements[0] {
            Element::Plain { raw } => assert_eq!(*raw, br"a\tb"),
            other => panic!("expected plain element, got {other:?}"),
        }
    }

    #[test]
    fn bracketed_arrays_are_not_percent_literals() {
        assert!(literals(b"['a', 'b']").is_empty());
    }

    #[test]
    fn symbol_arrays_are_recognized() {
        let lits = literals(b"%i(a b)");
        assert_eq!(lits[0].kind, LiteralKind::SymbolArray);
        assert!(
            lits[0]
                .elements
                .iter()
                .all(|e| matches!(e, Element::Plain { .. }))
        );
    }

    #[test]
    fn empty_literal_has_no_elements() {
        let lits = literals(b"%W()");
        assert!(lits[0].elements.is_empty());
        assert_eq!(lits[0].opening, Span::new(0, 3));
    }
}
