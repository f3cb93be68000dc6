use ruby_prism::Visit;

use crate::cop::percent_literal::{LiteralKind, PercentLiteral};
use crate::cop::registry::CopRegistry;
use crate::cop::CopConfig;
use crate::correction::Corrector;
use crate::diagnostic::Diagnostic;
use crate::parse::source::SourceFile;

/// A cop that should run on the current file.
#[derive(Clone, Copy)]
pub struct ActiveCop<'a> {
    pub config: &'a CopConfig,
    /// Whether this cop's edits go to the corrector.
    pub autocorrect: bool,
}

/// Walks the AST once and dispatches each percent literal to the cops the
/// registry lists for its kind.
pub struct LiteralWalker<'a> {
    pub registry: &'a CopRegistry,
    pub source: &'a SourceFile,
    /// Indexed like `registry.cops()`; `None` = not running on this file.
    pub active: &'a [Option<ActiveCop<'a>>],
    pub corrector: Option<Corrector>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> LiteralWalker<'a> {
    pub fn new(
        registry: &'a CopRegistry,
        source: &'a SourceFile,
        active: &'a [Option<ActiveCop<'a>>],
        correcting: bool,
    ) -> Self {
        Self {
            registry,
            source,
            active,
            corrector: correcting.then(|| Corrector::new("", 0)),
            diagnostics: Vec::new(),
        }
    }

    fn dispatch(&mut self, kind: LiteralKind, node: &ruby_prism::ArrayNode<'_>) {
        let registry = self.registry;
        let targets = registry.cops_for_kind(kind);
        if !targets.iter().any(|&i| self.active[i].is_some()) {
            return;
        }
        let Some(literal) = PercentLiteral::from_array(node, self.source.as_bytes()) else {
            return;
        };

        for &i in targets {
            let Some(active) = self.active[i] else {
                continue;
            };
            let cop = &*registry.cops()[i];
            let corrector = match self.corrector.as_mut() {
                Some(c) if active.autocorrect => {
                    c.set_cop(cop.name(), i);
                    Some(c)
                }
                _ => None,
            };
            cop.check_literal(
                self.source,
                &literal,
                active.config,
                &mut self.diagnostics,
                corrector,
            );
        }
    }
}

impl<'pr> Visit<'pr> for LiteralWalker<'_> {
    fn visit_array_node(&mut self, node: &ruby_prism::ArrayNode<'pr>) {
        let kind = node
            .opening_loc()
            .and_then(|loc| LiteralKind::classify(loc.as_slice()));
        if let Some(kind) = kind {
            self.dispatch(kind, node);
        }
        ruby_prism::visit_array_node(self, node);
    }
}
