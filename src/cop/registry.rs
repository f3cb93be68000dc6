use std::collections::HashMap;

use super::{Cop, known_names};
use super::percent_literal::LiteralKind;

/// All known cops plus the literal-kind dispatch table the walker uses.
pub struct CopRegistry {
    cops: Vec<Box<dyn Cop>>,
    /// Current and legacy names -> index into `cops`.
    index: HashMap<&'static str, usize>,
    by_kind: HashMap<LiteralKind, Vec<usize>>,
}

impl Default for CopRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CopRegistry {
    pub fn new() -> Self {
        Self {
            cops: Vec::new(),
            index: HashMap::new(),
            by_kind: HashMap::new(),
        }
    }

    /// Build the default registry with all built-in cops.
    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        super::style::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, cop: Box<dyn Cop>) {
        let idx = self.cops.len();
        for &kind in cop.interested_literal_kinds() {
            self.by_kind.entry(kind).or_default().push(idx);
        }
        for name in known_names(&*cop) {
            self.index.insert(name, idx);
        }
        self.cops.push(cop);
    }

    pub fn cops(&self) -> &[Box<dyn Cop>] {
        &self.cops
    }

    /// Index of the cop answering to `name`, current or legacy.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Registry indices of the cops interested in `kind`, in registration order.
    pub fn cops_for_kind(&self, kind: LiteralKind) -> &[usize] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.cops.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.cops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cops.is_empty()
    }
}
