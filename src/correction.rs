/// A single source-level edit: replace byte range [start..end) with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte offset, inclusive.
    pub start: usize,
    /// Byte offset, exclusive.
    pub end: usize,
    /// Replacement text (empty string = deletion).
    pub replacement: String,
    /// Cop that produced this edit.
    pub cop_name: &'static str,
    /// Registry index, used to break ties between edits at the same offset.
    pub cop_index: usize,
}

/// Edit builder handed to a cop while it checks one file.
///
/// Cops only describe *what* to change; the linter decides whether the
/// collected edits are applied.
pub struct Corrector {
    cop_name: &'static str,
    cop_index: usize,
    edits: Vec<Edit>,
}

impl Corrector {
    pub fn new(cop_name: &'static str, cop_index: usize) -> Self {
        Self {
            cop_name,
            cop_index,
            edits: Vec::new(),
        }
    }

    /// Switch attribution to another cop; edits already collected keep theirs.
    pub fn set_cop(&mut self, cop_name: &'static str, cop_index: usize) {
        self.cop_name = cop_name;
        self.cop_index = cop_index;
    }

    pub fn replace(&mut self, start: usize, end: usize, replacement: impl Into<String>) {
        debug_assert!(start <= end, "edit range is inverted: {start}..{end}");
        self.edits.push(Edit {
            start,
            end,
            replacement: replacement.into(),
            cop_name: self.cop_name,
            cop_index: self.cop_index,
        });
    }

    pub fn into_edits(self) -> Vec<Edit> {
        self.edits
    }
}

/// A set of non-overlapping edits, sorted by start offset.
///
/// Overlapping edits are resolved by keeping the first one in
/// (start, cop_index) order and dropping the rest; the dropped ones are
/// picked up again on the next autocorrect iteration if still relevant.
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn from_edits(mut raw: Vec<Edit>) -> Self {
        raw.sort_by(|a, b| a.start.cmp(&b.start).then(a.cop_index.cmp(&b.cop_index)));

        let mut accepted: Vec<Edit> = Vec::with_capacity(raw.len());
        for edit in raw {
            if let Some(last) = accepted.last() {
                if edit.start < last.end || (edit.start == last.start && edit.end == last.end) {
                    continue;
                }
            }
            accepted.push(edit);
        }

        Self { edits: accepted }
    }

    /// Apply the edits to `source` in a single forward pass.
    pub fn apply(&self, source: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(source.len());
        let mut cursor = 0;

        for edit in &self.edits {
            let start = edit.start.min(source.len());
            if start > cursor {
                out.extend_from_slice(&source[cursor..start]);
            }
            out.extend_from_slice(edit.replacement.as_bytes());
            cursor = cursor.max(edit.end.min(source.len()));
        }

        if cursor < source.len() {
            out.extend_from_slice(&source[cursor..]);
        }
        out
    }
}
