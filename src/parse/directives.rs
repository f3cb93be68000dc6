use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::parse::source::SourceFile;

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*(?:rubocop|wordcop)\s*:\s*(disable|enable|todo)\s+(.+)")
        .unwrap()
});

/// Line ranges where cops are switched off by inline comments.
///
/// Understands `# rubocop:disable`, `# rubocop:enable` and `# rubocop:todo`
/// (plus `# wordcop:` spellings). Names may be a full cop name, a department
/// or `all`.
#[derive(Debug, Default)]
pub struct DisabledRanges {
    /// Name -> inclusive (start_line, end_line) ranges, 1-indexed.
    ranges: HashMap<String, Vec<(usize, usize)>>,
}

impl DisabledRanges {
    pub fn from_comments(source: &SourceFile, parse_result: &ruby_prism::ParseResult<'_>) -> Self {
        let bytes = source.as_bytes();
        let lines: Vec<&[u8]> = source.lines().collect();
        let mut ranges: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
        let mut open: HashMap<String, usize> = HashMap::new();

        for comment in parse_result.comments() {
            let loc = comment.location();
            let Ok(text) = std::str::from_utf8(&bytes[loc.start_offset()..loc.end_offset()]) else {
                continue;
            };
            let Some(caps) = DIRECTIVE_RE.captures(text) else {
                continue;
            };

            let (line, col) = source.offset_to_line_col(loc.start_offset());
            let inline = lines
                .get(line - 1)
                .is_some_and(|l| l.iter().take(col).any(|b| !b.is_ascii_whitespace()));

            for name in cop_names(&caps[2]) {
                match &caps[1] {
                    "disable" | "todo" if inline => {
                        ranges.entry(name.to_string()).or_default().push((line, line));
                    }
                    "disable" | "todo" => {
                        open.entry(name.to_string()).or_insert(line);
                    }
                    _ if name == "all" => {
                        for (name, start) in open.drain() {
                            ranges.entry(name).or_default().push((start, line));
                        }
                    }
                    _ => {
                        // An enable without a matching disable is a no-op.
                        if let Some(start) = open.remove(name) {
                            ranges.entry(name.to_string()).or_default().push((start, line));
                        }
                    }
                }
            }
        }

        for (name, start) in open {
            ranges.entry(name).or_default().push((start, usize::MAX));
        }

        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether `cop_name` is disabled at `line`, by exact name, department or `all`.
    pub fn is_disabled(&self, cop_name: &str, line: usize) -> bool {
        let department = cop_name.split_once('/').map(|(dept, _)| dept);
        [Some(cop_name), department, Some("all")]
            .into_iter()
            .flatten()
            .any(|name| self.covers(name, line))
    }

    fn covers(&self, name: &str, line: usize) -> bool {
        self.ranges
            .get(name)
            .is_some_and(|rs| rs.iter().any(|&(start, end)| line >= start && line <= end))
    }
}

/// Split the directive's name list, dropping a `-- reason` trailer and any
/// free text after each name.
fn cop_names(list: &str) -> impl Iterator<Item = &str> {
    let list = list.split("--").next().unwrap_or("");
    list.split(',')
        .filter_map(|s| s.split_whitespace().next())
        .filter(|s| !s.is_empty())
}
