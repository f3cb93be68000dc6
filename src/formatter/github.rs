use std::io::Write;
use std::path::PathBuf;

use crate::diagnostic::{Diagnostic, Severity};
use crate::formatter::Formatter;

/// GitHub Actions workflow commands (`::warning file=...::message`).
pub struct GithubFormatter;

/// Workflow command data must escape `%`, CR and LF.
fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Property values additionally escape `:` and `,`.
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

impl Formatter for GithubFormatter {
    fn format_to(&self, diagnostics: &[Diagnostic], _files: &[PathBuf], out: &mut dyn Write) {
        for d in diagnostics {
            let level = match d.severity {
                Severity::Convention | Severity::Warning => "warning",
                Severity::Error | Severity::Fatal => "error",
            };
            let corrected = if d.corrected { "[Corrected] " } else { "" };
            let _ = writeln!(
                out,
                "::{level} file={},line={},col={}::{corrected}{}: {}",
                escape_property(&d.path),
                d.location.line,
                d.location.column + 1,
                d.cop_name,
                escape_data(&d.message),
            );
        }
    }
}
