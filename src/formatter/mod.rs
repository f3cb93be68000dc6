pub mod github;
pub mod json;
pub mod quiet;
pub mod text;

use std::io::Write;
use std::path::PathBuf;

use crate::diagnostic::Diagnostic;

pub trait Formatter {
    fn format_to(&self, diagnostics: &[Diagnostic], files: &[PathBuf], out: &mut dyn Write);

    fn print(&self, diagnostics: &[Diagnostic], files: &[PathBuf]) {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.format_to(diagnostics, files, &mut lock);
    }
}

pub fn create_formatter(format: &str) -> Box<dyn Formatter> {
    match format {
        "json" => Box::new(json::JsonFormatter),
        "github" => Box::new(github::GithubFormatter),
        "quiet" => Box::new(quiet::QuietFormatter),
        // "text" and any unknown value
        _ => Box::new(text::TextFormatter),
    }
}

fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// `N files inspected, M offenses detected[, K offenses corrected]`
pub(crate) fn summary_line(file_count: usize, diagnostics: &[Diagnostic]) -> String {
    let mut line = format!(
        "{} inspected, {} detected",
        pluralize(file_count, "file"),
        pluralize(diagnostics.len(), "offense"),
    );
    let corrected = diagnostics.iter().filter(|d| d.corrected).count();
    if corrected > 0 {
        line.push_str(&format!(", {} corrected", pluralize(corrected, "offense")));
    }
    line
}
