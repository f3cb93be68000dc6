use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::diagnostic::Diagnostic;
use crate::formatter::Formatter;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    metadata: Metadata,
    offenses: Vec<Offense<'a>>,
}

#[derive(Serialize)]
struct Metadata {
    wordcop_version: &'static str,
    files_inspected: usize,
    offense_count: usize,
    corrected_count: usize,
}

#[derive(Serialize)]
struct Offense<'a> {
    path: &'a str,
    line: usize,
    column: usize,
    severity: char,
    cop_name: &'a str,
    message: &'a str,
    corrected: bool,
}

impl Formatter for JsonFormatter {
    fn format_to(&self, diagnostics: &[Diagnostic], files: &[PathBuf], out: &mut dyn Write) {
        let output = JsonOutput {
            metadata: Metadata {
                wordcop_version: env!("CARGO_PKG_VERSION"),
                files_inspected: files.len(),
                offense_count: diagnostics.len(),
                corrected_count: diagnostics.iter().filter(|d| d.corrected).count(),
            },
            offenses: diagnostics
                .iter()
                .map(|d| Offense {
                    path: &d.path,
                    line: d.location.line,
                    column: d.location.column,
                    severity: d.severity.letter(),
                    cop_name: &d.cop_name,
                    message: &d.message,
                    corrected: d.corrected,
                })
                .collect(),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                let _ = writeln!(out, "{json}");
            }
            Err(e) => eprintln!("error: failed to serialize JSON output: {e}"),
        }
    }
}
