pub mod cli;
pub mod config;
pub mod cop;
pub mod correction;
pub mod diagnostic;
pub mod formatter;
pub mod fs;
pub mod linter;
pub mod parse;

#[cfg(test)]
pub mod testutil;

use std::io::{Read, Write};

use anyhow::{Context, Result};

use cli::Args;
use config::load_config;
use cop::registry::CopRegistry;
use diagnostic::{Diagnostic, Severity};
use formatter::create_formatter;
use fs::discover_files;
use linter::{lint_source, run_linter};
use parse::source::SourceFile;

/// Separator RuboCop prints between the report and the corrected source in
/// `--stdin` autocorrect mode.
const STDIN_SOURCE_SEPARATOR: &str = "====================";

/// Run the linter. Returns the exit code: 0 = clean, 1 = offenses at or
/// above `--fail-level`. Errors are left to the caller (exit 3).
pub fn run(args: Args) -> Result<i32> {
    let fail_level = args.fail_level()?;

    let target_dir = args.paths.first().map(|p| {
        if p.is_file() {
            p.parent().unwrap_or(p)
        } else {
            p.as_path()
        }
    });
    let config_start = std::time::Instant::now();
    let config = load_config(args.config.as_deref(), target_dir)?;
    let config_elapsed = config_start.elapsed();

    if args.debug {
        eprintln!("debug: config loading total: {config_elapsed:.0?}");
        if let Some(dir) = config.config_dir() {
            eprintln!("debug: config loaded from: {}", dir.display());
        } else {
            eprintln!("debug: no config file found");
        }
        eprintln!("debug: global excludes: {:?}", config.global_excludes());
    }

    let registry = CopRegistry::default_registry();

    // --list-cops: print all registered cop names and exit
    if args.list_cops {
        let mut names = registry.names();
        names.sort_unstable();
        for name in names {
            println!("{name}");
        }
        return Ok(0);
    }

    // --stdin: read from stdin and lint a single file
    if let Some(ref display_path) = args.stdin {
        let mut input = Vec::new();
        std::io::stdin()
            .read_to_end(&mut input)
            .context("failed to read source from stdin")?;
        let source = SourceFile::from_vec(display_path.clone(), input);
        let result = lint_source(&source, &config, &registry, &args)?;
        let formatter = create_formatter(&args.format);
        formatter.print(&result.diagnostics, std::slice::from_ref(display_path));
        if let Some(corrected) = result.corrected_source {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{STDIN_SOURCE_SEPARATOR}")?;
            stdout.write_all(&corrected)?;
        }
        return Ok(exit_code(&result.diagnostics, fail_level));
    }

    let discovered = discover_files(&args.paths, &config)?;

    // --list-target-files: print the files that would be linted and exit
    if args.list_target_files {
        for path in &discovered.files {
            println!("{}", path.display());
        }
        return Ok(0);
    }

    if args.debug {
        eprintln!("debug: {} files to lint", discovered.len());
        eprintln!("debug: {} cops registered", registry.len());
    }

    let result = run_linter(&discovered, &config, &registry, &args)?;
    let formatter = create_formatter(&args.format);
    formatter.print(&result.diagnostics, &discovered.files);

    if args.debug && result.corrected_count > 0 {
        eprintln!("debug: {} offenses corrected", result.corrected_count);
    }

    Ok(exit_code(&result.diagnostics, fail_level))
}

/// 1 if any uncorrected offense is at or above `fail_level`, else 0.
fn exit_code(diagnostics: &[Diagnostic], fail_level: Severity) -> i32 {
    let failing = diagnostics
        .iter()
        .any(|d| !d.corrected && d.severity >= fail_level);
    i32::from(failing)
}
