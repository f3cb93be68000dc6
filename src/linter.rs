use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Result;
use rayon::prelude::*;
use ruby_prism::Visit;

use crate::cli::{Args, AutocorrectMode};
use crate::config::{CopFilterSet, ResolvedConfig};
use crate::cop::{Cop, CopConfig, known_names};
use crate::cop::registry::CopRegistry;
use crate::cop::walker::{ActiveCop, LiteralWalker};
use crate::correction::{Edit, EditSet};
use crate::diagnostic::Diagnostic;
use crate::fs::DiscoveredFiles;
use crate::parse::directives::DisabledRanges;
use crate::parse::source::SourceFile;

/// Upper bound on lint/correct rounds for one file.
const MAX_ITERATIONS: usize = 200;

pub struct LintResult {
    /// Sorted by path, line, column, cop name.
    pub diagnostics: Vec<Diagnostic>,
    pub file_count: usize,
    pub corrected_count: usize,
    /// Corrected source for `--stdin` runs with autocorrect on.
    pub corrected_source: Option<Vec<u8>>,
}

/// Everything a worker needs that is shared read-only across files.
struct LintContext<'a> {
    registry: &'a CopRegistry,
    args: &'a Args,
    cop_filters: CopFilterSet,
    /// Indexed like `registry.cops()`.
    base_configs: Vec<CopConfig>,
}

impl<'a> LintContext<'a> {
    fn new(config: &ResolvedConfig, registry: &'a CopRegistry, args: &'a Args) -> Result<Self> {
        Ok(Self {
            registry,
            args,
            cop_filters: config.build_cop_filters(registry)?,
            base_configs: registry
                .cops()
                .iter()
                .map(|c| config.cop_config(c.as_ref()))
                .collect(),
        })
    }

    /// `--only` / `--except` selection, by current or legacy name.
    fn is_selected(&self, cop: &dyn Cop) -> bool {
        let named = |list: &[String]| known_names(cop).any(|name| list.iter().any(|n| n == name));
        if !self.args.only.is_empty() && !named(&self.args.only) {
            return false;
        }
        !named(&self.args.except)
    }
}

/// Lint a single SourceFile (already loaded into memory). Used for --stdin mode.
pub fn lint_source(
    source: &SourceFile,
    config: &ResolvedConfig,
    registry: &CopRegistry,
    args: &Args,
) -> Result<LintResult> {
    let ctx = LintContext::new(config, registry, args)?;
    let (mut diagnostics, corrected_source, corrected_count) = lint_source_inner(source, &ctx);
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    Ok(LintResult {
        diagnostics,
        file_count: 1,
        corrected_count,
        corrected_source,
    })
}

pub fn run_linter(
    discovered: &DiscoveredFiles,
    config: &ResolvedConfig,
    registry: &CopRegistry,
    args: &Args,
) -> Result<LintResult> {
    let files = &discovered.files;
    let wall_start = std::time::Instant::now();

    // Build cop filters once before the parallel loop
    let ctx = LintContext::new(config, registry, args)?;

    let found_offense = AtomicBool::new(false);
    let total_corrected = AtomicUsize::new(0);

    let diagnostics: Vec<Diagnostic> = files
        .par_iter()
        .flat_map(|path| {
            // --fail-fast: skip remaining files once an offense is found
            if args.fail_fast && found_offense.load(Ordering::Relaxed) {
                return Vec::new();
            }
            let result = lint_file(path, &ctx, discovered, &total_corrected);
            if args.fail_fast && result.iter().any(|d| !d.corrected) {
                found_offense.store(true, Ordering::Relaxed);
            }
            result
        })
        .collect();

    let mut sorted = diagnostics;
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    if args.debug {
        eprintln!(
            "debug: linted {} files in {:.0?}",
            files.len(),
            wall_start.elapsed()
        );
    }

    Ok(LintResult {
        diagnostics: sorted,
        file_count: files.len(),
        corrected_count: total_corrected.load(Ordering::Relaxed),
        corrected_source: None,
    })
}

fn lint_file(
    path: &Path,
    ctx: &LintContext<'_>,
    discovered: &DiscoveredFiles,
    total_corrected: &AtomicUsize,
) -> Vec<Diagnostic> {
    // Explicitly-passed files bypass AllCops.Exclude (matching RuboCop default)
    // unless --force-exclusion is set.
    if ctx.cop_filters.is_globally_excluded(path)
        && (ctx.args.force_exclusion || !discovered.is_explicit(path))
    {
        if ctx.args.debug {
            eprintln!("debug: excluded {}", path.display());
        }
        return Vec::new();
    }

    let source = match SourceFile::from_path(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Vec::new();
        }
    };

    let (result, corrected_bytes, corrected_count) = lint_source_inner(&source, ctx);
    if corrected_count > 0 {
        total_corrected.fetch_add(corrected_count, Ordering::Relaxed);
    }

    // Write corrected bytes to disk if autocorrect produced changes
    if let Some(bytes) = corrected_bytes {
        if let Err(e) = std::fs::write(path, &bytes) {
            eprintln!(
                "error: failed to write corrected file {}: {e}",
                path.display()
            );
        }
    }

    result
}

/// Validate that corrected bytes are still valid Ruby by re-parsing with Prism.
/// Returns `None` (discarding corrections) if parse errors are found.
fn validate_corrected_bytes(
    original_bytes: &[u8],
    current_bytes: Vec<u8>,
    path: &Path,
) -> Option<Vec<u8>> {
    if current_bytes == original_bytes {
        return None;
    }
    // Scope the parse_result so its borrow of current_bytes is dropped before we return.
    let has_errors = {
        let parse_result = crate::parse::parse_source(&current_bytes);
        parse_result.errors().count() > 0
    };
    if has_errors {
        eprintln!(
            "warning: autocorrect produced invalid syntax for {}, skipping corrections",
            path.display()
        );
        return None;
    }
    Some(current_bytes)
}

/// Returns (diagnostics, corrected_bytes, corrected_count).
/// corrected_count is the total number of offenses corrected across all iterations.
fn lint_source_inner(
    source: &SourceFile,
    ctx: &LintContext<'_>,
) -> (Vec<Diagnostic>, Option<Vec<u8>>, usize) {
    let autocorrect_mode = ctx.args.autocorrect_mode();

    if autocorrect_mode == AutocorrectMode::Off {
        let (diags, _) = lint_source_once(source, ctx, autocorrect_mode);
        return (diags, None, 0);
    }

    let original_bytes = source.as_bytes();
    let mut current_bytes = original_bytes.to_vec();
    let path = source.path.clone();
    let mut corrected_diags: Vec<Diagnostic> = Vec::new();
    let mut remaining: Option<Vec<Diagnostic>> = None;

    for _iteration in 0..MAX_ITERATIONS {
        let iter_source = SourceFile::from_vec(path.clone(), current_bytes.clone());
        let (diags, edits) = lint_source_once(&iter_source, ctx, autocorrect_mode);

        if edits.is_empty() {
            // Converged: this pass found only offenses nobody corrects.
            remaining = Some(diags);
            break;
        }

        corrected_diags.extend(diags.into_iter().filter(|d| d.corrected));

        let new_bytes = EditSet::from_edits(edits).apply(&current_bytes);
        if new_bytes == current_bytes {
            // Source unchanged despite edits; bail to avoid looping.
            remaining = Some(Vec::new());
            break;
        }
        current_bytes = new_bytes;
    }

    // Hit max iterations: one final pass without corrections for clean diagnostics
    let remaining = remaining.unwrap_or_else(|| {
        let final_source = SourceFile::from_vec(path.clone(), current_bytes.clone());
        lint_source_once(&final_source, ctx, AutocorrectMode::Off).0
    });

    let changed = current_bytes != original_bytes;
    let corrected_bytes = validate_corrected_bytes(original_bytes, current_bytes, &path);
    if changed && corrected_bytes.is_none() {
        // Corrections were thrown away; the offenses still stand.
        for d in &mut corrected_diags {
            d.corrected = false;
        }
    }

    let mut all_diags = corrected_diags;
    all_diags.extend(remaining);
    let total_corrected = all_diags.iter().filter(|d| d.corrected).count();
    (all_diags, corrected_bytes, total_corrected)
}

/// Run all enabled cops once on a source file. Returns (diagnostics, edits).
fn lint_source_once(
    source: &SourceFile,
    ctx: &LintContext<'_>,
    autocorrect_mode: AutocorrectMode,
) -> (Vec<Diagnostic>, Vec<Edit>) {
    // Parse on this thread (ParseResult is !Send)
    let parse_result = crate::parse::parse_source(source.as_bytes());

    // Skip cops on files with parse errors: the AST from error recovery is
    // unreliable. RuboCop only reports Lint/Syntax on such files.
    if parse_result.errors().count() > 0 {
        if ctx.args.debug {
            eprintln!("debug: skipping {} (parse errors)", source.path_str());
        }
        return (Vec::new(), Vec::new());
    }

    let cops = ctx.registry.cops();
    let active: Vec<Option<ActiveCop<'_>>> = cops
        .iter()
        .enumerate()
        .map(|(i, cop)| {
            if !ctx.is_selected(cop.as_ref()) || !ctx.cop_filters.is_cop_match(i, &source.path) {
                return None;
            }
            let config = &ctx.base_configs[i];
            Some(ActiveCop {
                config,
                autocorrect: cop.supports_autocorrect()
                    && config.should_autocorrect(autocorrect_mode),
            })
        })
        .collect();

    if active.iter().all(Option::is_none) {
        return (Vec::new(), Vec::new());
    }

    let correcting = active.iter().flatten().any(|a| a.autocorrect);
    let mut walker = LiteralWalker::new(ctx.registry, source, &active, correcting);
    walker.visit(&parse_result.node());
    let mut diagnostics = walker.diagnostics;
    let mut edits = walker
        .corrector
        .map(|c| c.into_edits())
        .unwrap_or_default();

    // Config severity overrides the cop default.
    for d in &mut diagnostics {
        if let Some(severity) = ctx
            .registry
            .index_of(&d.cop_name)
            .and_then(|i| ctx.base_configs[i].severity)
        {
            d.severity = severity;
        }
    }

    // Drop offenses (and their edits) suppressed by inline disable comments.
    if !ctx.args.ignore_disable_comments {
        let disabled = DisabledRanges::from_comments(source, &parse_result);
        if !disabled.is_empty() {
            let is_disabled = |idx: Option<usize>, line: usize| {
                idx.is_some_and(|i| {
                    known_names(cops[i].as_ref()).any(|name| disabled.is_disabled(name, line))
                })
            };
            diagnostics.retain(|d| {
                !is_disabled(ctx.registry.index_of(&d.cop_name), d.location.line)
            });
            edits.retain(|e| {
                let (line, _) = source.offset_to_line_col(e.start);
                !is_disabled(Some(e.cop_index), line)
            });
        }
    }

    (diagnostics, edits)
}
