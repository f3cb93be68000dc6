use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

use crate::config::ResolvedConfig;

/// Extensionless file names that are Ruby source.
const RUBY_FILENAMES: &[&str] = &["Gemfile", "Rakefile", "Guardfile", "Capfile", "Brewfile"];

/// Extensions other than `.rb` that hold Ruby source.
const RUBY_EXTENSIONS: &[&str] = &["rb", "gemspec", "rake", "ru", "jbuilder", "builder"];

/// Files selected for linting.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    /// Sorted, deduplicated.
    pub files: Vec<PathBuf>,
    /// Files named directly on the command line. They bypass AllCops.Exclude
    /// unless `--force-exclusion` is given.
    pub explicit: HashSet<PathBuf>,
}

impl DiscoveredFiles {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether `path` was passed explicitly, comparing canonical forms too.
    pub fn is_explicit(&self, path: &Path) -> bool {
        self.explicit.contains(path)
            || path
                .canonicalize()
                .ok()
                .is_some_and(|c| self.explicit.contains(&c))
    }
}

/// Whether a walked file looks like Ruby source.
pub fn is_ruby_file(path: &Path) -> bool {
    if path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| RUBY_EXTENSIONS.contains(&ext))
    {
        return true;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| RUBY_FILENAMES.contains(&name))
}

/// Discover Ruby files from the given paths, respecting .gitignore
/// and AllCops.Exclude patterns.
pub fn discover_files(paths: &[PathBuf], config: &ResolvedConfig) -> Result<DiscoveredFiles> {
    let mut discovered = DiscoveredFiles::default();

    for path in paths {
        if path.is_file() {
            // Direct file paths bypass extension filtering
            discovered.files.push(path.clone());
            discovered.explicit.insert(path.clone());
            if let Ok(canonical) = path.canonicalize() {
                discovered.explicit.insert(canonical);
            }
        } else if path.is_dir() {
            discovered.files.extend(walk_directory(path, config)?);
        } else {
            anyhow::bail!("path does not exist: {}", path.display());
        }
    }

    discovered.files.sort();
    discovered.files.dedup();
    Ok(discovered)
}

fn walk_directory(dir: &Path, config: &ResolvedConfig) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(dir);
    builder.hidden(true).git_ignore(true).git_global(true);

    // Apply AllCops.Exclude patterns as overrides, rooted at the config dir
    let global_excludes = config.global_excludes();
    if !global_excludes.is_empty() {
        let root = config.config_dir().unwrap_or(dir);
        let mut overrides = OverrideBuilder::new(root);
        for pattern in global_excludes {
            // ignore crate overrides: prefix with ! to exclude
            overrides
                .add(&format!("!{pattern}"))
                .with_context(|| format!("invalid exclude pattern: {pattern}"))?;
        }
        let overrides = overrides.build().context("failed to build overrides")?;
        builder.overrides(overrides);
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.context("error walking directory")?;
        let path = entry.path();
        if entry.file_type().is_some_and(|t| t.is_file()) && is_ruby_file(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
