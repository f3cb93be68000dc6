use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_yml::Value;

use crate::cop::registry::CopRegistry;
use crate::cop::{AutocorrectSetting, Cop, CopConfig, known_names};
use crate::diagnostic::Severity;

const CONFIG_FILE_NAME: &str = ".rubocop.yml";

/// Resolved configuration from .rubocop.yml.
///
/// Reads a single YAML file and extracts per-cop
/// Enabled/Severity/Exclude/Include/AutoCorrect plus AllCops.Exclude.
/// `inherit_from` and `inherit_gem` are not followed.
#[derive(Debug, Default)]
pub struct ResolvedConfig {
    /// Per-cop configs keyed by cop name (e.g. "Style/RedundantCapitalW")
    cop_configs: HashMap<String, CopConfig>,
    global_excludes: Vec<String>,
    /// Directory containing the config file; patterns are relative to it.
    config_dir: Option<PathBuf>,
}

/// Load config from the given path, or search for `.rubocop.yml` starting at
/// `target_dir` and walking up through its ancestors. Returns an empty config
/// if no file is found. An explicit path that doesn't exist is an error.
pub fn load_config(path: Option<&Path>, target_dir: Option<&Path>) -> Result<ResolvedConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match find_config(target_dir.unwrap_or(Path::new("."))) {
            Some(p) => p,
            None => return Ok(ResolvedConfig::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;
    let mut config = parse_config(&contents)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    config.config_dir = config_path
        .parent()
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            }
        })
        .map(Path::to_path_buf);
    Ok(config)
}

/// Walk from `start` upward looking for `.rubocop.yml`.
fn find_config(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn parse_config(contents: &str) -> Result<ResolvedConfig> {
    let raw: Value = serde_yml::from_str(contents)?;

    let mut cop_configs = HashMap::new();
    let mut global_excludes = Vec::new();

    if let Value::Mapping(map) = &raw {
        for (key, value) in map {
            let Some(key_str) = key.as_str() else {
                continue;
            };

            if key_str == "AllCops" {
                if let Some(excludes) = extract_string_list(value, "Exclude") {
                    global_excludes = excludes;
                }
                continue;
            }

            // Cop names contain "/" (e.g. "Style/RedundantCapitalW")
            if key_str.contains('/') {
                cop_configs.insert(key_str.to_string(), parse_cop_config(value));
            }
        }
    }

    Ok(ResolvedConfig {
        cop_configs,
        global_excludes,
        config_dir: None,
    })
}

impl ResolvedConfig {
    /// Whether a cop is enabled. Cops without a config entry are enabled.
    pub fn is_cop_enabled(&self, cop: &dyn Cop) -> bool {
        self.entry_for(cop).is_none_or(|c| c.enabled)
    }

    /// Get the resolved config for a specific cop.
    pub fn cop_config(&self, cop: &dyn Cop) -> CopConfig {
        self.entry_for(cop).cloned().unwrap_or_default()
    }

    /// The entry under the cop's current name, falling back to a legacy name.
    fn entry_for(&self, cop: &dyn Cop) -> Option<&CopConfig> {
        known_names(cop).find_map(|name| self.cop_configs.get(name))
    }

    /// Global exclude patterns from AllCops.Exclude.
    pub fn global_excludes(&self) -> &[String] {
        &self.global_excludes
    }

    /// Directory of the loaded config file, if one was found.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Compile AllCops.Exclude and every registered cop's Include/Exclude
    /// into glob matchers, indexed like `registry.cops()`.
    pub fn build_cop_filters(&self, registry: &CopRegistry) -> Result<CopFilterSet> {
        let global_exclude = build_glob_set(&self.global_excludes)
            .context("invalid pattern in AllCops.Exclude")?;

        let mut filters = Vec::with_capacity(registry.len());
        for cop in registry.cops() {
            let cop = cop.as_ref();
            let name = cop.name();
            let config = self.entry_for(cop);
            let include = config.map(|c| c.include.as_slice()).unwrap_or(&[]);
            let exclude = config.map(|c| c.exclude.as_slice()).unwrap_or(&[]);
            filters.push(CopFilter {
                enabled: self.is_cop_enabled(cop),
                include: build_glob_set(include)
                    .with_context(|| format!("invalid Include pattern for {name}"))?,
                exclude: build_glob_set(exclude)
                    .with_context(|| format!("invalid Exclude pattern for {name}"))?,
            });
        }

        Ok(CopFilterSet {
            global_exclude,
            filters,
            config_dir: self.config_dir.clone(),
            cwd: std::env::current_dir().ok(),
        })
    }
}

/// Pre-compiled Include/Exclude matchers for one cop.
#[derive(Debug)]
pub struct CopFilter {
    enabled: bool,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

/// File filters for every registered cop plus AllCops.Exclude, built once
/// before linting and shared read-only across worker threads.
#[derive(Debug)]
pub struct CopFilterSet {
    global_exclude: Option<GlobSet>,
    filters: Vec<CopFilter>,
    config_dir: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl CopFilterSet {
    /// Whether AllCops.Exclude matches `path`.
    pub fn is_globally_excluded(&self, path: &Path) -> bool {
        self.global_exclude
            .as_ref()
            .is_some_and(|set| self.matches(set, path))
    }

    /// Whether cop `idx` is enabled and should run on `path`: Include (when
    /// given) matches and Exclude does not.
    pub fn is_cop_match(&self, idx: usize, path: &Path) -> bool {
        let filter = &self.filters[idx];
        if !filter.enabled {
            return false;
        }
        if let Some(include) = &filter.include {
            if !self.matches(include, path) {
                return false;
            }
        }
        !self.is_cop_excluded(idx, path)
    }

    /// Whether cop `idx`'s own Exclude list matches `path`.
    pub fn is_cop_excluded(&self, idx: usize, path: &Path) -> bool {
        self.filters[idx]
            .exclude
            .as_ref()
            .is_some_and(|set| self.matches(set, path))
    }

    /// Match against the path as given and relative to the config directory.
    fn matches(&self, set: &GlobSet, path: &Path) -> bool {
        if set.is_match(path) {
            return true;
        }
        let trimmed = path.strip_prefix(".").unwrap_or(path);
        if set.is_match(trimmed) {
            return true;
        }
        let Some(dir) = &self.config_dir else {
            return false;
        };
        if let Ok(rel) = path.strip_prefix(dir) {
            return set.is_match(rel);
        }
        // Relative file against an absolute config dir found by upward search.
        match &self.cwd {
            Some(cwd) if path.is_relative() => cwd
                .join(trimmed)
                .strip_prefix(dir)
                .is_ok_and(|rel| set.is_match(rel)),
            _ => false,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid glob: {pattern}"))?);
    }
    Ok(Some(builder.build()?))
}

fn parse_cop_config(value: &Value) -> CopConfig {
    let mut config = CopConfig::default();

    if let Value::Mapping(map) = value {
        for (k, v) in map {
            let Some(key) = k.as_str() else {
                continue;
            };
            match key {
                "Enabled" => {
                    if let Some(b) = v.as_bool() {
                        config.enabled = b;
                    }
                }
                "Severity" => {
                    if let Some(s) = v.as_str() {
                        config.severity = Severity::from_str(s);
                    }
                }
                "Exclude" => {
                    if let Some(list) = value_to_string_list(v) {
                        config.exclude = list;
                    }
                }
                "Include" => {
                    if let Some(list) = value_to_string_list(v) {
                        config.include = list;
                    }
                }
                "AutoCorrect" => {
                    if let Some(setting) = AutocorrectSetting::from_yaml(v) {
                        config.autocorrect = setting;
                    }
                }
                "SafeAutoCorrect" => {
                    if let Some(b) = v.as_bool() {
                        config.safe_autocorrect = b;
                    }
                }
                _ => {
                    config.options.insert(key.to_string(), v.clone());
                }
            }
        }
    }

    config
}

fn extract_string_list(value: &Value, key: &str) -> Option<Vec<String>> {
    value_to_string_list(value.as_mapping()?.get(Value::String(key.to_string()))?)
}

fn value_to_string_list(value: &Value) -> Option<Vec<String>> {
    value.as_sequence().map(|seq| {
        seq.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}
