pub mod percent_literal;
pub mod registry;
pub mod style;
pub mod util;
pub mod walker;

use std::collections::HashMap;

use crate::cli::AutocorrectMode;
use crate::correction::Corrector;
use crate::diagnostic::{Diagnostic, Severity};
use crate::parse::source::SourceFile;
use percent_literal::{LiteralKind, PercentLiteral};

/// The `AutoCorrect` key of a cop's config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocorrectSetting {
    /// `true` or `always`
    Always,
    /// `contextual`: RuboCop skips these in editor (LSP) mode only, so CLI
    /// runs treat it like `always`.
    Contextual,
    /// `false` or `disabled`
    Disabled,
}

impl AutocorrectSetting {
    pub fn from_yaml(value: &serde_yml::Value) -> Option<Self> {
        if let Some(b) = value.as_bool() {
            return Some(if b { Self::Always } else { Self::Disabled });
        }
        match value.as_str()? {
            "always" => Some(Self::Always),
            "contextual" => Some(Self::Contextual),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Per-cop configuration extracted from .rubocop.yml.
#[derive(Debug, Clone)]
pub struct CopConfig {
    pub enabled: bool,
    pub severity: Option<Severity>,
    pub exclude: Vec<String>,
    pub include: Vec<String>,
    pub autocorrect: AutocorrectSetting,
    /// `SafeAutoCorrect`; `-a` only applies corrections marked safe.
    pub safe_autocorrect: bool,
    pub options: HashMap<String, serde_yml::Value>,
}

impl Default for CopConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
            exclude: Vec::new(),
            include: Vec::new(),
            autocorrect: AutocorrectSetting::Always,
            safe_autocorrect: true,
            options: HashMap::new(),
        }
    }
}

impl CopConfig {
    pub fn should_autocorrect(&self, mode: AutocorrectMode) -> bool {
        match mode {
            AutocorrectMode::Off => false,
            _ if self.autocorrect == AutocorrectSetting::Disabled => false,
            AutocorrectMode::Safe => self.safe_autocorrect,
            AutocorrectMode::All => true,
        }
    }
}

/// A lint rule. Implementations must be Send + Sync so they can be shared
/// across rayon worker threads.
pub trait Cop: Send + Sync {
    /// The fully-qualified cop name, e.g. "Style/RedundantCapitalW".
    fn name(&self) -> &'static str;

    /// Names this cop was published under before a rename. Config keys,
    /// disable directives and `--only`/`--except` accept them too.
    fn legacy_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn default_severity(&self) -> Severity {
        Severity::Convention
    }

    fn supports_autocorrect(&self) -> bool {
        false
    }

    /// Percent-literal families this cop wants to see. The registry builds
    /// its dispatch table from this; an empty slice means the cop is never
    /// invoked by the walker.
    fn interested_literal_kinds(&self) -> &'static [LiteralKind] {
        &[]
    }

    /// Called once per literal whose kind is in `interested_literal_kinds`.
    /// `corrector` is `Some` only when this cop's corrections will be applied.
    #[allow(unused_variables)]
    fn check_literal(
        &self,
        source: &SourceFile,
        literal: &PercentLiteral<'_>,
        config: &CopConfig,
        diagnostics: &mut Vec<Diagnostic>,
        corrector: Option<&mut Corrector>,
    ) {
    }

    /// Build a diagnostic anchored at `offset` with this cop's name and
    /// default severity.
    fn diagnostic(&self, source: &SourceFile, offset: usize, message: String) -> Diagnostic {
        Diagnostic {
            path: source.path_str().to_string(),
            location: source.location_of(offset),
            severity: self.default_severity(),
            cop_name: self.name().to_string(),
            message,
            corrected: false,
        }
    }
}

/// The cop's current name followed by its legacy names.
pub fn known_names(cop: &dyn Cop) -> impl Iterator<Item = &'static str> {
    std::iter::once(cop.name()).chain(cop.legacy_names().iter().copied())
}
