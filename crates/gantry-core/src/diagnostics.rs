//! Non-fatal findings produced while parsing configuration
//!
//! Parsers collect these instead of logging directly; the caller decides
//! whether to surface them (the config loader forwards them to `tracing`).

use std::fmt;

use serde::Serialize;

/// What kind of non-fatal issue was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// An absolute path in a glob-valued field; accepted but will not work
    AbsolutePath { field: String, value: String },

    /// An environment variable declared through a `$`-prefixed dependency
    DeprecatedEnvDependency { field: String, value: String },

    /// The manifest still carries an inline pipeline block, which is ignored
    LegacyManifestConfig { key: String },
}

impl Diagnostic {
    /// Whether this diagnostic reports deprecated syntax rather than a likely mistake
    pub fn is_deprecation(&self) -> bool {
        matches!(
            self,
            Self::DeprecatedEnvDependency { .. } | Self::LegacyManifestConfig { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsolutePath { field, value } => write!(
                f,
                "Using an absolute path in \"{}\" ({}) will not work and will be an error in a future version",
                field, value
            ),
            Self::DeprecatedEnvDependency { field, value } => {
                let replacement = if field == "globalDependencies" {
                    "globalEnv"
                } else {
                    "env"
                };
                write!(
                    f,
                    "Declaring an environment variable in \"{}\" is deprecated, found {}. Use the \"{}\" key instead.",
                    field, value, replacement
                )
            }
            Self::LegacyManifestConfig { key } => write!(
                f,
                "\"{}\" in package.json is no longer supported. Move the pipeline into gantry.json.",
                key
            ),
        }
    }
}

/// An ordered list of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append all diagnostics from another list
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Forward every diagnostic to `tracing` as a warning
    pub fn log(&self) {
        for diagnostic in &self.0 {
            if diagnostic.is_deprecation() {
                tracing::warn!(deprecated = true, "{}", diagnostic);
            } else {
                tracing::warn!("{}", diagnostic);
            }
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }
}

/// A parsed value together with the diagnostics collected while producing it
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Diagnostics,
}

impl<T> Parsed<T> {
    pub fn new(value: T, diagnostics: Diagnostics) -> Self {
        Self { value, diagnostics }
    }

    /// Log the diagnostics and return the value
    pub fn into_logged(self) -> T {
        self.diagnostics.log();
        self.value
    }

    /// Transform the value, keeping the diagnostics
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}
