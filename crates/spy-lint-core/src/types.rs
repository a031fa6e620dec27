//! Core types for diagnostics and results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// File path as reported by the source model.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// Static description of a rule's diagnostic.
///
/// The message format may reference up to two arguments as `{0}` and `{1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    /// Stable rule identifier (e.g., "SPY05").
    pub id: &'static str,
    /// Kebab-case rule name (e.g., "unconsumed-async-result").
    pub name: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Message format with positional placeholders.
    pub message_format: &'static str,
    /// Category (e.g., "Naming", "Usage").
    pub category: &'static str,
    /// Severity used unless configuration overrides it.
    pub default_severity: Severity,
    /// Longer explanation shown as help.
    pub description: &'static str,
}

impl DiagnosticDescriptor {
    /// Creates a diagnostic for this descriptor, substituting `args` into the message.
    #[must_use]
    pub fn create(&self, location: Location, args: &[&str]) -> Diagnostic {
        Diagnostic {
            id: self.id.to_string(),
            rule: self.name.to_string(),
            title: self.title.to_string(),
            message: format_message(self.message_format, args),
            category: self.category.to_string(),
            severity: self.default_severity,
            location,
        }
    }
}

fn format_message(format: &str, args: &[&str]) -> String {
    args.iter()
        .take(2)
        .enumerate()
        .fold(format.to_string(), |message, (i, arg)| {
            message.replace(&format!("{{{i}}}"), arg)
        })
}

/// A rule violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule identifier (e.g., "SPY01").
    pub id: String,
    /// Rule name (e.g., "single-top-level-type").
    pub rule: String,
    /// Rule title.
    pub title: String,
    /// Human-readable message.
    pub message: String,
    /// Rule category.
    pub category: String,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Primary location.
    pub location: Location,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.id,
            self.message
        )
    }
}

/// A [`Diagnostic`] prepared for miette's report handlers.
///
/// Source text is not part of the model, so the report carries the location
/// in its message instead of a labeled snippet.
#[derive(Debug, thiserror::Error)]
#[error("{location}: {message}")]
pub struct DiagnosticReport {
    code: String,
    location: String,
    message: String,
    help: String,
    severity: Severity,
}

impl miette::Diagnostic for DiagnosticReport {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.help))
    }
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            code: format!("{}({})", d.id, d.rule),
            location: format!(
                "{}:{}:{}",
                d.location.file.display(),
                d.location.line,
                d.location.column
            ),
            message: d.message.clone(),
            help: d.title.clone(),
            severity: d.severity,
        }
    }
}

/// Result of running the engine.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All diagnostics, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of compilation units checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns diagnostics filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    /// Returns diagnostics produced by one rule.
    #[must_use]
    pub fn by_rule(&self, id: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.id == id).collect()
    }

    /// Counts diagnostics by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.diagnostics.iter().filter(|d| d.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Checks if any diagnostics meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_diagnostics_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Sorts diagnostics by file, line, column, then rule id.
    ///
    /// Engine output is in discovery order; callers that need a stable
    /// presentation order sort explicitly.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.location
                .cmp(&b.location)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}
