//! Compilation units handed to the engine by the source frontend.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::semantic::SemanticModel;
use crate::syntax::SyntaxTree;

/// Errors loading a serialized source model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// IO error reading the model file.
    #[error("Failed to read source model {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The model is not valid JSON or violates tree invariants.
    #[error("Failed to parse source model: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One analyzed file: its syntax tree, semantic model, and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Normalized absolute path of the file, when the frontend knows it.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Configured project root used by folder-aware rules.
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    /// Tool-generated source. The engine never reports inside it.
    #[serde(default)]
    pub generated: bool,
    /// Parsed syntax tree.
    pub tree: SyntaxTree,
    /// Resolved symbols and types.
    #[serde(default)]
    pub semantic: SemanticModel,
}

impl CompilationUnit {
    /// Creates a unit without path information.
    #[must_use]
    pub fn new(tree: SyntaxTree, semantic: SemanticModel) -> Self {
        Self {
            path: None,
            project_root: None,
            generated: false,
            tree,
            semantic,
        }
    }

    /// Sets the file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the project root.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Marks the unit as generated code.
    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Path used when reporting locations in this unit.
    #[must_use]
    pub fn display_path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new("<unknown>"))
    }
}

/// All compilation units of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModel {
    /// Units in frontend order.
    #[serde(default)]
    pub units: Vec<CompilationUnit>,
}

impl SourceModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit.
    #[must_use]
    pub fn with_unit(mut self, unit: CompilationUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Parses a model from JSON, validating every syntax tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a tree is inconsistent.
    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Fills in `root` for every unit that has no project root.
    pub fn apply_default_project_root(&mut self, root: &Path) {
        for unit in &mut self.units {
            if unit.project_root.is_none() {
                unit.project_root = Some(root.to_path_buf());
            }
        }
    }

    /// Merges the units of another model into this one.
    pub fn extend(&mut self, other: Self) {
        self.units.extend(other.units);
    }
}
