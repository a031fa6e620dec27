//! # spy-lint-core
//!
//! Core framework for convention linting over a parsed, resolved source model.
//!
//! This crate provides the foundational types for building convention rules.
//! It includes:
//!
//! - [`SyntaxTree`] and [`SemanticModel`], the read-only source model a
//!   frontend supplies per [`CompilationUnit`]
//! - [`Rule`] trait with [`Trigger`]-based dispatch (file, node kind, symbol kind)
//! - [`Engine`] for parallel dispatch and diagnostic aggregation
//! - [`Diagnostic`] for representing rule findings
//!
//! ## Example
//!
//! ```ignore
//! use spy_lint_core::{Engine, SourceModel};
//!
//! let model = SourceModel::from_file(Path::new("model.json"))?;
//! let engine = Engine::builder()
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = engine.run(&model)?;
//! for diagnostic in &result.diagnostics {
//!     println!("{diagnostic}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod model;
mod rule;
mod semantic;
mod syntax;
mod types;

pub use config::{Config, ConfigError, EngineConfig, RuleConfig};
pub use context::FileContext;
pub use engine::{Engine, EngineBuilder, EngineError};
pub use model::{CompilationUnit, ModelError, SourceModel};
pub use rule::{Rule, RuleBox, RuleError, RuleResult, Trigger};
pub use semantic::{
    AsyncResultTypes, MethodKind, MethodSignature, Parameter, SemanticModel, Symbol, SymbolId,
    SymbolKind, TypeDescriptor, DEFAULT_ASYNC_RESULT_TYPE,
};
pub use syntax::{
    NodeId, NodeRef, SyntaxKind, SyntaxNode, SyntaxTree, TextSpan, Token, TreeBuilder, TreeError,
};
pub use types::{Diagnostic, DiagnosticDescriptor, DiagnosticReport, LintResult, Location, Severity};
