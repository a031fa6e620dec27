//! # spy-lint-rules
//!
//! Built-in convention rules for spy-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | SPY01 | `single-top-level-type` | At most one top-level type declaration per file |
//! | SPY02 | `no-all-caps-id-suffix` | Identifiers end in `Id`, not `ID` |
//! | SPY03 | `async-method-naming` | Async methods end in `Async` |
//! | SPY04 | `namespace-matches-folder` | Namespaces follow the folder layout |
//! | SPY05 | `unconsumed-async-result` | Asynchronous results are awaited or handed on |
//!
//! ## Usage
//!
//! ```ignore
//! use spy_lint_core::{Engine, SourceModel};
//! use spy_lint_rules::{AsyncMethodNaming, UnconsumedAsyncResult};
//!
//! let engine = Engine::builder()
//!     .rule(AsyncMethodNaming::new())
//!     .rule(UnconsumedAsyncResult::new())
//!     .build()?;
//! let result = engine.run(&model)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod await_context;
pub mod async_method_naming;
pub mod namespace_matches_folder;
pub mod no_all_caps_id_suffix;
mod presets;
pub mod single_top_level_type;
pub mod unconsumed_async_result;

#[cfg(test)]
mod test_support;

pub use async_method_naming::AsyncMethodNaming;
pub use await_context::{AwaitContext, AwaitContextClassifier};
pub use namespace_matches_folder::NamespaceMatchesFolder;
pub use no_all_caps_id_suffix::NoAllCapsIdSuffix;
pub use presets::{all_rules, is_known_rule, rules_from_config};
pub use single_top_level_type::SingleTopLevelType;
pub use unconsumed_async_result::UnconsumedAsyncResult;

/// Re-export core types for convenience.
pub use spy_lint_core::{Diagnostic, Rule, Severity};
