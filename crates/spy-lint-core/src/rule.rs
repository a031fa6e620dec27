//! Rule trait and dispatch triggers.

use thiserror::Error;

use crate::context::FileContext;
use crate::semantic::{Symbol, SymbolKind};
use crate::syntax::{NodeId, NodeRef, SyntaxKind};
use crate::types::{Diagnostic, DiagnosticDescriptor, Severity};

/// Dispatch condition under which the engine invokes a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Once per compilation unit.
    File,
    /// Once per syntax node of this kind.
    Node(SyntaxKind),
    /// Once per declared symbol of this kind.
    Symbol(SymbolKind),
}

/// Contract violation between the source model and a rule.
///
/// Returning this from a rule aborts the whole run; inapplicable inputs
/// must produce an empty vector instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A node of the registered kind lacks a child the rule relies on.
    #[error("{kind:?} node {node} has no {expected:?} child")]
    MissingChild {
        /// Kind of the malformed node.
        kind: SyntaxKind,
        /// Arena index of the malformed node.
        node: u32,
        /// Expected child kind.
        expected: SyntaxKind,
    },

    /// A node was dispatched to a rule that never registered its kind.
    #[error("rule received unexpected {0:?} node")]
    UnexpectedNode(SyntaxKind),

    /// Any other inconsistency in the source model.
    #[error("inconsistent source model: {0}")]
    Inconsistent(String),
}

impl RuleError {
    /// Builds a [`RuleError::MissingChild`] for `node`.
    #[must_use]
    pub fn missing_child(node: NodeRef<'_>, expected: SyntaxKind) -> Self {
        let NodeId(index) = node.id();
        Self::MissingChild {
            kind: node.kind(),
            node: index,
            expected,
        }
    }
}

/// Result type for a single rule evaluation.
pub type RuleResult = Result<Vec<Diagnostic>, RuleError>;

/// A unit of analysis bound to one or more triggers.
///
/// Rules are evaluated concurrently and must not hold mutable state. Each
/// `check_*` method is called only for triggers the rule declares; the
/// defaults return no diagnostics.
///
/// # Example
///
/// ```ignore
/// use spy_lint_core::{FileContext, Rule, RuleResult, Trigger};
///
/// pub struct NoEmptyFiles;
///
/// impl Rule for NoEmptyFiles {
///     fn descriptor(&self) -> &DiagnosticDescriptor { &DESCRIPTOR }
///     fn triggers(&self) -> &[Trigger] { &[Trigger::File] }
///
///     fn check_file(&self, ctx: &FileContext<'_>) -> RuleResult {
///         if ctx.tree().root().children().len() == 0 {
///             let loc = ctx.location(ctx.tree().root().span());
///             return Ok(vec![self.descriptor().create(loc, &[])]);
///         }
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Static descriptor of the diagnostic this rule emits.
    fn descriptor(&self) -> &DiagnosticDescriptor;

    /// Triggers this rule subscribes to.
    fn triggers(&self) -> &[Trigger];

    /// Returns the rule code (e.g., "SPY01").
    fn code(&self) -> &'static str {
        self.descriptor().id
    }

    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        self.descriptor().description
    }

    /// Returns the default severity for diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        self.descriptor().default_severity
    }

    /// Checks a whole compilation unit ([`Trigger::File`]).
    ///
    /// # Errors
    ///
    /// Returns an error on a source model contract violation.
    fn check_file(&self, _ctx: &FileContext<'_>) -> RuleResult {
        Ok(Vec::new())
    }

    /// Checks one node of a subscribed kind ([`Trigger::Node`]).
    ///
    /// # Errors
    ///
    /// Returns an error on a source model contract violation.
    fn check_node(&self, _ctx: &FileContext<'_>, _node: NodeRef<'_>) -> RuleResult {
        Ok(Vec::new())
    }

    /// Checks one declared symbol of a subscribed kind ([`Trigger::Symbol`]).
    ///
    /// # Errors
    ///
    /// Returns an error on a source model contract violation.
    fn check_symbol(&self, _ctx: &FileContext<'_>, _symbol: &Symbol) -> RuleResult {
        Ok(Vec::new())
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
