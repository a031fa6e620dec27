//! Rule requiring at most one top-level type declaration per file.
//!
//! # Rationale
//!
//! One type per file keeps file names predictable and makes types easy to
//! locate. Nested types are part of their enclosing type and are not counted.
//!
//! # Detected Patterns
//!
//! ```text
//! namespace App;
//!
//! class Widget { }
//! class Gadget { }   // flagged
//! ```
//!
//! Every top-level declaration after the first is reported at its name.
//! Classes, structs, interfaces, enums and records all count.

use spy_lint_core::{
    DiagnosticDescriptor, FileContext, NodeRef, Rule, RuleResult, Severity, SyntaxKind, Trigger,
};

/// Rule code for single-top-level-type.
pub const CODE: &str = "SPY01";

/// Rule name for single-top-level-type.
pub const NAME: &str = "single-top-level-type";

const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: CODE,
    name: NAME,
    title: "Multiple top-level types in file",
    message_format: "File contains multiple top-level type declarations",
    category: "Structure",
    default_severity: Severity::Error,
    description: "Each file should declare a single top-level type",
};

/// Flags every top-level type declaration after the first in a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleTopLevelType;

impl SingleTopLevelType {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_top_level(node: NodeRef<'_>) -> bool {
    node.kind().is_type_declaration()
        && node.parent().is_some_and(|p| {
            p.kind() == SyntaxKind::CompilationUnit || p.kind().is_namespace_declaration()
        })
}

impl Rule for SingleTopLevelType {
    fn descriptor(&self) -> &DiagnosticDescriptor {
        &DESCRIPTOR
    }

    fn triggers(&self) -> &[Trigger] {
        &[Trigger::File]
    }

    fn check_file(&self, ctx: &FileContext<'_>) -> RuleResult {
        let diagnostics = ctx
            .tree()
            .descendants()
            .filter(|n| is_top_level(*n))
            .skip(1)
            .map(|n| DESCRIPTOR.create(ctx.location(n.name_span()), &[]))
            .collect();
        Ok(diagnostics)
    }
}
