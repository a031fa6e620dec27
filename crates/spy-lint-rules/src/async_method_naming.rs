//! Rule requiring async methods to end with `Async`.
//!
//! # Rationale
//!
//! The suffix tells callers at the call site that the method returns an
//! asynchronous result that has to be awaited.
//!
//! # Detected Patterns
//!
//! ```text
//! public async Task Fetch() { }        // flagged
//! public async Task FetchAsync() { }   // ok
//! ```
//!
//! Constructors, operators, accessors, local functions, lambdas and
//! compiler-synthesized methods are never checked.

use spy_lint_core::{
    DiagnosticDescriptor, FileContext, MethodKind, Rule, RuleResult, Severity, Symbol, SymbolKind,
    Trigger,
};

/// Rule code for async-method-naming.
pub const CODE: &str = "SPY03";

/// Rule name for async-method-naming.
pub const NAME: &str = "async-method-naming";

const SUFFIX: &str = "Async";

const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: CODE,
    name: NAME,
    title: "Async method name must end with 'Async'",
    message_format: "Method '{0}' is async but does not end with 'Async'",
    category: "Naming",
    default_severity: Severity::Error,
    description: "Async method names should end with 'Async' to follow convention",
};

/// Flags async ordinary methods whose name lacks the `Async` suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncMethodNaming;

impl AsyncMethodNaming {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Synthesized names such as `<Main>$` are not written by users.
fn is_user_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl Rule for AsyncMethodNaming {
    fn descriptor(&self) -> &DiagnosticDescriptor {
        &DESCRIPTOR
    }

    fn triggers(&self) -> &[Trigger] {
        &[Trigger::Symbol(SymbolKind::Method)]
    }

    fn check_symbol(&self, ctx: &FileContext<'_>, symbol: &Symbol) -> RuleResult {
        let Some(signature) = &symbol.method else {
            return Ok(Vec::new());
        };
        if signature.method_kind != MethodKind::Ordinary
            || symbol.implicitly_declared
            || !is_user_identifier(&symbol.name)
        {
            return Ok(Vec::new());
        }
        if !signature.is_async || symbol.name.ends_with(SUFFIX) {
            return Ok(Vec::new());
        }

        let Some(span) = symbol.primary_location() else {
            return Ok(Vec::new());
        };
        Ok(vec![DESCRIPTOR.create(ctx.location(span), &[symbol.name.as_str()])])
    }
}
