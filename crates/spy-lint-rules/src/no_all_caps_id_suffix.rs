//! Rule to forbid the all-caps `ID` suffix on identifiers.
//!
//! # Rationale
//!
//! Two-letter acronyms follow Pascal casing in member names: `UserId`,
//! not `UserID`. Mixing both forms makes names hard to guess.
//!
//! # Detected Patterns
//!
//! - Fields, properties and parameters whose name ends in `ID`
//! - Local variables whose name ends in `ID`
//!
//! The comparison is case-sensitive on the last two characters: `UserId`
//! and `Valid` pass, `OID` and `VALID` do not.

use spy_lint_core::{
    DiagnosticDescriptor, FileContext, NodeRef, Rule, RuleResult, Severity, Symbol, SymbolKind,
    SyntaxKind, Trigger,
};

/// Rule code for no-all-caps-id-suffix.
pub const CODE: &str = "SPY02";

/// Rule name for no-all-caps-id-suffix.
pub const NAME: &str = "no-all-caps-id-suffix";

const SUFFIX: &str = "ID";

const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: CODE,
    name: NAME,
    title: "Avoid 'ID' suffix; use 'Id'",
    message_format: "Identifier '{0}' ends with 'ID'; use 'Id' instead",
    category: "Naming",
    default_severity: Severity::Error,
    description: "Identifiers should use the 'Id' suffix rather than 'ID'",
};

const TRIGGERS: &[Trigger] = &[
    Trigger::Symbol(SymbolKind::Field),
    Trigger::Symbol(SymbolKind::Parameter),
    Trigger::Symbol(SymbolKind::Property),
    Trigger::Node(SyntaxKind::VariableDeclarator),
];

/// Flags identifiers ending in `ID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAllCapsIdSuffix;

impl NoAllCapsIdSuffix {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NoAllCapsIdSuffix {
    fn descriptor(&self) -> &DiagnosticDescriptor {
        &DESCRIPTOR
    }

    fn triggers(&self) -> &[Trigger] {
        TRIGGERS
    }

    fn check_node(&self, ctx: &FileContext<'_>, node: NodeRef<'_>) -> RuleResult {
        // Field declarators are reported through their symbols.
        let name = match ctx.semantic().declared_symbol(node.id()) {
            Some(symbol) if symbol.kind != SymbolKind::Local => return Ok(Vec::new()),
            Some(symbol) => symbol.name.as_str(),
            None => match node.name_text() {
                Some(name) => name,
                None => return Ok(Vec::new()),
            },
        };

        if !name.ends_with(SUFFIX) {
            return Ok(Vec::new());
        }
        Ok(vec![DESCRIPTOR.create(ctx.location(node.span()), &[name])])
    }

    fn check_symbol(&self, ctx: &FileContext<'_>, symbol: &Symbol) -> RuleResult {
        if !symbol.name.ends_with(SUFFIX) {
            return Ok(Vec::new());
        }
        let Some(span) = symbol.primary_location() else {
            return Ok(Vec::new());
        };
        Ok(vec![DESCRIPTOR.create(ctx.location(span), &[symbol.name.as_str()])])
    }
}
