//! Rule to detect asynchronous results that are silently dropped.
//!
//! # Rationale
//!
//! Calling a method that returns a `Task` and discarding the result starts
//! work nobody waits for. Exceptions thrown by that work are lost and the
//! caller continues before it completes.
//!
//! # Detected Patterns
//!
//! ```text
//! FetchAsync();                      // flagged
//! FetchAsync().ConfigureAwait(false); // flagged
//! ```
//!
//! # Good Patterns
//!
//! ```text
//! await FetchAsync();
//! await FetchAsync().WithTimeout();
//! return FetchAsync();               // inside a Task-returning method
//! Task pending = FetchAsync();
//! Task.WhenAll(FetchAsync());        // parameter typed as Task
//! ```
//!
//! See [`AwaitContextClassifier`] for the exact contexts.
//!
//! # Configuration
//!
//! - `async_result_types`: extra fully-qualified type names treated like
//!   `System.Threading.Tasks.Task` (e.g. `System.Threading.Tasks.ValueTask`)

use spy_lint_core::{
    AsyncResultTypes, DiagnosticDescriptor, FileContext, NodeRef, Rule, RuleConfig, RuleError,
    RuleResult, Severity, SymbolKind, SyntaxKind, Trigger,
};

use crate::await_context::AwaitContextClassifier;

/// Rule code for unconsumed-async-result.
pub const CODE: &str = "SPY05";

/// Rule name for unconsumed-async-result.
pub const NAME: &str = "unconsumed-async-result";

/// Option key listing additional asynchronous-result types.
pub const ASYNC_RESULT_TYPES_OPTION: &str = "async_result_types";

const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: CODE,
    name: NAME,
    title: "Async method call must be awaited",
    message_format: "Method '{0}' returns a Task but the await operator is missing",
    category: "Usage",
    default_severity: Severity::Error,
    description: "Async method calls that return Task or Task<T> should be awaited to ensure proper async behavior",
};

/// Flags invocations whose asynchronous result is never consumed.
#[derive(Debug, Clone, Default)]
pub struct UnconsumedAsyncResult {
    /// Types recognized as asynchronous results.
    pub async_result_types: AsyncResultTypes,
}

impl UnconsumedAsyncResult {
    /// Creates a new rule recognizing only `System.Threading.Tasks.Task`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the rule from its configuration entry.
    #[must_use]
    pub fn from_config(config: Option<&RuleConfig>) -> Self {
        let extra = config
            .map(|c| c.get_str_array(ASYNC_RESULT_TYPES_OPTION))
            .unwrap_or_default();
        Self::new().async_result_types(extra)
    }

    /// Adds further fully-qualified asynchronous-result type names.
    #[must_use]
    pub fn async_result_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.async_result_types = self.async_result_types.with_additional(names);
        self
    }
}

impl Rule for UnconsumedAsyncResult {
    fn descriptor(&self) -> &DiagnosticDescriptor {
        &DESCRIPTOR
    }

    fn triggers(&self) -> &[Trigger] {
        &[Trigger::Node(SyntaxKind::InvocationExpression)]
    }

    fn check_node(&self, ctx: &FileContext<'_>, node: NodeRef<'_>) -> RuleResult {
        if node.kind() != SyntaxKind::InvocationExpression {
            return Err(RuleError::UnexpectedNode(node.kind()));
        }

        let Some(method) = ctx
            .semantic()
            .referenced_symbol(node.id())
            .filter(|s| s.kind == SymbolKind::Method)
        else {
            return Ok(Vec::new());
        };
        let returns_async = method
            .return_type()
            .is_some_and(|ty| ty.is_async_result(&self.async_result_types));
        if !returns_async {
            return Ok(Vec::new());
        }

        let classifier = AwaitContextClassifier::new(ctx.semantic(), &self.async_result_types);
        if classifier.classify(node).is_some() {
            return Ok(Vec::new());
        }

        let name = method.display_name();
        Ok(vec![DESCRIPTOR.create(ctx.location(node.span()), &[name.as_str()])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{async_method, check, sync_method, task, void, Fixture};
    use spy_lint_core::{Config, TypeDescriptor};

    fn fetch(f: &mut Fixture) -> spy_lint_core::SymbolId {
        f.external(async_method("FetchAsync").in_type("Client"))
    }

    #[test]
    fn test_bare_call_fires_once() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("Run", void()), |f| {
            f.statement(|f| f.call("FetchAsync", Some(target)))
        });
        let unit = f.finish();
        let span = unit.tree.get(call).expect("call").span();

        let diagnostics = check(UnconsumedAsyncResult::new(), unit);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Method 'Client.FetchAsync' returns a Task but the await operator is missing"
        );
        assert_eq!(diagnostics[0].location.line, span.line);
        assert_eq!(diagnostics[0].location.offset, span.offset);
    }

    #[test]
    fn test_method_without_containing_type_uses_bare_name() {
        let mut f = Fixture::new();
        let target = f.external(async_method("FetchAsync"));
        f.method(sync_method("Run", void()), |f| {
            f.statement(|f| f.call("FetchAsync", Some(target)))
        });

        let diagnostics = check(UnconsumedAsyncResult::new(), f.finish());
        assert!(diagnostics[0].message.starts_with("Method 'FetchAsync'"));
    }

    #[test]
    fn test_awaited_call_passes() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        f.method(async_method("RunAsync"), |f| {
            f.statement(|f| {
                let await_expr = f.open(SyntaxKind::AwaitExpression);
                f.call("FetchAsync", Some(target));
                f.close();
                await_expr
            })
        });

        assert!(check(UnconsumedAsyncResult::new(), f.finish()).is_empty());
    }

    #[test]
    fn test_synchronous_and_unresolved_calls_ignored() {
        let mut f = Fixture::new();
        let log = f.external(sync_method("Log", void()));
        f.method(sync_method("Run", void()), |f| {
            f.statement(|f| f.call("Log", Some(log)));
            f.statement(|f| f.call("Unknown", None));
        });

        assert!(check(UnconsumedAsyncResult::new(), f.finish()).is_empty());
    }

    #[test]
    fn test_non_method_target_ignored() {
        // Invoking a delegate-typed field resolves to the field.
        let mut f = Fixture::new();
        let field = f.external(spy_lint_core::Symbol::new("callback", SymbolKind::Field));
        f.method(sync_method("Run", void()), |f| {
            f.statement(|f| f.call("callback", Some(field)))
        });

        assert!(check(UnconsumedAsyncResult::new(), f.finish()).is_empty());
    }

    #[test]
    fn test_nested_dropped_calls_each_reported() {
        // Wrap(FetchAsync()) where Wrap takes object and returns Task.
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let wrap = f.external(
            spy_lint_core::Symbol::method(
                "Wrap",
                spy_lint_core::MethodSignature::new(task())
                    .param("value", TypeDescriptor::new("System.Object")),
            )
            .in_type("Client"),
        );
        f.method(sync_method("Run", void()), |f| {
            f.statement(|f| {
                let outer = f.open_call("Wrap", Some(wrap));
                f.open(SyntaxKind::Argument);
                f.call("FetchAsync", Some(target));
                f.close();
                f.close_call();
                outer
            })
        });

        let diagnostics = check(UnconsumedAsyncResult::new(), f.finish());
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("'Client.Wrap'"));
        assert!(messages[1].contains("'Client.FetchAsync'"));
    }

    #[test]
    fn test_configured_value_task_is_recognized() {
        let value_task = TypeDescriptor::generic(
            "System.Threading.Tasks.ValueTask",
            vec![TypeDescriptor::new("System.Int32")],
        );
        let build = || {
            let mut f = Fixture::new();
            let target = f.external(sync_method("CountAsync", value_task.clone()));
            f.method(sync_method("Run", void()), |f| {
                f.statement(|f| f.call("CountAsync", Some(target)))
            });
            f.finish()
        };

        assert!(check(UnconsumedAsyncResult::new(), build()).is_empty());

        let config = Config::parse(
            r#"
[rules.unconsumed-async-result]
async_result_types = ["System.Threading.Tasks.ValueTask"]
"#,
        )
        .expect("config");
        let rule = UnconsumedAsyncResult::from_config(config.rule_config(NAME, CODE));
        assert_eq!(check(rule, build()).len(), 1);
    }

    #[test]
    fn test_unexpected_node_is_error() {
        let mut f = Fixture::new();
        let block = f.leaf(SyntaxKind::Block, None);
        let unit = f.finish();
        let ctx = FileContext::new(&unit);
        let node = unit.tree.get(block).expect("block");

        assert_eq!(
            UnconsumedAsyncResult::new().check_node(&ctx, node),
            Err(RuleError::UnexpectedNode(SyntaxKind::Block))
        );
    }
}
