//! Classification of the syntactic context an invocation appears in.
//!
//! An invocation that produces an asynchronous result is *consumed* when
//! the result is suspended on, handed back to an async caller, stored in a
//! variable typed as an asynchronous result, or passed to a parameter that
//! expects one. [`AwaitContextClassifier::classify`] tries these contexts in
//! a fixed order and returns the first that matches. Parenthesized
//! expressions are looked through everywhere.

use spy_lint_core::{AsyncResultTypes, NodeRef, SemanticModel, SyntaxKind, TypeDescriptor};

/// Context in which an asynchronous result is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwaitContext {
    /// `await Call()`.
    Awaited,
    /// `await Call().Then()`; the chain ends in a suspension.
    ChainedThenAwaited,
    /// `return Call();` or an expression body (`=> Call()`) of a method,
    /// accessor, lambda or property typed as an async result.
    ReturnedFromAsync,
    /// `Task t = Call();`.
    AssignedToAsyncResult,
    /// `Run(Call())` where the parameter is an async result.
    PassedAsAsyncResultArgument,
}

/// Decides whether an invocation's asynchronous result is consumed.
#[derive(Debug, Clone, Copy)]
pub struct AwaitContextClassifier<'a> {
    semantic: &'a SemanticModel,
    async_types: &'a AsyncResultTypes,
}

impl<'a> AwaitContextClassifier<'a> {
    /// Creates a classifier over one unit's semantic model.
    #[must_use]
    pub fn new(semantic: &'a SemanticModel, async_types: &'a AsyncResultTypes) -> Self {
        Self {
            semantic,
            async_types,
        }
    }

    /// Returns the first matching consumption context, or `None` when the
    /// result is dropped.
    #[must_use]
    pub fn classify(&self, invocation: NodeRef<'a>) -> Option<AwaitContext> {
        let (expr, parent) = enclosing(invocation)?;

        if parent.kind() == SyntaxKind::AwaitExpression {
            return Some(AwaitContext::Awaited);
        }
        if is_chained_then_awaited(invocation) {
            return Some(AwaitContext::ChainedThenAwaited);
        }
        if self.is_returned_from_async(expr, parent) {
            return Some(AwaitContext::ReturnedFromAsync);
        }
        if self.is_assigned_to_async_result(parent) {
            return Some(AwaitContext::AssignedToAsyncResult);
        }
        if self.is_passed_as_async_result(parent) {
            return Some(AwaitContext::PassedAsAsyncResultArgument);
        }
        None
    }

    fn is_async(&self, ty: Option<&TypeDescriptor>) -> bool {
        ty.is_some_and(|ty| ty.is_async_result(self.async_types))
    }

    fn is_returned_from_async(&self, expr: NodeRef<'a>, parent: NodeRef<'a>) -> bool {
        let function = match parent.kind() {
            SyntaxKind::ArrowExpressionClause => {
                // `Task P => Call();` has no accessor node; the property type decides.
                if let Some(property) = parent
                    .parent()
                    .filter(|n| n.kind() == SyntaxKind::PropertyDeclaration)
                {
                    return property
                        .child_of_kind(SyntaxKind::Type)
                        .is_some_and(|ty| self.is_async(self.semantic.type_of(ty.id())));
                }
                parent.ancestors().find(|n| n.kind().is_function_like())
            }
            SyntaxKind::ReturnStatement => parent
                .ancestors()
                .find(|n| n.kind().is_function_like()),
            // Expression-bodied lambda: the body is the last child.
            kind if kind.is_function_like() => {
                if parent.children().next_back() == Some(expr) {
                    Some(parent)
                } else {
                    None
                }
            }
            _ => None,
        };

        function
            .and_then(|f| self.semantic.declared_symbol(f.id()))
            .is_some_and(|symbol| self.is_async(symbol.return_type()))
    }

    fn is_assigned_to_async_result(&self, parent: NodeRef<'a>) -> bool {
        if parent.kind() != SyntaxKind::EqualsValueClause {
            return false;
        }
        let declaration = parent
            .parent()
            .filter(|n| n.kind() == SyntaxKind::VariableDeclarator)
            .and_then(NodeRef::parent)
            .filter(|n| n.kind() == SyntaxKind::VariableDeclaration);

        declaration
            .and_then(|d| d.child_of_kind(SyntaxKind::Type))
            .is_some_and(|ty| self.is_async(self.semantic.type_of(ty.id())))
    }

    fn is_passed_as_async_result(&self, parent: NodeRef<'a>) -> bool {
        if parent.kind() != SyntaxKind::Argument {
            return false;
        }
        let Some(list) = parent
            .parent()
            .filter(|n| n.kind() == SyntaxKind::ArgumentList)
        else {
            return false;
        };
        let Some(owner) = list.parent().filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::InvocationExpression | SyntaxKind::ObjectCreationExpression
            )
        }) else {
            return false;
        };
        let Some(index) = list
            .children()
            .filter(|c| c.kind() == SyntaxKind::Argument)
            .position(|c| c == parent)
        else {
            return false;
        };

        self.semantic
            .referenced_symbol(owner.id())
            .and_then(|target| target.method.as_ref())
            .and_then(|signature| signature.parameters.get(index))
            .is_some_and(|param| self.is_async(Some(&param.ty)))
    }
}

/// Climbs out of parentheses around `node`.
///
/// Returns the outermost parenthesized form of `node` together with its
/// first non-parenthesis ancestor.
fn enclosing(node: NodeRef<'_>) -> Option<(NodeRef<'_>, NodeRef<'_>)> {
    let mut expr = node;
    let mut parent = node.parent()?;
    while parent.kind() == SyntaxKind::ParenthesizedExpression {
        expr = parent;
        parent = parent.parent()?;
    }
    Some((expr, parent))
}

/// Follows member-access receivers and invocation callees upward.
fn is_chained_then_awaited(invocation: NodeRef<'_>) -> bool {
    let mut current = invocation;
    let mut linked = false;
    while let Some((expr, parent)) = enclosing(current) {
        match parent.kind() {
            SyntaxKind::MemberAccessExpression | SyntaxKind::InvocationExpression
                if parent.first_child() == Some(expr) =>
            {
                current = parent;
                linked = true;
            }
            SyntaxKind::AwaitExpression => return linked,
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{async_method, sync_method, task, task_of, void, Fixture};
    use spy_lint_core::{CompilationUnit, MethodSignature, NodeId, Symbol};

    fn classify(unit: &CompilationUnit, call: NodeId) -> Option<AwaitContext> {
        let types = AsyncResultTypes::default();
        let node = unit.tree.get(call).expect("call node");
        AwaitContextClassifier::new(&unit.semantic, &types).classify(node)
    }

    fn fetch(f: &mut Fixture) -> spy_lint_core::SymbolId {
        f.external(async_method("FetchAsync").in_type("Client"))
    }

    #[test]
    fn bare_statement_is_unconsumed() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("Run", void()), |f| {
            f.statement(|f| f.call("FetchAsync", Some(target)))
        });
        assert_eq!(classify(&f.finish(), call), None);
    }

    #[test]
    fn direct_await() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(async_method("RunAsync"), |f| {
            f.statement(|f| {
                f.open(SyntaxKind::AwaitExpression);
                let call = f.call("FetchAsync", Some(target));
                f.close();
                call
            })
        });
        assert_eq!(classify(&f.finish(), call), Some(AwaitContext::Awaited));
    }

    #[test]
    fn parenthesized_await() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(async_method("RunAsync"), |f| {
            f.statement(|f| {
                f.open(SyntaxKind::AwaitExpression);
                f.open(SyntaxKind::ParenthesizedExpression);
                f.open(SyntaxKind::ParenthesizedExpression);
                let call = f.call("FetchAsync", Some(target));
                f.close();
                f.close();
                f.close();
                call
            })
        });
        assert_eq!(classify(&f.finish(), call), Some(AwaitContext::Awaited));
    }

    #[test]
    fn chained_then_awaited() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let mut inner = None;
        f.method(async_method("RunAsync"), |f| {
            f.statement(|f| {
                f.open(SyntaxKind::AwaitExpression);
                let outer = f.chained_call("WithTimeout", None, |f| {
                    let call = f.call("FetchAsync", Some(target));
                    inner = Some(call);
                    call
                });
                f.close();
                outer
            })
        });
        let call = inner.expect("inner call");
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::ChainedThenAwaited)
        );
    }

    #[test]
    fn chain_is_followed_through_several_links() {
        // await FetchAsync().ConfigureAwait(false).WithTimeout()
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let mut inner = None;
        f.method(async_method("RunAsync"), |f| {
            f.statement(|f| {
                f.open(SyntaxKind::AwaitExpression);
                let outer = f.chained_call("WithTimeout", None, |f| {
                    f.chained_call("ConfigureAwait", None, |f| {
                        let call = f.call("FetchAsync", Some(target));
                        inner = Some(call);
                        call
                    })
                });
                f.close();
                outer
            })
        });
        let call = inner.expect("inner call");
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::ChainedThenAwaited)
        );
    }

    #[test]
    fn chain_without_await_is_unconsumed() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let mut inner = None;
        f.method(sync_method("Run", void()), |f| {
            f.statement(|f| {
                f.chained_call("ConfigureAwait", None, |f| {
                    let call = f.call("FetchAsync", Some(target));
                    inner = Some(call);
                    call
                })
            })
        });
        let call = inner.expect("inner call");
        assert_eq!(classify(&f.finish(), call), None);
    }

    #[test]
    fn awaited_call_used_as_argument_is_not_a_chain() {
        // await Wrap(FetchAsync()): the inner call is an argument, not a receiver.
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let wrap = f.external(sync_method("Wrap", task()).in_type("Client"));
        let call = f.method(async_method("RunAsync"), |f| {
            f.statement(|f| {
                f.open(SyntaxKind::AwaitExpression);
                f.open_call("Wrap", Some(wrap));
                f.open(SyntaxKind::Argument);
                let call = f.call("FetchAsync", Some(target));
                f.close();
                f.close_call();
                f.close();
                call
            })
        });
        assert_eq!(classify(&f.finish(), call), None);
    }

    #[test]
    fn returned_from_async_method() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("GetAsync", task_of("System.Int32")), |f| {
            f.open(SyntaxKind::ReturnStatement);
            let call = f.call("FetchAsync", Some(target));
            f.close();
            call
        });
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::ReturnedFromAsync)
        );
    }

    #[test]
    fn returned_from_synchronous_method_is_unconsumed() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("Get", TypeDescriptor::new("System.Object")), |f| {
            f.open(SyntaxKind::ReturnStatement);
            let call = f.call("FetchAsync", Some(target));
            f.close();
            call
        });
        assert_eq!(classify(&f.finish(), call), None);
    }

    #[test]
    fn return_uses_nearest_function() {
        // Task-returning method whose void local function returns the call.
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("OuterAsync", task()), |f| {
            let local = f.open_named(SyntaxKind::LocalFunctionStatement, "Inner");
            f.open(SyntaxKind::Block);
            f.open(SyntaxKind::ReturnStatement);
            let call = f.call("FetchAsync", Some(target));
            f.close();
            f.close();
            f.close();
            f.declare(
                Some(local),
                Symbol::method(
                    "Inner",
                    MethodSignature::new(void()).kind(spy_lint_core::MethodKind::LocalFunction),
                ),
            );
            call
        });
        assert_eq!(classify(&f.finish(), call), None);
    }

    #[test]
    fn expression_bodied_method_returning_task() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let decl = f.open_named(SyntaxKind::MethodDeclaration, "GetAsync");
        f.open(SyntaxKind::ArrowExpressionClause);
        let call = f.call("FetchAsync", Some(target));
        f.close();
        f.close();
        f.declare(Some(decl), sync_method("GetAsync", task()));
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::ReturnedFromAsync)
        );
    }

    fn expression_bodied_property(ty: TypeDescriptor) -> Option<AwaitContext> {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let property = f.open_named(SyntaxKind::PropertyDeclaration, "Pending");
        let ty_node = f.leaf(SyntaxKind::Type, Some("Task"));
        f.bind_type(ty_node, ty);
        f.open(SyntaxKind::ArrowExpressionClause);
        let call = f.call("FetchAsync", Some(target));
        f.close();
        f.close();
        f.declare(Some(property), Symbol::new("Pending", spy_lint_core::SymbolKind::Property));
        classify(&f.finish(), call)
    }

    #[test]
    fn expression_bodied_task_property_returns_the_call() {
        assert_eq!(
            expression_bodied_property(task()),
            Some(AwaitContext::ReturnedFromAsync)
        );
        assert_eq!(
            expression_bodied_property(TypeDescriptor::new("System.Object")),
            None
        );
    }

    #[test]
    fn expression_bodied_getter_returning_task() {
        // Task Pending { get => FetchAsync(); }
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        f.open_named(SyntaxKind::PropertyDeclaration, "Pending");
        let getter = f.open_named(SyntaxKind::AccessorDeclaration, "get");
        f.open(SyntaxKind::ArrowExpressionClause);
        let call = f.call("FetchAsync", Some(target));
        f.close();
        f.close();
        f.close();
        f.declare(
            Some(getter),
            Symbol::method(
                "get_Pending",
                MethodSignature::new(task()).kind(spy_lint_core::MethodKind::Accessor),
            ),
        );
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::ReturnedFromAsync)
        );
    }

    #[test]
    fn lambda_expression_body_returning_task() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("Run", void()), |f| {
            f.statement(|f| {
                let lambda = f.open(SyntaxKind::LambdaExpression);
                f.leaf(SyntaxKind::Parameter, Some("x"));
                let call = f.call("FetchAsync", Some(target));
                f.close();
                f.declare(
                    Some(lambda),
                    Symbol::method(
                        "<lambda>",
                        MethodSignature::new(task()).kind(spy_lint_core::MethodKind::AnonymousFunction),
                    ),
                );
                call
            })
        });
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::ReturnedFromAsync)
        );
    }

    fn local_declaration(f: &mut Fixture, ty: TypeDescriptor, target: spy_lint_core::SymbolId) -> NodeId {
        f.open(SyntaxKind::LocalDeclarationStatement);
        f.open(SyntaxKind::VariableDeclaration);
        let ty_node = f.leaf(SyntaxKind::Type, Some("var"));
        f.bind_type(ty_node, ty);
        f.open_named(SyntaxKind::VariableDeclarator, "t");
        f.open(SyntaxKind::EqualsValueClause);
        let call = f.call("FetchAsync", Some(target));
        f.close();
        f.close();
        f.close();
        f.close();
        call
    }

    #[test]
    fn assigned_to_task_variable() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("Run", void()), |f| {
            local_declaration(f, task(), target)
        });
        assert_eq!(
            classify(&f.finish(), call),
            Some(AwaitContext::AssignedToAsyncResult)
        );
    }

    #[test]
    fn assigned_to_object_variable_is_unconsumed() {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let call = f.method(sync_method("Run", void()), |f| {
            local_declaration(f, TypeDescriptor::new("System.Object"), target)
        });
        assert_eq!(classify(&f.finish(), call), None);
    }

    fn passed_as_second_argument(param: TypeDescriptor, owner: SyntaxKind) -> Option<AwaitContext> {
        let mut f = Fixture::new();
        let target = fetch(&mut f);
        let runner = f.external(Symbol::method(
            "Track",
            MethodSignature::new(void())
                .param("name", TypeDescriptor::new("System.String"))
                .param("work", param),
        ));
        let call = f.method(sync_method("Run", void()), |f| {
            f.statement(|f| {
                let outer = f.open(owner);
                f.leaf(SyntaxKind::IdentifierName, Some("Track"));
                f.open(SyntaxKind::ArgumentList);
                f.open(SyntaxKind::Argument);
                f.leaf(SyntaxKind::Literal, None);
                f.close();
                f.open(SyntaxKind::Argument);
                let call = f.call("FetchAsync", Some(target));
                f.close();
                f.close();
                f.close();
                f.bind(outer, runner);
                call
            })
        });
        classify(&f.finish(), call)
    }

    #[test]
    fn passed_to_task_parameter() {
        assert_eq!(
            passed_as_second_argument(task(), SyntaxKind::InvocationExpression),
            Some(AwaitContext::PassedAsAsyncResultArgument)
        );
        assert_eq!(
            passed_as_second_argument(task(), SyntaxKind::ObjectCreationExpression),
            Some(AwaitContext::PassedAsAsyncResultArgument)
        );
    }

    #[test]
    fn passed_to_object_parameter_is_unconsumed() {
        assert_eq!(
            passed_as_second_argument(
                TypeDescriptor::new("System.Object"),
                SyntaxKind::InvocationExpression
            ),
            None
        );
    }

    #[test]
    fn top_level_invocation_without_parent_is_unconsumed() {
        let mut b = spy_lint_core::TreeBuilder::new();
        b.leaf(SyntaxKind::InvocationExpression, None);
        let tree = b.build().expect("tree");
        let semantic = SemanticModel::new();
        let types = AsyncResultTypes::default();
        assert_eq!(
            AwaitContextClassifier::new(&semantic, &types).classify(tree.root()),
            None
        );
    }
}
