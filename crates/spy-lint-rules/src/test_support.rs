//! Hand-built compilation units for rule tests.

use spy_lint_core::{
    CompilationUnit, Diagnostic, Engine, MethodSignature, NodeId, Rule, SemanticModel,
    SourceModel, Symbol, SymbolId, SyntaxKind, TreeBuilder, TypeDescriptor,
    DEFAULT_ASYNC_RESULT_TYPE,
};

pub(crate) fn task() -> TypeDescriptor {
    TypeDescriptor::new(DEFAULT_ASYNC_RESULT_TYPE)
}

pub(crate) fn task_of(name: &str) -> TypeDescriptor {
    TypeDescriptor::generic(DEFAULT_ASYNC_RESULT_TYPE, vec![TypeDescriptor::new(name)])
}

pub(crate) fn void() -> TypeDescriptor {
    TypeDescriptor::new("System.Void")
}

pub(crate) fn async_method(name: &str) -> Symbol {
    Symbol::method(name, MethodSignature::new(task()).asynchronous())
}

pub(crate) fn sync_method(name: &str, returns: TypeDescriptor) -> Symbol {
    Symbol::method(name, MethodSignature::new(returns))
}

/// Tree and semantic model under construction; starts inside a compilation unit.
pub(crate) struct Fixture {
    builder: TreeBuilder,
    semantic: SemanticModel,
    path: Option<String>,
    project_root: Option<String>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let mut builder = TreeBuilder::new();
        builder.start_node(SyntaxKind::CompilationUnit);
        Self {
            builder,
            semantic: SemanticModel::new(),
            path: Some("/src/Test.cs".to_string()),
            project_root: None,
        }
    }

    pub(crate) fn at(mut self, path: &str, project_root: Option<&str>) -> Self {
        self.path = Some(path.to_string());
        self.project_root = project_root.map(String::from);
        self
    }

    pub(crate) fn open(&mut self, kind: SyntaxKind) -> NodeId {
        self.builder.start_node(kind)
    }

    pub(crate) fn open_named(&mut self, kind: SyntaxKind, name: &str) -> NodeId {
        let id = self.builder.start_node(kind);
        self.builder.name(name);
        id
    }

    pub(crate) fn close(&mut self) -> NodeId {
        self.builder.finish_node()
    }

    pub(crate) fn leaf(&mut self, kind: SyntaxKind, name: Option<&str>) -> NodeId {
        self.builder.leaf(kind, name)
    }

    /// Declares `symbol` in this unit, located at `node` unless it already has locations.
    pub(crate) fn declare(&mut self, node: Option<NodeId>, mut symbol: Symbol) -> SymbolId {
        if symbol.locations.is_empty() {
            if let Some(span) = node.and_then(|n| self.builder.span(n)) {
                symbol.locations.push(span);
            }
        }
        self.semantic.declare(symbol, node)
    }

    /// Adds a symbol declared elsewhere (e.g., in a referenced library).
    pub(crate) fn external(&mut self, symbol: Symbol) -> SymbolId {
        self.semantic.add_symbol(symbol)
    }

    pub(crate) fn bind(&mut self, node: NodeId, symbol: SymbolId) {
        self.semantic.bind_reference(node, symbol);
    }

    pub(crate) fn bind_type(&mut self, node: NodeId, ty: TypeDescriptor) {
        self.semantic.bind_type(node, ty);
    }

    /// Emits a method declaring `symbol` whose block body is written by `body`.
    pub(crate) fn method<F, R>(&mut self, symbol: Symbol, body: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let decl = self.open_named(SyntaxKind::MethodDeclaration, &symbol.name);
        self.open(SyntaxKind::Block);
        let out = body(self);
        self.close();
        self.close();
        self.declare(Some(decl), symbol);
        out
    }

    /// Emits `expr;` where the expression is written by `expr`.
    pub(crate) fn statement<F>(&mut self, expr: F) -> NodeId
    where
        F: FnOnce(&mut Self) -> NodeId,
    {
        self.open(SyntaxKind::ExpressionStatement);
        let out = expr(self);
        self.close();
        out
    }

    /// Emits `name()` resolved to `target`.
    pub(crate) fn call(&mut self, name: &str, target: Option<SymbolId>) -> NodeId {
        let call = self.open_call(name, target);
        self.close_call();
        call
    }

    /// Opens `name(` resolved to `target`; emit arguments, then [`Fixture::close_call`].
    pub(crate) fn open_call(&mut self, name: &str, target: Option<SymbolId>) -> NodeId {
        let call = self.open(SyntaxKind::InvocationExpression);
        self.leaf(SyntaxKind::IdentifierName, Some(name));
        self.open(SyntaxKind::ArgumentList);
        if let Some(target) = target {
            self.bind(call, target);
        }
        call
    }

    pub(crate) fn close_call(&mut self) {
        self.close();
        self.close();
    }

    /// Opens `receiver.member(` where the receiver is emitted by `receiver`.
    pub(crate) fn chained_call<F>(&mut self, member: &str, target: Option<SymbolId>, receiver: F) -> NodeId
    where
        F: FnOnce(&mut Self) -> NodeId,
    {
        let call = self.open(SyntaxKind::InvocationExpression);
        self.open(SyntaxKind::MemberAccessExpression);
        receiver(self);
        self.leaf(SyntaxKind::IdentifierName, Some(member));
        self.close();
        self.leaf(SyntaxKind::ArgumentList, None);
        self.close();
        if let Some(target) = target {
            self.bind(call, target);
        }
        call
    }

    pub(crate) fn finish(mut self) -> CompilationUnit {
        self.builder.finish_node();
        let tree = self.builder.build().expect("fixture tree must be valid");
        let mut unit = CompilationUnit::new(tree, self.semantic);
        unit.path = self.path.map(Into::into);
        unit.project_root = self.project_root.map(Into::into);
        unit
    }
}

/// Runs a single rule through the engine over one unit.
pub(crate) fn check<R: Rule + 'static>(rule: R, unit: CompilationUnit) -> Vec<Diagnostic> {
    let engine = Engine::builder().rule(rule).build().expect("engine");
    engine
        .run(&SourceModel::new().with_unit(unit))
        .expect("run")
        .diagnostics
}
