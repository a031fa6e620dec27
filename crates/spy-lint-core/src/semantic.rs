//! Resolved symbols and types for one compilation unit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::syntax::{NodeId, TextSpan};

/// Fully-qualified name of the framework's asynchronous-result type.
pub const DEFAULT_ASYNC_RESULT_TYPE: &str = "System.Threading.Tasks.Task";

/// Kind of a resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    /// Namespace.
    Namespace,
    /// Class, struct, interface, enum, record or delegate.
    Type,
    /// Method, constructor, operator, accessor, local function or lambda.
    Method,
    /// Field.
    Field,
    /// Property.
    Property,
    /// Method or lambda parameter.
    Parameter,
    /// Local variable.
    Local,
}

/// Flavor of a method symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodKind {
    /// User-declared ordinary method.
    #[default]
    Ordinary,
    /// Instance or static constructor.
    Constructor,
    /// Finalizer.
    Destructor,
    /// User-defined operator or conversion.
    Operator,
    /// Property or event accessor.
    Accessor,
    /// Function declared in a method body.
    LocalFunction,
    /// Lambda or anonymous method.
    AnonymousFunction,
}

/// Identifies a type by fully-qualified name and type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified name of the type definition, without arguments.
    pub name: String,
    /// Type arguments of a generic instantiation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Creates a non-generic type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    /// Creates a generic instantiation.
    #[must_use]
    pub fn generic(name: impl Into<String>, type_arguments: Vec<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_arguments,
        }
    }

    /// Returns true for generic instantiations.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// Short name (last dotted segment).
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Returns true if the type definition is one of `recognized`, generic or not.
    #[must_use]
    pub fn is_async_result(&self, recognized: &AsyncResultTypes) -> bool {
        recognized.contains(&self.name)
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_generic() {
            write!(f, "<")?;
            for (i, arg) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Set of type definitions treated as asynchronous results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncResultTypes {
    names: Vec<String>,
}

impl Default for AsyncResultTypes {
    fn default() -> Self {
        Self {
            names: vec![DEFAULT_ASYNC_RESULT_TYPE.to_string()],
        }
    }
}

impl AsyncResultTypes {
    /// Adds further fully-qualified type names to the default set.
    #[must_use]
    pub fn with_additional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.names.contains(&name) {
                self.names.push(name);
            }
        }
        self
    }

    /// Returns true if `name` is recognized.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Recognized names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Parameter of a method signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Signature data carried by method symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Flavor of the method.
    #[serde(default)]
    pub method_kind: MethodKind,
    /// Whether the body uses suspension-based execution.
    #[serde(default)]
    pub is_async: bool,
    /// Declared return type.
    pub return_type: TypeDescriptor,
    /// Ordered parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl MethodSignature {
    /// Creates an ordinary, non-async signature.
    #[must_use]
    pub fn new(return_type: TypeDescriptor) -> Self {
        Self {
            method_kind: MethodKind::Ordinary,
            is_async: false,
            return_type,
            parameters: Vec::new(),
        }
    }

    /// Sets the method kind.
    #[must_use]
    pub fn kind(mut self, method_kind: MethodKind) -> Self {
        self.method_kind = method_kind;
        self
    }

    /// Marks the method as async.
    #[must_use]
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }
}

/// Index of a symbol inside its [`SemanticModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

/// A resolved named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name as declared.
    pub name: String,
    /// Kind of entity.
    pub kind: SymbolKind,
    /// Declaring locations; empty for synthesized symbols.
    #[serde(default)]
    pub locations: Vec<TextSpan>,
    /// Simple name of the containing type, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,
    /// Fully-qualified containing namespace, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_namespace: Option<String>,
    /// True for compiler-synthesized symbols.
    #[serde(default)]
    pub implicitly_declared: bool,
    /// Signature, for method symbols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodSignature>,
}

impl Symbol {
    /// Creates a symbol with no locations or containers.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            locations: Vec::new(),
            containing_type: None,
            containing_namespace: None,
            implicitly_declared: false,
            method: None,
        }
    }

    /// Creates a method symbol.
    #[must_use]
    pub fn method(name: impl Into<String>, signature: MethodSignature) -> Self {
        let mut symbol = Self::new(name, SymbolKind::Method);
        symbol.method = Some(signature);
        symbol
    }

    /// Adds a declaring location.
    #[must_use]
    pub fn at(mut self, span: TextSpan) -> Self {
        self.locations.push(span);
        self
    }

    /// Sets the containing type.
    #[must_use]
    pub fn in_type(mut self, name: impl Into<String>) -> Self {
        self.containing_type = Some(name.into());
        self
    }

    /// Marks the symbol as compiler-synthesized.
    #[must_use]
    pub fn implicit(mut self) -> Self {
        self.implicitly_declared = true;
        self
    }

    /// First declaring location.
    #[must_use]
    pub fn primary_location(&self) -> Option<TextSpan> {
        self.locations.first().copied()
    }

    /// Return type, for method symbols.
    #[must_use]
    pub fn return_type(&self) -> Option<&TypeDescriptor> {
        self.method.as_ref().map(|m| &m.return_type)
    }

    /// `ContainingType.Name`, or just the name when no containing type is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.containing_type {
            Some(ty) => format!("{ty}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Symbol and type information resolved for one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticModel {
    #[serde(default)]
    symbols: Vec<Symbol>,
    /// Symbols declared by this unit, including synthesized ones.
    #[serde(default)]
    declared: Vec<SymbolId>,
    /// Declaration node → declared symbol.
    #[serde(default)]
    declarations: HashMap<NodeId, SymbolId>,
    /// Reference or invocation node → resolved symbol.
    #[serde(default)]
    references: HashMap<NodeId, SymbolId>,
    /// Type syntax node → resolved type.
    #[serde(default)]
    types: HashMap<NodeId, TypeDescriptor>,
}

impl SemanticModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol without binding it to this unit's declarations.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        self.symbols.push(symbol);
        id
    }

    /// Adds a symbol declared by this unit, optionally bound to its declaration node.
    pub fn declare(&mut self, symbol: Symbol, node: Option<NodeId>) -> SymbolId {
        let id = self.add_symbol(symbol);
        self.declared.push(id);
        if let Some(node) = node {
            self.declarations.insert(node, id);
        }
        id
    }

    /// Records that `node` refers to (or invokes) `symbol`.
    pub fn bind_reference(&mut self, node: NodeId, symbol: SymbolId) {
        self.references.insert(node, symbol);
    }

    /// Records the resolved type of a type syntax node.
    pub fn bind_type(&mut self, node: NodeId, ty: TypeDescriptor) {
        self.types.insert(node, ty);
    }

    /// Looks up a symbol.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Symbol declared by a declaration node.
    #[must_use]
    pub fn declared_symbol(&self, node: NodeId) -> Option<&Symbol> {
        self.declarations
            .get(&node)
            .and_then(|&id| self.symbol(id))
    }

    /// Symbol a reference or invocation node resolves to.
    #[must_use]
    pub fn referenced_symbol(&self, node: NodeId) -> Option<&Symbol> {
        self.references.get(&node).and_then(|&id| self.symbol(id))
    }

    /// Resolved type of a type syntax node.
    #[must_use]
    pub fn type_of(&self, node: NodeId) -> Option<&TypeDescriptor> {
        self.types.get(&node)
    }

    /// Symbols declared by this unit, in declaration order.
    pub fn declared_symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.declared
            .iter()
            .filter_map(|&id| self.symbol(id).map(|s| (id, s)))
    }
}
