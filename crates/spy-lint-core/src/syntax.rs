//! Immutable syntax tree supplied by the source frontend.
//!
//! Nodes live in an arena owned by [`SyntaxTree`]. Parent links are plain
//! indices used for upward navigation only; ownership flows from the root
//! down. Once a tree has been built (or deserialized and validated) it is
//! never mutated, which makes it safe to share across worker threads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxKind {
    /// Root of a file.
    CompilationUnit,
    /// `namespace A.B { ... }`
    NamespaceDeclaration,
    /// `namespace A.B;`
    FileScopedNamespaceDeclaration,
    /// Dotted or simple name, e.g. the name of a namespace declaration.
    Name,
    /// `class Foo`
    ClassDeclaration,
    /// `struct Foo`
    StructDeclaration,
    /// `interface IFoo`
    InterfaceDeclaration,
    /// `enum Foo`
    EnumDeclaration,
    /// `record Foo`
    RecordDeclaration,
    /// Method member.
    MethodDeclaration,
    /// Constructor member.
    ConstructorDeclaration,
    /// Property member.
    PropertyDeclaration,
    /// Property or event accessor (`get`, `set`, ...).
    AccessorDeclaration,
    /// Field member; children are a [`SyntaxKind::VariableDeclaration`].
    FieldDeclaration,
    /// Parameter of a method, local function or lambda.
    Parameter,
    /// Function declared inside a method body.
    LocalFunctionStatement,
    /// `x => ...` or `(x, y) => { ... }`
    LambdaExpression,
    /// `delegate (...) { ... }`
    AnonymousMethodExpression,
    /// `{ ... }`
    Block,
    /// Statement wrapping a single expression.
    ExpressionStatement,
    /// `return expr;`
    ReturnStatement,
    /// `=> expr` body of a method, local function or accessor.
    ArrowExpressionClause,
    /// Local declaration statement; child is a [`SyntaxKind::VariableDeclaration`].
    LocalDeclarationStatement,
    /// Declared type followed by one or more declarators.
    VariableDeclaration,
    /// Single declared variable; may own an [`SyntaxKind::EqualsValueClause`].
    VariableDeclarator,
    /// `= initializer`
    EqualsValueClause,
    /// Type syntax (`Task`, `var`, `List<int>`).
    Type,
    /// Call expression; children are the callee expression and an argument list.
    InvocationExpression,
    /// `new T(...)`; children are the type and an argument list.
    ObjectCreationExpression,
    /// `receiver.Member`; children are the receiver and the member name.
    MemberAccessExpression,
    /// `await operand`
    AwaitExpression,
    /// `(expr)`
    ParenthesizedExpression,
    /// Argument list of a call.
    ArgumentList,
    /// Single argument; child is the argument expression.
    Argument,
    /// Identifier reference.
    IdentifierName,
    /// Assignment expression.
    AssignmentExpression,
    /// Literal value.
    Literal,
    /// Any construct the rule set never inspects.
    Other,
}

impl SyntaxKind {
    /// Returns true for top-level-capable type declarations.
    #[must_use]
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDeclaration
                | Self::StructDeclaration
                | Self::InterfaceDeclaration
                | Self::EnumDeclaration
                | Self::RecordDeclaration
        )
    }

    /// Returns true for both namespace declaration forms.
    #[must_use]
    pub fn is_namespace_declaration(self) -> bool {
        matches!(
            self,
            Self::NamespaceDeclaration | Self::FileScopedNamespaceDeclaration
        )
    }

    /// Returns true for declarations that own an executable body.
    #[must_use]
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::MethodDeclaration
                | Self::ConstructorDeclaration
                | Self::AccessorDeclaration
                | Self::LocalFunctionStatement
                | Self::LambdaExpression
                | Self::AnonymousMethodExpression
        )
    }
}

/// Source span of a node or token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    /// Byte offset from the start of the file.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl TextSpan {
    /// Creates a new span.
    #[must_use]
    pub fn new(offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            length,
            line,
            column,
        }
    }
}

/// Identifier token attached to a name-bearing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token text.
    pub text: String,
    /// Token location.
    pub span: TextSpan,
}

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Structural category.
    pub kind: SyntaxKind,
    /// Full span of the node.
    pub span: TextSpan,
    /// Parent node; `None` only for the root.
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Children in source order.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Name token for declarations, names and identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Token>,
}

/// Errors detected while validating a tree's links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The tree contains no nodes.
    #[error("syntax tree is empty")]
    Empty,

    /// A link points outside the arena.
    #[error("node {node} links to missing node {target}")]
    DanglingLink {
        /// Node holding the link.
        node: u32,
        /// Missing target index.
        target: u32,
    },

    /// A child does not point back to its parent.
    #[error("node {child} is listed under {parent} but its parent link is {actual:?}")]
    ParentMismatch {
        /// Parent listing the child.
        parent: u32,
        /// Child whose parent link disagrees.
        child: u32,
        /// The parent link actually stored on the child.
        actual: Option<u32>,
    },

    /// The root node has a parent.
    #[error("root node {0} must not have a parent")]
    RootHasParent(u32),

    /// The builder finished with a node still open.
    #[error("node {0} was never finished")]
    Unclosed(u32),

    /// A node was opened after the root had been closed.
    #[error("node {0} was opened after the root was finished")]
    SecondRoot(u32),

    /// A builder operation needed an open node but none was open.
    #[error("{0} called with no open node")]
    NoOpenNode(&'static str),
}

#[derive(Deserialize)]
struct RawTree {
    root: NodeId,
    nodes: Vec<SyntaxNode>,
}

/// Immutable syntax tree of one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct SyntaxTree {
    root: NodeId,
    nodes: Vec<SyntaxNode>,
}

impl TryFrom<RawTree> for SyntaxTree {
    type Error = TreeError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        let tree = Self {
            root: raw.root,
            nodes: raw.nodes,
        };
        tree.validate()?;
        Ok(tree)
    }
}

impl SyntaxTree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    /// Returns a handle for `id`, or `None` if it is out of range.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes in pre-order (source order) starting at the root.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.root().descendants()
    }

    fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Checks that all links are in range and mutually consistent.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), TreeError> {
        let len = self.nodes.len();
        if len == 0 {
            return Err(TreeError::Empty);
        }
        if self.root.index() >= len {
            return Err(TreeError::DanglingLink {
                node: self.root.0,
                target: self.root.0,
            });
        }
        if self.node(self.root).parent.is_some() {
            return Err(TreeError::RootHasParent(self.root.0));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let this = NodeId(u32::try_from(index).unwrap_or(u32::MAX));
            if let Some(parent) = node.parent {
                if parent.index() >= len {
                    return Err(TreeError::DanglingLink {
                        node: this.0,
                        target: parent.0,
                    });
                }
            }
            for &child in &node.children {
                if child.index() >= len {
                    return Err(TreeError::DanglingLink {
                        node: this.0,
                        target: child.0,
                    });
                }
                let actual = self.node(child).parent;
                if actual != Some(this) {
                    return Err(TreeError::ParentMismatch {
                        parent: this.0,
                        child: child.0,
                        actual: actual.map(|p| p.0),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Borrowed navigation handle into a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    /// Arena index of this node.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Tree this node belongs to.
    #[must_use]
    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    fn data(self) -> &'a SyntaxNode {
        self.tree.node(self.id)
    }

    /// Structural category.
    #[must_use]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    /// Full span.
    #[must_use]
    pub fn span(self) -> TextSpan {
        self.data().span
    }

    /// Name token, if the node carries one.
    #[must_use]
    pub fn name(self) -> Option<&'a Token> {
        self.data().name.as_ref()
    }

    /// Name text, if the node carries a name token.
    #[must_use]
    pub fn name_text(self) -> Option<&'a str> {
        self.name().map(|t| t.text.as_str())
    }

    /// Span of the name token, falling back to the node span.
    #[must_use]
    pub fn name_span(self) -> TextSpan {
        self.name().map_or_else(|| self.span(), |t| t.span)
    }

    /// Parent node.
    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    /// Children in source order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + ExactSizeIterator {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// First child, if any.
    #[must_use]
    pub fn first_child(self) -> Option<NodeRef<'a>> {
        self.children().next()
    }

    /// First child of the given kind.
    #[must_use]
    pub fn child_of_kind(self, kind: SyntaxKind) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// This node and all nodes below it, in pre-order.
    pub fn descendants(self) -> impl Iterator<Item = NodeRef<'a>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().rev());
            Some(node)
        })
    }

    /// Position of this node among its parent's children.
    #[must_use]
    pub fn index_in_parent(self) -> Option<usize> {
        self.parent()?.children().position(|c| c == self)
    }
}

/// Incremental builder for [`SyntaxTree`].
///
/// Nodes are opened with [`TreeBuilder::start_node`] and closed with
/// [`TreeBuilder::finish_node`]; the first node opened becomes the root.
/// Spans default to a synthetic per-node location (one line per node) so
/// that hand-built trees still produce distinct diagnostic locations.
///
/// Misuse (a second root, closing or naming with nothing open) is recorded
/// and reported by [`TreeBuilder::build`]; only the first error is kept.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
    stack: Vec<NodeId>,
    error: Option<TreeError>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a node with a synthetic span.
    pub fn start_node(&mut self, kind: SyntaxKind) -> NodeId {
        let line = self.nodes.len() + 1;
        self.start_node_at(kind, TextSpan::new(self.nodes.len(), 1, line, 1))
    }

    /// Opens a node with an explicit span.
    ///
    /// Opening a node after the root was finished records
    /// [`TreeError::SecondRoot`].
    pub fn start_node_at(&mut self, kind: SyntaxKind, span: TextSpan) -> NodeId {
        let parent = self.stack.last().copied();
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        if parent.is_none() && !self.nodes.is_empty() {
            self.fail(TreeError::SecondRoot(id.0));
        }
        self.nodes.push(SyntaxNode {
            kind,
            span,
            parent,
            children: Vec::new(),
            name: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        self.stack.push(id);
        id
    }

    /// Attaches a name token to the currently open node.
    ///
    /// Records [`TreeError::NoOpenNode`] if no node is open.
    pub fn name(&mut self, text: impl Into<String>) -> &mut Self {
        let Some(&current) = self.stack.last() else {
            self.fail(TreeError::NoOpenNode("name()"));
            return self;
        };
        let span = self.nodes[current.index()].span;
        self.nodes[current.index()].name = Some(Token {
            text: text.into(),
            span,
        });
        self
    }

    /// Closes the currently open node and returns its id.
    ///
    /// Records [`TreeError::NoOpenNode`] if no node is open; the root id is
    /// returned in that case.
    pub fn finish_node(&mut self) -> NodeId {
        self.stack.pop().unwrap_or_else(|| {
            self.fail(TreeError::NoOpenNode("finish_node()"));
            NodeId(0)
        })
    }

    fn fail(&mut self, error: TreeError) {
        self.error.get_or_insert(error);
    }

    /// Span assigned to an already opened node.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Option<TextSpan> {
        self.nodes.get(id.index()).map(|n| n.span)
    }

    /// Opens and immediately closes a leaf node.
    pub fn leaf(&mut self, kind: SyntaxKind, name: Option<&str>) -> NodeId {
        self.start_node(kind);
        if let Some(name) = name {
            self.name(name);
        }
        self.finish_node()
    }

    /// Finishes the tree.
    ///
    /// # Errors
    ///
    /// Returns the first recorded misuse, or an error if nodes are still
    /// open or the tree is invalid.
    pub fn build(self) -> Result<SyntaxTree, TreeError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(&open) = self.stack.last() {
            return Err(TreeError::Unclosed(open.0));
        }
        let tree = SyntaxTree {
            root: NodeId(0),
            nodes: self.nodes,
        };
        tree.validate()?;
        Ok(tree)
    }
}
