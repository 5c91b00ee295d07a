//! Syntax tree consumed by the rewrite engine.
//!
//! The engine only needs a node kind, ordered children and a byte range per
//! node. [`ruby`] builds this tree from tree-sitter-ruby; nothing else in the
//! crate touches tree-sitter types.

pub mod ruby;

use crate::document::{Document, SourceRange};

pub use ruby::parse;

/// Shape of a method call node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallShape {
    /// Method name as written (`get`, `post`, `expect`, ...).
    pub method: String,
    /// Whether the call has an explicit receiver (`foo.get`).
    pub has_receiver: bool,
    /// Number of arguments, after grouping bare keyword pairs into one hash.
    pub argument_count: usize,
    /// Whether a `do ... end` or `{ ... }` block is attached.
    pub has_block: bool,
}

/// Closed set of node kinds the engine distinguishes.
///
/// Everything the rewriter does not reason about is `Other`, carrying the
/// grammar's kind name for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Method call. Children are `[receiver?] ++ arguments ++ [block?]`.
    Call(CallShape),
    /// Hash literal. Brace-less hashes are trailing keyword arguments.
    Hash {
        /// Whether the literal is written with `{` and `}`.
        braced: bool,
    },
    /// `key => value` or `key: value`. Children are `[key, value]`.
    Pair,
    /// Plain symbol; the name has no leading colon.
    Symbol(String),
    /// String literal; content is `None` when it interpolates or escapes.
    Str(Option<String>),
    /// `nil`.
    Nil,
    /// `**expr` inside a hash or argument list.
    KeywordSplat,
    /// Any other grammar node.
    Other(&'static str),
}

/// A node of the adapted syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// What the node is.
    pub kind: NodeKind,
    /// Source span; contains every child's span.
    pub range: SourceRange,
    /// Children in source order.
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a node.
    pub fn new(kind: NodeKind, range: SourceRange, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            range,
            children,
        }
    }

    /// Call shape when this node is a call.
    pub fn as_call(&self) -> Option<&CallShape> {
        match &self.kind {
            NodeKind::Call(shape) => Some(shape),
            _ => None,
        }
    }

    /// Arguments of a call; empty for every other node.
    pub fn arguments(&self) -> &[SyntaxNode] {
        match &self.kind {
            NodeKind::Call(shape) => {
                let start = usize::from(shape.has_receiver);
                let end = (start + shape.argument_count).min(self.children.len());
                &self.children[start..end]
            }
            _ => &[],
        }
    }

    /// Whether this node is a hash literal, braced or not.
    pub fn is_hash(&self) -> bool {
        matches!(self.kind, NodeKind::Hash { .. })
    }

    /// Whether this node is `nil`.
    pub fn is_nil(&self) -> bool {
        self.kind == NodeKind::Nil
    }

    /// Symbol key of a pair. `None` for string, dynamic or splat keys.
    pub fn symbol_key(&self) -> Option<&str> {
        if self.kind != NodeKind::Pair {
            return None;
        }
        match &self.children.first()?.kind {
            NodeKind::Symbol(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Value of a pair.
    pub fn pair_value(&self) -> Option<&SyntaxNode> {
        if self.kind != NodeKind::Pair {
            return None;
        }
        self.children.get(1)
    }

    /// Original source text of this node.
    ///
    /// This is the engine's "unparse": reusing the bytes as written keeps
    /// comments and formatting inside arguments intact.
    pub fn text<'d>(&self, doc: &'d Document) -> &'d str {
        doc.slice(self.range)
    }

    /// True when this node or any descendant satisfies `pred`.
    pub fn any(&self, pred: &dyn Fn(&SyntaxNode) -> bool) -> bool {
        pred(self) || self.children.iter().any(|child| child.any(pred))
    }
}
