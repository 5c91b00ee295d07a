//! Ruby-specific tree-sitter parsing logic.
//!
//! Converts a tree-sitter-ruby tree into [`SyntaxNode`]s. Two grammar quirks
//! are smoothed over here:
//! - bare keyword arguments (`get :show, id: 1`) are loose `pair` children of
//!   the argument list; consecutive pairs are grouped into one brace-less hash;
//! - comments are extras and may appear anywhere; they are dropped.

use super::{CallShape, NodeKind, SyntaxNode};
use crate::document::SourceRange;
use crate::error::{ConverterError, Result};
use std::path::PathBuf;
use tree_sitter::Node;

/// Parse Ruby source into an adapted syntax tree.
///
/// Returns `ConverterError::Parse` when tree-sitter reports any error or
/// missing node; such files must be left untouched.
pub fn parse(source: &str) -> Result<SyntaxNode> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&tree_sitter_ruby::language())?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ConverterError::Parse {
            file: PathBuf::from("<string>"),
            message: "Parse failed - no tree returned".to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(ConverterError::Parse {
            file: PathBuf::from("<string>"),
            message: format!("syntax error near line {}", line),
        });
    }

    Ok(convert(root, source.as_bytes()))
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error_line)
}

fn range_of(node: Node) -> SourceRange {
    SourceRange::new(
        node.start_byte(),
        node.end_byte(),
        node.start_position().row + 1,
    )
}

fn text_of<'s>(node: Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

fn convert(node: Node, source: &[u8]) -> SyntaxNode {
    let range = range_of(node);
    match node.kind() {
        "call" => convert_call(node, source),
        "hash" => SyntaxNode::new(
            NodeKind::Hash { braced: true },
            range,
            convert_children(node, source),
        ),
        "pair" => SyntaxNode::new(NodeKind::Pair, range, convert_pair(node, source)),
        "simple_symbol" => {
            let name = text_of(node, source).trim_start_matches(':');
            SyntaxNode::new(NodeKind::Symbol(name.to_string()), range, Vec::new())
        }
        "hash_key_symbol" => SyntaxNode::new(
            NodeKind::Symbol(text_of(node, source).to_string()),
            range,
            Vec::new(),
        ),
        "string" => SyntaxNode::new(
            NodeKind::Str(literal_content(node, source)),
            range,
            convert_children(node, source),
        ),
        "nil" => SyntaxNode::new(NodeKind::Nil, range, Vec::new()),
        "hash_splat_argument" => SyntaxNode::new(
            NodeKind::KeywordSplat,
            range,
            convert_children(node, source),
        ),
        kind => SyntaxNode::new(NodeKind::Other(kind), range, convert_children(node, source)),
    }
}

fn convert_children(node: Node, source: &[u8]) -> Vec<SyntaxNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| convert(child, source))
        .collect()
}

fn convert_pair(node: Node, source: &[u8]) -> Vec<SyntaxNode> {
    let key = node.child_by_field_name("key");
    let value = node.child_by_field_name("value");
    match (key, value) {
        (Some(key), Some(value)) => vec![convert(key, source), convert(value, source)],
        // Shorthand `{ id: }` has no value node.
        (Some(key), None) => vec![convert(key, source)],
        _ => convert_children(node, source),
    }
}

fn convert_call(node: Node, source: &[u8]) -> SyntaxNode {
    let receiver = node.child_by_field_name("receiver");
    let method = node
        .child_by_field_name("method")
        .map(|m| text_of(m, source).to_string())
        .unwrap_or_default();
    let block = node.child_by_field_name("block");

    let mut children = Vec::new();
    if let Some(receiver) = receiver {
        children.push(convert(receiver, source));
    }

    let arguments = node
        .child_by_field_name("arguments")
        .map(|list| convert_arguments(list, source))
        .unwrap_or_default();
    let argument_count = arguments.len();
    children.extend(arguments);

    if let Some(block) = block {
        children.push(convert(block, source));
    }

    SyntaxNode::new(
        NodeKind::Call(CallShape {
            method,
            has_receiver: receiver.is_some(),
            argument_count,
            has_block: block.is_some(),
        }),
        range_of(node),
        children,
    )
}

/// Convert an `argument_list`, folding each run of loose pairs and `**splat`s
/// into a single brace-less hash.
fn convert_arguments(list: Node, source: &[u8]) -> Vec<SyntaxNode> {
    let mut arguments = Vec::new();
    let mut pending: Vec<SyntaxNode> = Vec::new();

    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "comment" => continue,
            "pair" | "hash_splat_argument" => pending.push(convert(child, source)),
            _ => {
                flush_bare_hash(&mut pending, &mut arguments);
                arguments.push(convert(child, source));
            }
        }
    }
    flush_bare_hash(&mut pending, &mut arguments);

    arguments
}

fn flush_bare_hash(pending: &mut Vec<SyntaxNode>, arguments: &mut Vec<SyntaxNode>) {
    let (Some(first), Some(last)) = (pending.first(), pending.last()) else {
        return;
    };
    let range = SourceRange::new(first.range.start, last.range.end, first.range.line);
    let entries = std::mem::take(pending);
    arguments.push(SyntaxNode::new(
        NodeKind::Hash { braced: false },
        range,
        entries,
    ));
}

/// Literal text of a string node, or `None` when it interpolates or escapes.
fn literal_content(node: Node, source: &[u8]) -> Option<String> {
    let mut content = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "string_content" => content.push_str(text_of(child, source)),
            _ => return None,
        }
    }
    Some(content)
}
