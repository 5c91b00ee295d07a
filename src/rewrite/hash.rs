//! Hash argument reconstruction.
//!
//! Turns a positional hash into a keyword argument while reusing the hash's
//! source text as written. Only the outermost braces are ever added or
//! re-spaced; nested hashes, comments and key order are untouched.

use super::skip::SkipReason;
use crate::document::Document;
use crate::options::{HashSpacing, StyleOptions};
use crate::syntax::{NodeKind, SyntaxNode};
use once_cell::sync::Lazy;
use regex::Regex;

static CONTROLLER_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+#\w+$").expect("valid controller#action pattern"));

/// Keys that make a hash a route definition rather than request params.
const ROUTE_KEYS: [&str; 2] = ["controller", "to"];

/// Decides whether a params hash needs rewriting and produces its keyword form.
pub struct HashRewriter<'a> {
    doc: &'a Document,
    hash: &'a SyntaxNode,
    style: &'a StyleOptions,
    original_indent: &'a str,
}

impl<'a> HashRewriter<'a> {
    /// Create a rewriter for `hash`, which must be a hash node.
    pub fn new(
        doc: &'a Document,
        hash: &'a SyntaxNode,
        style: &'a StyleOptions,
        original_indent: &'a str,
    ) -> Self {
        Self {
            doc,
            hash,
            style,
            original_indent,
        }
    }

    /// Why the hash must stay positional, if it must.
    pub fn decline_reason(&self) -> Option<SkipReason> {
        if looks_like_route_definition(self.hash) {
            return Some(SkipReason::RouteDefinition);
        }
        if has_key(self.hash, "params") {
            return Some(SkipReason::HasParamsKey);
        }
        None
    }

    /// `params: { ... }` built from the original hash text.
    pub fn rewritten(&self) -> String {
        keyword_form(self.doc, self.hash, "params", self.style, self.original_indent)
    }
}

/// Whether the hash is routing configuration.
///
/// Either its keys are exactly `to` and `controller`, or it maps `to` to a
/// `'controller#action'` string.
pub fn looks_like_route_definition(hash: &SyntaxNode) -> bool {
    let keys: Option<Vec<&str>> = hash.children.iter().map(SyntaxNode::symbol_key).collect();
    if let Some(mut keys) = keys {
        keys.sort_unstable();
        if keys == ROUTE_KEYS {
            return true;
        }
    }

    hash.children.iter().any(|pair| {
        pair.symbol_key() == Some("to")
            && matches!(
                pair.pair_value().map(|value| &value.kind),
                Some(NodeKind::Str(Some(target))) if CONTROLLER_ACTION.is_match(target)
            )
    })
}

/// Whether any pair in the hash has the symbol key `key`.
pub fn has_key(hash: &SyntaxNode, key: &str) -> bool {
    hash.children
        .iter()
        .any(|pair| pair.symbol_key() == Some(key))
}

/// `key: <value>` where hash values get braces per `style`.
pub fn keyword_form(
    doc: &Document,
    node: &SyntaxNode,
    key: &str,
    style: &StyleOptions,
    original_indent: &str,
) -> String {
    let value = match node.kind {
        NodeKind::Hash { braced: true } => respace_braces(node.text(doc), style.hash_spacing),
        NodeKind::Hash { braced: false } => add_braces(node.text(doc), style, original_indent),
        _ => node.text(doc).to_string(),
    };
    format!("{}: {}", key, value)
}

fn add_braces(entries: &str, style: &StyleOptions, original_indent: &str) -> String {
    if entries.contains('\n') {
        return format!(
            "{{\n{}{}{}\n{}}}",
            original_indent, style.indent_unit, entries, original_indent
        );
    }
    match style.hash_spacing {
        HashSpacing::Never => format!("{{{}}}", entries),
        HashSpacing::Always | HashSpacing::Preserve => format!("{{ {} }}", entries),
    }
}

fn respace_braces(literal: &str, spacing: HashSpacing) -> String {
    let inner = literal
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'));
    let inner = match inner {
        Some(inner) if !literal.contains('\n') => inner.trim(),
        _ => return literal.to_string(),
    };
    if inner.is_empty() {
        return "{}".to_string();
    }
    match spacing {
        HashSpacing::Always => format!("{{ {} }}", inner),
        HashSpacing::Never => format!("{{{}}}", inner),
        HashSpacing::Preserve => literal.to_string(),
    }
}
