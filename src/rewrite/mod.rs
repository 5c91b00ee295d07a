//! Call-site rewriter.
//!
//! Walks the syntax tree in document order, matches unqualified HTTP verb
//! calls with positional arguments after the action, and replaces each one
//! that needs migrating with a compatibility shim holding both the keyword
//! form and the original call.
//!
//! Every generated call reuses the original text of its arguments; only the
//! keyword names, added braces and the shim itself are synthesized.

pub mod hash;
pub mod shim;
pub mod skip;

use crate::context::{classify, TestContext};
use crate::document::{Document, SourceRange};
use crate::options::Options;
use crate::patch::{Edit, EditSet};
use crate::syntax::{self, NodeKind, SyntaxNode};
use once_cell::unsync::OnceCell;

pub use hash::HashRewriter;
pub use shim::compatibility_shim;
pub use skip::{GuardInput, SkipReason};

/// Request helpers whose positional arguments are migrated.
pub const HTTP_VERBS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

/// Grammar kinds that can never become a keyword argument value.
const UNSUPPORTED_ARGUMENTS: [&str; 3] = ["splat_argument", "block_argument", "forward_argument"];

/// Outcome for one visited call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteDecision {
    /// Leave the call as written.
    Skip(SkipReason),
    /// Migrate to the given keyword-argument call.
    Rewrite(String),
}

/// A call matching `<verb> <action>, <arg>, ...` with no receiver.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'t> {
    /// The call node.
    pub node: &'t SyntaxNode,
    /// HTTP verb being called.
    pub verb: &'t str,
    /// First argument, the action or path.
    pub action: &'t SyntaxNode,
    /// Remaining positional arguments; never empty.
    pub extra_args: &'t [SyntaxNode],
}

impl<'t> CallSite<'t> {
    /// Match `node` against the call site pattern.
    pub fn match_node(node: &'t SyntaxNode) -> Option<Self> {
        let shape = node.as_call()?;
        if shape.has_receiver || !HTTP_VERBS.contains(&shape.method.as_str()) {
            return None;
        }
        let (action, extra_args) = node.arguments().split_first()?;
        if extra_args.is_empty() {
            return None;
        }
        Some(Self {
            node,
            verb: shape.method.as_str(),
            action,
            extra_args,
        })
    }
}

/// Result of transforming one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// New file text; identical to the input when nothing was rewritten.
    pub content: String,
    /// Call sites replaced by a shim.
    pub rewritten: usize,
    /// Candidate call sites left alone.
    pub skipped: usize,
    /// Parser diagnostic when the file could not be parsed.
    pub parse_error: Option<String>,
}

impl Transformed {
    /// Whether the text differs from the input.
    pub fn changed(&self) -> bool {
        self.rewritten > 0
    }
}

/// Rewrites the call sites of one file.
pub struct TextTransformer<'o> {
    document: Document,
    options: &'o Options,
    context: OnceCell<TestContext>,
}

impl<'o> TextTransformer<'o> {
    /// Prepare a transformer over `content`.
    pub fn new(content: impl Into<String>, options: &'o Options) -> Self {
        Self {
            document: Document::new(content),
            options,
            context: OnceCell::new(),
        }
    }

    /// The file's test dialect, classified on first use.
    pub fn test_context(&self) -> TestContext {
        *self
            .context
            .get_or_init(|| classify(self.document.text(), self.options))
    }

    /// Rewrite every call site that needs it.
    ///
    /// Unparsable input comes back unchanged with `parse_error` set.
    pub fn transform(&self) -> Transformed {
        let root = match syntax::parse(self.document.text()) {
            Ok(root) => root,
            Err(err) => {
                log::debug!("leaving unparsable content untouched: {}", err);
                return Transformed {
                    content: self.document.text().to_string(),
                    rewritten: 0,
                    skipped: 0,
                    parse_error: Some(err.to_string()),
                };
            }
        };

        let mut edits = EditSet::new();
        let mut skipped = 0;
        self.visit(&root, &mut edits, &mut skipped);

        if edits.is_empty() {
            return Transformed {
                content: self.document.text().to_string(),
                rewritten: 0,
                skipped,
                parse_error: None,
            };
        }

        let rewritten = edits.len();
        let content = match edits.apply(self.document.text()) {
            Ok(content) => content,
            Err(err) => {
                // Sites are replaced whole and never descended into, so this
                // only fires on a broken tree; keep the file as it was.
                log::warn!("discarding edits: {}", err);
                return Transformed {
                    content: self.document.text().to_string(),
                    rewritten: 0,
                    skipped: skipped + rewritten,
                    parse_error: None,
                };
            }
        };

        Transformed {
            content,
            rewritten,
            skipped,
            parse_error: None,
        }
    }

    fn visit(&self, node: &SyntaxNode, edits: &mut EditSet, skipped: &mut usize) {
        if let Some(site) = CallSite::match_node(node) {
            match self.decide(&site) {
                RewriteDecision::Rewrite(new_call) => {
                    let doc = &self.document;
                    let line = doc.line_of(node.range.start);
                    let indent = doc.line_indent(line);
                    let shim = compatibility_shim(node.text(doc), &new_call, indent, self.options);
                    log::debug!("line {}: rewriting {}", line, site.verb);
                    let trailing = doc.rest_of_line(node.range.end).trim();
                    if !trailing.is_empty() {
                        log::debug!("line {}: `{}` now follows # ENDTODO", line, trailing);
                    }
                    edits.push(Edit::new(node.range, shim));
                    return;
                }
                RewriteDecision::Skip(reason) => {
                    let line = self.document.line_of(node.range.start);
                    log::debug!("line {}: skipping {}: {}", line, site.verb, reason);
                    *skipped += 1;
                }
            }
        }

        for child in &node.children {
            self.visit(child, edits, skipped);
        }
    }

    /// Decide what to do with one call site.
    pub fn decide(&self, site: &CallSite<'_>) -> RewriteDecision {
        match self.keyword_call(site) {
            Ok(new_call) => RewriteDecision::Rewrite(new_call),
            Err(reason) => RewriteDecision::Skip(reason),
        }
    }

    fn keyword_call(&self, site: &CallSite<'_>) -> Result<String, SkipReason> {
        let doc = &self.document;
        let node = site.node;
        let line = doc.line_of(node.range.start);

        let guard_input = GuardInput {
            previous_line: line.checked_sub(1).and_then(|prev| doc.line(prev)),
            line: doc.line(line).unwrap_or(""),
            call_text: node.text(doc),
        };
        if let Some(reason) = skip::check_guards(&guard_input) {
            return Err(reason);
        }

        if node.as_call().is_some_and(|shape| shape.has_block) {
            return Err(SkipReason::AttachedBlock);
        }
        if node.any(&|n| n.kind == NodeKind::Other("heredoc_beginning")) {
            return Err(SkipReason::Heredoc);
        }
        if let Some(kind) = site.extra_args.iter().find_map(unsupported_kind) {
            return Err(SkipReason::UnsupportedArgument(kind));
        }

        let indent = doc.line_indent(line);
        let style = &self.options.style;
        let (first, rest) = site
            .extra_args
            .split_first()
            .ok_or(SkipReason::UnmappedArguments { extra: 0, slots: 0 })?;

        let params = if first.is_hash() && !first.children.is_empty() {
            let rewriter = HashRewriter::new(doc, first, style, indent);
            if let Some(reason) = rewriter.decline_reason() {
                return Err(reason);
            }
            rewriter.rewritten()
        } else {
            if first.is_nil() {
                if let Some(next) = rest.first() {
                    let nil_span = SourceRange::new(first.range.start, next.range.start, line);
                    log::trace!(
                        "nil params at bytes {}..{} wrapped as an expression",
                        nil_span.start,
                        nil_span.end
                    );
                }
            }
            hash::keyword_form(doc, first, "params", style, indent)
        };

        let mut arguments = vec![params];
        if !rest.is_empty() {
            let keywords = self.test_context().extra_keywords();
            if rest.len() > keywords.len() {
                return Err(SkipReason::UnmappedArguments {
                    extra: rest.len(),
                    slots: keywords.len(),
                });
            }
            for (arg, keyword) in rest.iter().zip(keywords) {
                if is_redundant_default(arg, keyword) {
                    continue;
                }
                arguments.push(hash::keyword_form(doc, arg, keyword, style, indent));
            }
        }

        Ok(format!(
            "{} {}, {}",
            site.verb,
            site.action.text(doc),
            arguments.join(", ")
        ))
    }
}

fn unsupported_kind(arg: &SyntaxNode) -> Option<&'static str> {
    match arg.kind {
        NodeKind::Other(kind) if UNSUPPORTED_ARGUMENTS.contains(&kind) => Some(kind),
        _ => None,
    }
}

/// `headers: {}` says nothing the default does not.
fn is_redundant_default(arg: &SyntaxNode, keyword: &str) -> bool {
    keyword == "headers" && arg.kind == (NodeKind::Hash { braced: true }) && arg.children.is_empty()
}

/// Transform `content` with `options`.
pub fn transform(content: &str, options: &Options) -> Transformed {
    TextTransformer::new(content, options).transform()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Options {
        Options::default().for_file("spec/controllers/users_controller_spec.rb")
    }

    fn request() -> Options {
        Options::default().for_file("spec/requests/users_spec.rb")
    }

    /// The new-branch line of the first shim in `output`.
    fn new_branch(output: &str) -> &str {
        let lines: Vec<&str> = output.lines().collect();
        let at = lines
            .iter()
            .position(|line| line.trim_start().starts_with("if Fave.next_version?"))
            .expect("shim present");
        lines[at + 1].trim()
    }

    #[test]
    fn test_braced_params_hash() {
        let out = transform("get :index, {id: 1}\n", &Options::default());
        assert_eq!(out.rewritten, 1);
        assert_eq!(
            out.content,
            "# TODO: Rails 5 autofix\n\
             if Fave.next_version?\n  \
             get :index, params: {id: 1}\n\
             else\n  \
             get :index, {id: 1}\n\
             end\n\
             # ENDTODO\n"
        );
    }

    #[test]
    fn test_bare_keywords_become_params() {
        let out = transform("get :show, id: 1, format: :json\n", &Options::default());
        assert_eq!(new_branch(&out.content), "get :show, params: { id: 1, format: :json }");
    }

    #[test]
    fn test_empty_hash_keeps_params_only() {
        let out = transform("post :create, {}\n", &Options::default());
        assert_eq!(new_branch(&out.content), "post :create, params: {}");
        assert!(!out.content.contains("headers:"));
    }

    #[test]
    fn test_expression_is_wrapped() {
        let out = transform("put :update, attributes_for(:user)\n", &Options::default());
        assert_eq!(new_branch(&out.content), "put :update, params: attributes_for(:user)");
    }

    #[test]
    fn test_controller_extra_arguments() {
        let out = transform(
            "get :index, {id: 1}, {foo: 'bar'}, {flash: true}\n",
            &controller(),
        );
        assert_eq!(
            new_branch(&out.content),
            "get :index, params: {id: 1}, session: {foo: 'bar'}, flash: {flash: true}"
        );
    }

    #[test]
    fn test_request_extra_argument() {
        let out = transform("get '/x', {id: 1}, {'X-Token' => 'abc'}\n", &request());
        assert_eq!(
            new_branch(&out.content),
            "get '/x', params: {id: 1}, headers: {'X-Token' => 'abc'}"
        );
    }

    #[test]
    fn test_request_empty_headers_dropped() {
        let out = transform("get '/x', {id: 1}, {}\n", &request());
        assert_eq!(new_branch(&out.content), "get '/x', params: {id: 1}");
    }

    #[test]
    fn test_nil_params_with_headers() {
        let out = transform("get '/x', nil, { 'Accept' => 'json' }\n", &request());
        assert_eq!(
            new_branch(&out.content),
            "get '/x', params: nil, headers: { 'Accept' => 'json' }"
        );
    }

    #[test]
    fn test_too_many_arguments_for_context() {
        let out = transform("get :index, {id: 1}, {a: 1}\n", &Options::default());
        assert_eq!(out.rewritten, 0);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.content, "get :index, {id: 1}, {a: 1}\n");
    }

    #[test]
    fn test_context_is_not_classified_without_extra_arguments() {
        let options = controller();
        let transformer = TextTransformer::new("get :index, {id: 1}\n", &options);
        transformer.transform();
        assert!(transformer.context.get().is_none());
        assert_eq!(transformer.test_context(), TestContext::Controller);
    }

    #[test]
    fn test_route_hash_is_skipped() {
        let source = "get '/x', to: 'a#b', controller: 'a'\n";
        let out = transform(source, &Options::default());
        assert_eq!(out.content, source);
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn test_qualified_and_unknown_calls_are_ignored() {
        let source = "client.get :index, {id: 1}\nvisit :index, {id: 1}\nget :index\n";
        let out = transform(source, &Options::default());
        assert_eq!(out.content, source);
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn test_block_and_splat_are_skipped() {
        let source = "get :index, {id: 1} do\nend\npost :create, *args\n";
        let out = transform(source, &Options::default());
        assert_eq!(out.content, source);
        assert_eq!(out.skipped, 2);
    }

    #[test]
    fn test_indentation_follows_call_line() {
        let source = "describe do\n  it do\n    delete :destroy, id: 1\n  end\nend\n";
        let out = transform(source, &Options::default());
        assert!(out.content.contains(
            "    # TODO: Rails 5 autofix\n    if Fave.next_version?\n      delete :destroy, params: { id: 1 }\n    else\n      delete :destroy, id: 1\n    end\n    # ENDTODO\n  end\n"
        ));
    }

    #[test]
    fn test_unparsable_input_is_unchanged() {
        let source = "get :index, {id: 1\n";
        let out = transform(source, &Options::default());
        assert_eq!(out.content, source);
        assert!(out.parse_error.is_some());
        assert!(!out.changed());
    }

    #[test]
    fn test_second_run_is_stable() {
        let source = "it do\n  patch :update, id: 1, user: { name: 'x' }\nend\n";
        let once = transform(source, &Options::default());
        let twice = transform(&once.content, &Options::default());
        assert_eq!(once.rewritten, 1);
        assert_eq!(twice.rewritten, 0);
        assert_eq!(twice.content, once.content);
    }

    #[test]
    fn test_unicode_line_separator_keeps_indentation() {
        let source = "describe do\n  # note\u{2028}x\n    get :index, id: 1\nend\n";
        let out = transform(source, &Options::default());
        assert_eq!(out.rewritten, 1);
        assert_eq!(
            out.content,
            "describe do\n  # note\u{2028}x\n    \
             # TODO: Rails 5 autofix\n    \
             if Fave.next_version?\n      \
             get :index, params: { id: 1 }\n    \
             else\n      \
             get :index, id: 1\n    \
             end\n    \
             # ENDTODO\n\
             end\n"
        );
    }

    #[test]
    fn test_form_feed_in_comment_keeps_indentation() {
        let source = "  # a\x0Cb\n  get :index, id: 1\n";
        let out = transform(source, &Options::default());
        assert!(out.content.contains(
            "  # TODO: Rails 5 autofix\n  if Fave.next_version?\n    get :index, params: { id: 1 }\n  else\n"
        ));
        assert!(out.content.ends_with("  end\n  # ENDTODO\n"));
    }

    #[test]
    fn test_nested_call_is_not_rewritten_separately() {
        let source = "get :index, build(post(:create, {a: 1}))\n";
        let options = Options::default();
        let transformer = TextTransformer::new(source, &options);
        let out = transformer.transform();
        assert_eq!(out.rewritten, 1);
        assert_eq!(out.skipped, 0);
        assert_eq!(out.content.matches("# TODO: Rails 5 autofix").count(), 1);
        assert_eq!(out.content.matches("post(:create, {a: 1})").count(), 2);
        assert_eq!(
            new_branch(&out.content),
            "get :index, params: build(post(:create, {a: 1}))"
        );
        assert!(out.content.contains("else\n  get :index, build(post(:create, {a: 1}))\nend"));
    }

    #[test]
    fn test_inner_call_of_skipped_call_is_still_visited() {
        let source = "get '/x', to: 'a#b', controller: call_site(post(:create, {a: 1}))\n";
        let out = transform(source, &Options::default());
        assert_eq!(out.rewritten, 1);
        assert_eq!(out.skipped, 1);
        assert_eq!(new_branch(&out.content), "post :create, params: {a: 1}");
    }
}
