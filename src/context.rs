//! Test dialect detection.
//!
//! Best-effort: decides from content and path which keyword names extra
//! positional request arguments get. Signals, first match wins:
//! 1. RSpec `type:` metadata on a `describe` line
//! 2. Minitest superclass (`ActionController::TestCase`, `ActionDispatch::IntegrationTest`)
//! 3. The directory right below `spec/` or `test/`

use crate::options::Options;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

static RSPEC_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:RSpec\.)?describe\b.*?(?:\btype:\s*|:type\s*=>\s*):(\w+)")
        .expect("valid rspec type pattern")
});

static MINITEST_PARENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*class\s+[\w:]+\s*<\s*(ActionController::TestCase|ActionDispatch::IntegrationTest)\b",
    )
    .expect("valid minitest superclass pattern")
});

/// Functional test dialect of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestContext {
    /// Controller tests: extra arguments are `session` then `flash`.
    Controller,
    /// Request and integration tests: the extra argument is `headers`.
    Request,
    /// Anything else; no extra argument has a keyword.
    Other,
}

impl TestContext {
    /// Keywords for positional arguments after the params argument.
    pub fn extra_keywords(self) -> &'static [&'static str] {
        match self {
            TestContext::Controller => &["session", "flash"],
            TestContext::Request => &["headers"],
            TestContext::Other => &[],
        }
    }

    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            TestContext::Controller => "controller",
            TestContext::Request => "request",
            TestContext::Other => "other",
        }
    }

    fn from_type_name(name: &str) -> Self {
        match name {
            "controller" | "controllers" => TestContext::Controller,
            "request" | "requests" | "integration" | "api" => TestContext::Request,
            _ => TestContext::Other,
        }
    }
}

/// Classify a file from its content and `options.file_path`.
pub fn classify(content: &str, options: &Options) -> TestContext {
    if let Some(context) = from_content(content) {
        log::debug!("test context {} from content", context.as_str());
        return context;
    }
    let context = options
        .file_path
        .as_deref()
        .and_then(from_path)
        .unwrap_or(TestContext::Other);
    log::debug!("test context {} from path", context.as_str());
    context
}

fn from_content(content: &str) -> Option<TestContext> {
    if let Some(captures) = RSPEC_TYPE.captures(content) {
        return Some(TestContext::from_type_name(&captures[1]));
    }
    let captures = MINITEST_PARENT.captures(content)?;
    match &captures[1] {
        "ActionController::TestCase" => Some(TestContext::Controller),
        _ => Some(TestContext::Request),
    }
}

fn from_path(path: &Path) -> Option<TestContext> {
    let names: Vec<&str> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();
    let root = names
        .iter()
        .position(|name| *name == "spec" || *name == "test")?;
    // The component after the root must be a directory, not the file itself.
    if root + 1 >= names.len() - 1 {
        return None;
    }
    match TestContext::from_type_name(names[root + 1]) {
        TestContext::Other => None,
        context => Some(context),
    }
}
