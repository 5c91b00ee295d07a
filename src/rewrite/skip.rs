//! Skip policy for candidate call sites.
//!
//! Text guards run in a fixed order over the call's source line, the line
//! before it and the call's own text. The first guard that fires names the
//! reason; structural reasons found later by the rewriter share the same enum.

use std::fmt;

/// Substrings that mark a call as already migrated or excluded by hand.
pub const MIGRATION_MARKERS: [&str; 3] = ["params:", "headers:", "#FIXED"];

/// Why a candidate call site was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The previous line contains `else`, as in an emitted shim's old branch.
    PrecededByElse,
    /// The call text contains one of [`MIGRATION_MARKERS`].
    AlreadyMigrated(&'static str),
    /// The call sits inside `expect { ... }`.
    InsideExpectBlock,
    /// A block is attached to the call.
    AttachedBlock,
    /// An argument contains a heredoc whose body lies outside the call's range.
    Heredoc,
    /// A splat, block-pass or forwarding argument cannot become a keyword.
    UnsupportedArgument(&'static str),
    /// The params hash is a route definition (`to: 'users#show'`).
    RouteDefinition,
    /// The params hash already has a `params` key.
    HasParamsKey,
    /// More positional arguments than keywords available in this test dialect.
    UnmappedArguments {
        /// Positional arguments after the params argument.
        extra: usize,
        /// Keywords available for them.
        slots: usize,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PrecededByElse => write!(f, "previous line contains else"),
            SkipReason::AlreadyMigrated(marker) => write!(f, "call already contains {}", marker),
            SkipReason::InsideExpectBlock => write!(f, "call is inside an expect block"),
            SkipReason::AttachedBlock => write!(f, "call has a block"),
            SkipReason::Heredoc => write!(f, "call has a heredoc argument"),
            SkipReason::UnsupportedArgument(kind) => write!(f, "unsupported argument {}", kind),
            SkipReason::RouteDefinition => write!(f, "hash looks like a route definition"),
            SkipReason::HasParamsKey => write!(f, "hash already has a params key"),
            SkipReason::UnmappedArguments { extra, slots } => write!(
                f,
                "{} extra positional arguments but only {} keywords",
                extra, slots
            ),
        }
    }
}

/// Raw text a guard looks at.
#[derive(Debug, Clone, Copy)]
pub struct GuardInput<'a> {
    /// Line before the call's first line, if any.
    pub previous_line: Option<&'a str>,
    /// The call's first line.
    pub line: &'a str,
    /// Source text of the whole call.
    pub call_text: &'a str,
}

/// A named text predicate.
pub struct Guard {
    /// Stable identifier for logs.
    pub name: &'static str,
    check: fn(&GuardInput<'_>) -> Option<SkipReason>,
}

impl Guard {
    /// Run the guard.
    pub fn check(&self, input: &GuardInput<'_>) -> Option<SkipReason> {
        (self.check)(input)
    }
}

/// Guards in evaluation order.
pub const GUARDS: &[Guard] = &[
    Guard {
        name: "preceded-by-else",
        check: preceded_by_else,
    },
    Guard {
        name: "already-migrated",
        check: already_migrated,
    },
    Guard {
        name: "inside-expect-block",
        check: inside_expect_block,
    },
];

/// First guard that fires, if any.
pub fn check_guards(input: &GuardInput<'_>) -> Option<SkipReason> {
    GUARDS.iter().find_map(|guard| {
        let reason = guard.check(input)?;
        log::trace!("guard {} fired", guard.name);
        Some(reason)
    })
}

fn preceded_by_else(input: &GuardInput<'_>) -> Option<SkipReason> {
    input
        .previous_line
        .filter(|line| line.contains("else"))
        .map(|_| SkipReason::PrecededByElse)
}

fn already_migrated(input: &GuardInput<'_>) -> Option<SkipReason> {
    MIGRATION_MARKERS
        .iter()
        .copied()
        .find(|marker| input.call_text.contains(marker))
        .map(SkipReason::AlreadyMigrated)
}

// TODO: rewrite calls inside expect blocks once the block's closing brace can
// be kept on the shim's last line.
fn inside_expect_block(input: &GuardInput<'_>) -> Option<SkipReason> {
    let joined: String = input
        .previous_line
        .unwrap_or("")
        .chars()
        .chain(input.line.chars())
        .filter(|c| !c.is_whitespace())
        .collect();
    joined
        .contains("expect{")
        .then_some(SkipReason::InsideExpectBlock)
}
