//! Conditional dependency clauses.
//!
//! A dependency value in a manifest has the shape
//!
//! ```text
//! [version] [ "?" "<" flag ("," flag)* ">" ]
//! ```
//!
//! where each flag may be prefixed with `!` to negate it. The version part
//! picks the branch or tag used when fetching; the guard clause names the
//! build flags under which the dependency applies.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static GUARD_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    // The pattern is a literal, it always compiles.
    Regex::new(r"<(.+?)>").unwrap()
});

/// One flag inside a guard clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardFlag {
    /// Flag name, without the negation marker
    pub name: String,

    /// Whether the flag was written as `!name`
    pub negated: bool,
}

impl GuardFlag {
    /// Create a plain (non-negated) flag.
    pub fn new(name: impl Into<String>) -> Self {
        GuardFlag {
            name: name.into(),
            negated: false,
        }
    }

    /// Create a negated flag.
    pub fn negated(name: impl Into<String>) -> Self {
        GuardFlag {
            name: name.into(),
            negated: true,
        }
    }

    /// Parse a single flag token such as `CONFIG_WIFI` or `!CONFIG_WIFI`.
    ///
    /// Returns `None` for empty tokens.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        match token.strip_prefix('!') {
            Some(rest) => {
                let rest = rest.trim();
                (!rest.is_empty()).then(|| GuardFlag::negated(rest))
            }
            None => Some(GuardFlag::new(token)),
        }
    }
}

impl fmt::Display for GuardFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Parsed form of a dependency's condition string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConditionExpression {
    /// Branch, tag or version requested for the dependency
    pub version_constraint: Option<String>,

    /// Guard flags, in declaration order; empty when there is no guard clause
    pub guard_flags: Vec<GuardFlag>,

    conditional: bool,
}

impl ConditionExpression {
    /// Parse a condition string such as `"v7.4 ? <CONFIG_A, !CONFIG_B>"`.
    pub fn parse(raw: &str) -> Self {
        let (version, guard) = match raw.split_once('?') {
            Some((version, guard)) => (version, Some(guard)),
            None => (raw, None),
        };

        let version = version.trim();
        let version_constraint = (!version.is_empty()).then(|| version.to_string());

        let guard_flags = guard
            .and_then(|g| GUARD_CLAUSE.captures(g))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().split(',').filter_map(GuardFlag::parse).collect())
            .unwrap_or_default();

        ConditionExpression {
            version_constraint,
            guard_flags,
            conditional: guard.is_some(),
        }
    }

    /// Whether the dependency is conditional, i.e. the string had a `?`.
    ///
    /// A `?` with no usable guard clause still counts as conditional.
    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    /// Whether a guard clause with at least one flag was found.
    pub fn has_guard(&self) -> bool {
        !self.guard_flags.is_empty()
    }
}

/// Format a guard flag list as `a, !b`.
pub fn format_flags(flags: &[GuardFlag]) -> String {
    flags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
