//! Dependency declarations.
//!
//! A Dependency names another component and carries the raw condition
//! text from the manifest together with its parsed form.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::condition::{ConditionExpression, GuardFlag};

/// A declared dependency on another component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Component name
    name: String,

    /// Condition text as written, `""` when unconditional
    condition: String,

    /// Parsed condition, `None` when `condition` is empty
    expression: Option<ConditionExpression>,
}

impl Dependency {
    /// Create a dependency from a name and its raw condition string.
    pub fn new(name: impl Into<String>, condition: impl Into<String>) -> Self {
        let condition = condition.into().trim().to_string();
        let expression = (!condition.is_empty()).then(|| ConditionExpression::parse(&condition));
        Dependency {
            name: name.into(),
            condition,
            expression,
        }
    }

    /// Create an unconditional dependency with no version.
    pub fn unconditional(name: impl Into<String>) -> Self {
        Dependency::new(name, "")
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the raw condition text.
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Get the parsed condition, if any.
    pub fn expression(&self) -> Option<&ConditionExpression> {
        self.expression.as_ref()
    }

    /// Whether this dependency only applies under some build flags.
    pub fn is_conditional(&self) -> bool {
        self.expression
            .as_ref()
            .is_some_and(ConditionExpression::is_conditional)
    }

    /// Guard flags of this dependency (empty for unconditional ones).
    pub fn guard_flags(&self) -> &[GuardFlag] {
        self.expression
            .as_ref()
            .map(|e| e.guard_flags.as_slice())
            .unwrap_or(&[])
    }

    /// Requested branch, tag or version.
    pub fn version_constraint(&self) -> Option<&str> {
        self.expression
            .as_ref()
            .and_then(|e| e.version_constraint.as_deref())
    }

    /// The guard part of the condition text (after `?`), trimmed.
    pub fn guard_text(&self) -> Option<&str> {
        self.condition
            .split_once('?')
            .map(|(_, guard)| guard.trim())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.condition.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}: {}", self.name, self.condition)
        }
    }
}

/// Dependency entry as it appears in package.yaml.
///
/// ```yaml
/// depends:
///   - rhino
///   - uart: master
///   - wifi: "? <CONFIG_WIFI>"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Bare component name
    Name(String),

    /// Single-key map of name to condition
    Detailed(IndexMap<String, Option<ScalarText>>),
}

/// A scalar manifest value read back as text (`1.0` and `"1.0"` both work).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarText {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ScalarText {
    /// The value as a string.
    pub fn into_text(self) -> String {
        match self {
            ScalarText::Text(s) => s,
            ScalarText::Integer(i) => i.to_string(),
            ScalarText::Float(f) => f.to_string(),
            ScalarText::Bool(b) => b.to_string(),
        }
    }
}

impl DependencySpec {
    /// Normalize into a Dependency.
    ///
    /// Returns `None` for an empty map.
    pub fn into_dependency(self) -> Option<Dependency> {
        match self {
            DependencySpec::Name(name) => Some(Dependency::unconditional(name)),
            DependencySpec::Detailed(map) => {
                let (name, value) = map.into_iter().next()?;
                let condition = value.map(ScalarText::into_text).unwrap_or_default();
                Some(Dependency::new(name, condition))
            }
        }
    }

    /// Build the manifest form of a Dependency.
    pub fn from_dependency(dep: &Dependency) -> Self {
        if dep.condition().is_empty() {
            DependencySpec::Name(dep.name().to_string())
        } else {
            let mut map = IndexMap::new();
            map.insert(
                dep.name().to_string(),
                Some(ScalarText::Text(dep.condition().to_string())),
            );
            DependencySpec::Detailed(map)
        }
    }
}
