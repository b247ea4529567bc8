//! Resolution error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::Dependency;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while resolving, installing or removing components.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("component `{name}` is defined more than once")]
    #[diagnostic(
        code(keel::workspace::duplicate_component),
        help("Component names must be unique within a workspace")
    )]
    DuplicateComponent {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{} required component(s) could not be found", .missing.len())]
    #[diagnostic(
        code(keel::resolve::unresolved),
        help("Install the missing components with `keel install <name>`")
    )]
    UnresolvedDependency {
        missing: Vec<(String, String)>, // (name, condition)
    },

    #[error("cannot remove `{name}`, it is still in use")]
    #[diagnostic(
        code(keel::remove::blocked),
        help("Remove the components that depend on it first")
    )]
    RemovalBlocked { name: String, blockers: Vec<String> },

    #[error("component `{name}` not found")]
    #[diagnostic(code(keel::component::not_found))]
    ComponentNotFound { name: String },

    #[error("no solution found in `{}`", .dir.display())]
    #[diagnostic(
        code(keel::resolve::no_solution),
        help("Run this command inside a solution directory or pass `--solution <name>`")
    )]
    SolutionNotFound { dir: PathBuf },

    #[error("failed to fetch {} component(s)", .failed.len())]
    #[diagnostic(
        code(keel::install::fetch_failed),
        help("Check your network connection and try `keel update`")
    )]
    FetchFailed {
        failed: Vec<(String, String)>, // (name, reason)
    },
}

impl ResolveError {
    /// Build an `UnresolvedDependency` from the missing dependency entries.
    pub fn unresolved(missing: &[Dependency]) -> Self {
        ResolveError::UnresolvedDependency {
            missing: missing
                .iter()
                .map(|d| (d.name().to_string(), d.condition().to_string()))
                .collect(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            ResolveError::DuplicateComponent { first, second, .. } => {
                diag = diag
                    .with_context(format!("first defined in {}", first.display()))
                    .with_context(format!("redefined in {}", second.display()))
                    .with_location(second.clone());
            }

            ResolveError::UnresolvedDependency { missing } => {
                for (name, condition) in missing {
                    if condition.is_empty() {
                        diag = diag.with_context(format!("`{}`", name));
                    } else {
                        diag = diag.with_context(format!("`{}` ({})", name, condition));
                    }
                }
            }

            ResolveError::RemovalBlocked { blockers, .. } => {
                for blocker in blockers {
                    diag = diag.with_context(format!("required by `{}`", blocker));
                }
            }

            ResolveError::ComponentNotFound { .. } => {
                diag = diag.with_suggestion(suggestions::COMPONENT_NOT_FOUND);
            }

            ResolveError::SolutionNotFound { .. } => {}

            ResolveError::FetchFailed { failed } => {
                for (name, reason) in failed {
                    diag = diag.with_context(format!("`{}`: {}", name, reason));
                }
            }
        }

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }

        diag
    }
}
