//! High-level operations.
//!
//! This module contains the implementation of keel commands.

pub mod install;
pub mod resolve;
pub mod solution;

pub use install::{
    execute_install, install, plan_install, refresh_remote, remote_components, InstallOptions,
    InstallOutcome,
};
pub use resolve::{
    resolve_solution, MissingInstaller, ResolveOptions, ResolveOutcome, SolutionResolution,
    SubcommandInstaller,
};
pub use solution::{DefaultSolutionBuilder, Solution, SolutionBuilder, SolutionComponent};
