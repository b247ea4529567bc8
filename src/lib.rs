//! Keel - dependency resolution and component management for an embedded SDK
//!
//! This crate provides the core library functionality for keel: discovering
//! the components of an SDK workspace, computing mandatory and conditional
//! dependency closures, and fetching missing components from a remote index.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for keel unit tests.
///
/// Only compiled for tests. Provides on-disk workspace and git fixtures and
/// mock remote sources.
#[cfg(test)]
pub mod test_support;

pub use core::{
    Component, ComponentGroup, ComponentKind, ComponentRecord, ComponentSet, Dependency,
    Manifest, Workspace,
};

pub use resolver::ResolveError;
pub use util::context::GlobalContext;
