//! Core data structures for Keel.
//!
//! This module contains the component graph:
//! - Manifest data (ComponentRecord, Dependency, ConditionExpression)
//! - Live components and the group that owns them
//! - The workspace holding every local component

pub mod component;
pub mod condition;
pub mod dependency;
pub mod group;
pub mod kind;
pub mod manifest;
pub mod record;
pub mod workspace;

pub use component::Component;
pub use condition::{ConditionExpression, GuardFlag};
pub use dependency::Dependency;
pub use group::{ComponentGroup, ComponentSet, DependClosure, DependOptions};
pub use kind::ComponentKind;
pub use manifest::{Manifest, MANIFEST_NAME};
pub use record::{BuildConfig, ComponentRecord, FlagValue};
pub use workspace::Workspace;
