//! Condition-aware dependency resolution.
//!
//! The mandatory closure itself lives on [`ComponentGroup`]; this module
//! holds the passes that run over an already resolved set: the mandatory
//! and optional closures used to assign conditions, and the filter that
//! decides which missing components are really needed.
//!
//! [`ComponentGroup`]: crate::core::ComponentGroup

pub mod conditions;
pub mod errors;
pub mod filter;

pub use conditions::{
    collect_mandatory, collect_optional, merge_optional, OptionalDepend, OptionalEntry,
    MAX_OPTIONAL_DEPTH,
};
pub use errors::ResolveError;
pub use filter::{filter_still_needed, flag_is_set, is_still_needed};
