//! Dropping missing dependencies whose guard flags are not satisfied.

use crate::core::component::Component;
use crate::core::record::FlagValue;
use crate::core::Dependency;

/// Whether any resolved component sets `flag` to a truthy value.
///
/// Components are checked in resolution order and the first one that sets
/// the flag decides. A flag no component defines is unset.
pub fn flag_is_set(resolved: &[&Component], flag: &str) -> bool {
    let setter = resolved
        .iter()
        .find(|c| c.flag(flag).is_some_and(FlagValue::is_set));

    match setter {
        Some(component) => {
            tracing::trace!("`{}` is set by `{}`", flag, component.name());
            true
        }
        None => false,
    }
}

/// Whether a missing dependency is still required by the resolved set.
///
/// With no guard clause the dependency is always required. Otherwise every
/// flag must hold: a plain flag must be set somewhere, a negated flag must
/// be set nowhere.
pub fn is_still_needed(resolved: &[&Component], dep: &Dependency) -> bool {
    let flags = dep.guard_flags();
    if flags.is_empty() {
        return true;
    }

    // ANDed: `? <A, B>` with only `B` set is not needed, though `B` comes last.
    flags.iter().all(|flag| {
        let set = flag_is_set(resolved, &flag.name);
        if flag.negated {
            !set
        } else {
            set
        }
    })
}

/// Remove missing dependencies that the resolved configuration does not need.
///
/// Returns the dropped entries, in the order they were removed.
pub fn filter_still_needed(resolved: &[&Component], missing: &mut Vec<Dependency>) -> Vec<Dependency> {
    let mut dropped = Vec::new();

    for index in (0..missing.len()).rev() {
        if !is_still_needed(resolved, &missing[index]) {
            let dep = missing.remove(index);
            tracing::debug!("`{}` is not needed by this configuration", dep);
            dropped.push(dep);
        }
    }

    dropped
}
