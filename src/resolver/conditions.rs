//! Mandatory and optional closures over a resolved component set.
//!
//! Both closures work on names and read the candidates' declared
//! dependencies; neither touches the filesystem.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;

use crate::core::component::Component;
use crate::core::condition::GuardFlag;

/// Optional chains longer than this are dropped without being expanded.
pub const MAX_OPTIONAL_DEPTH: usize = 64;

/// One way a component can be reached through conditional dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalEntry {
    pub name: String,

    /// Number of hops from the first conditional dependency
    pub depth: usize,

    /// Accumulated guard flags along the chain
    pub condition: Vec<GuardFlag>,
}

/// A component reachable only under conditions, with every distinct condition list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalDepend {
    pub name: String,
    pub conditions: Vec<Vec<GuardFlag>>,
}

fn candidate<'a>(candidates: &[&'a Component], name: &str) -> Option<&'a Component> {
    candidates.iter().copied().find(|c| c.name() == name)
}

/// Names transitively required by `parents` through unconditional dependencies.
///
/// The parents themselves, and anything in `exclude`, never appear in the result.
pub fn collect_mandatory(
    candidates: &[&Component],
    parents: &IndexSet<String>,
    exclude: &IndexSet<String>,
) -> IndexSet<String> {
    let mut result = IndexSet::new();
    let mut seen: IndexSet<String> = exclude.union(parents).cloned().collect();
    let mut frontier = parents.clone();

    loop {
        let mut found = IndexSet::new();
        for comp in candidates.iter().filter(|c| frontier.contains(c.name())) {
            for dep in comp.depends() {
                if !dep.is_conditional() && !seen.contains(dep.name()) {
                    found.insert(dep.name().to_string());
                }
            }
        }

        if found.is_empty() {
            break;
        }

        seen.extend(found.iter().cloned());
        result.extend(found.iter().cloned());
        frontier = found;
    }

    result
}

/// Every component reachable from `mandatory` through at least one
/// conditional dependency, with the conditions it was reached under.
///
/// Unconditional dependencies of an optional component inherit its
/// condition list; conditional ones add their own flags to it.
pub fn collect_optional(
    candidates: &[&Component],
    mandatory: &IndexSet<String>,
    exclude: &IndexSet<String>,
) -> Vec<OptionalDepend> {
    let blocked: IndexSet<String> = mandatory.union(exclude).cloned().collect();
    let mut entries: Vec<OptionalEntry> = Vec::new();

    for comp in candidates.iter().filter(|c| mandatory.contains(c.name())) {
        for dep in comp.depends() {
            if blocked.contains(dep.name()) || !dep.is_conditional() {
                continue;
            }
            let flags = dep.guard_flags();
            if flags.is_empty() {
                continue;
            }
            entries.push(OptionalEntry {
                name: dep.name().to_string(),
                depth: 0,
                condition: flags.to_vec(),
            });
        }
    }

    if entries.is_empty() {
        return Vec::new();
    }

    let mut visited: HashSet<(String, Vec<GuardFlag>)> = HashSet::new();
    let mut queue: VecDeque<usize> = (0..entries.len()).collect();

    while let Some(index) = queue.pop_front() {
        let entry = entries[index].clone();

        if entry.depth >= MAX_OPTIONAL_DEPTH {
            tracing::trace!("optional chain through `{}` is too deep, dropped", entry.name);
            continue;
        }
        if !visited.insert((entry.name.clone(), entry.condition.clone())) {
            continue;
        }
        let Some(comp) = candidate(candidates, &entry.name) else {
            continue;
        };

        for dep in comp.depends() {
            if blocked.contains(dep.name()) {
                continue;
            }

            let condition = if !dep.is_conditional() {
                entry.condition.clone()
            } else if dep.guard_flags().is_empty() {
                continue;
            } else {
                let mut condition = entry.condition.clone();
                for flag in dep.guard_flags() {
                    if !condition.contains(flag) {
                        condition.push(flag.clone());
                    }
                }
                condition
            };

            entries.push(OptionalEntry {
                name: dep.name().to_string(),
                depth: entry.depth + 1,
                condition,
            });
            queue.push_back(entries.len() - 1);
        }
    }

    merge_optional(entries)
}

/// Group entries by name, keeping each distinct condition list once.
pub fn merge_optional(mut entries: Vec<OptionalEntry>) -> Vec<OptionalDepend> {
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut merged: Vec<OptionalDepend> = Vec::new();
    for entry in entries {
        match merged.last_mut() {
            Some(last) if last.name == entry.name => {
                if !last.conditions.contains(&entry.condition) {
                    last.conditions.push(entry.condition);
                }
            }
            _ => merged.push(OptionalDepend {
                name: entry.name,
                conditions: vec![entry.condition],
            }),
        }
    }
    merged
}
