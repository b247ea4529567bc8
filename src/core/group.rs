//! ComponentGroup - the arena of components and the mandatory closure.
//!
//! Components refer to each other by name only, so the group is the single
//! owner of every node and back-references are plain keys.

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};

use crate::core::component::Component;
use crate::core::Dependency;

/// An ordered, name-unique collection of components.
#[derive(Debug, Clone, Default)]
pub struct ComponentGroup {
    components: IndexMap<String, Component>,
}

/// An ordered, name-unique selection of component names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSet {
    names: IndexSet<String>,
}

/// Options for [`ComponentGroup::resolve_depends`].
#[derive(Debug, Clone, Default)]
pub struct DependOptions {
    /// Dependencies with these names are neither followed nor reported
    pub exclude: IndexSet<String>,

    /// Skip conditional dependencies that exist locally
    pub mandatory_only: bool,
}

impl DependOptions {
    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DependOptions {
            exclude: names.into_iter().map(Into::into).collect(),
            mandatory_only: false,
        }
    }
}

/// Result of a dependency traversal.
#[derive(Debug, Clone, Default)]
pub struct DependClosure {
    /// Components reached from the root, in discovery order (root excluded)
    pub components: ComponentSet,

    /// Declared dependencies with no local component, first occurrence per name
    pub unresolved: Vec<Dependency>,

    /// Sorted `parent -> child [? guard]` lines describing the traversal
    pub chain: Vec<String>,
}

impl DependClosure {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl ComponentGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component.
    ///
    /// Returns false, leaving the group untouched, if the name is taken.
    pub fn add(&mut self, component: Component) -> bool {
        if self.components.contains_key(component.name()) {
            tracing::debug!("component `{}` is already in the group", component.name());
            return false;
        }
        self.components
            .insert(component.name().to_string(), component);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Component> {
        self.components.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Remove a component, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Component> {
        self.components.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Component names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Load the named component's manifest if present.
    ///
    /// Returns `Ok(false)` for unknown names and components without a manifest.
    pub fn load(&mut self, name: &str) -> Result<bool> {
        match self.components.get_mut(name) {
            Some(component) => component.load(),
            None => Ok(false),
        }
    }

    /// Load every component.
    pub fn load_all(&mut self) -> Result<()> {
        for component in self.components.values_mut() {
            component.load()?;
        }
        Ok(())
    }

    /// Compute the transitive dependencies of `root`.
    ///
    /// The traversal is depth-first pre-order and expands each component at
    /// most once. Back-references are recorded on every visit. The root is
    /// never part of its own closure, even through a cycle.
    pub fn resolve_depends(&mut self, root: &str, options: &DependOptions) -> Result<DependClosure> {
        let mut closure = DependClosure::default();
        let mut chain: IndexSet<String> = IndexSet::new();
        let mut missing: IndexSet<String> = IndexSet::new();

        self.load(root)?;

        // Each frame is a component and the index of its next dependency.
        let mut stack: Vec<(String, usize)> = vec![(root.to_string(), 0)];

        while let Some((parent, index)) = stack.pop() {
            let Some(dep) = self
                .components
                .get(&parent)
                .and_then(|c| c.depends().get(index))
                .cloned()
            else {
                continue;
            };
            stack.push((parent.clone(), index + 1));

            let name = dep.name();
            if options.exclude.contains(name) {
                continue;
            }

            if !self.contains(name) {
                if missing.insert(name.to_string()) {
                    tracing::debug!("no local component `{}` (required by `{}`)", name, parent);
                    closure.unresolved.push(dep.clone());
                }
                continue;
            }

            if options.mandatory_only && dep.is_conditional() {
                continue;
            }

            chain.insert(chain_line(&parent, &dep));

            self.load(name)?;
            if let Some(component) = self.components.get_mut(name) {
                component.add_dependent(&parent);
            }

            if name != root && closure.components.insert(name) {
                stack.push((name.to_string(), 0));
            }
        }

        closure.chain = chain.into_iter().collect();
        closure.chain.sort();
        Ok(closure)
    }

    /// Every component `name` needs, following conditional dependencies as well.
    pub fn mandatory_depends(&mut self, name: &str) -> Result<ComponentSet> {
        Ok(self
            .resolve_depends(name, &DependOptions::default())?
            .components)
    }

    /// Fill every component's dependents by walking from each component.
    pub fn link_dependents(&mut self) -> Result<()> {
        let names: Vec<String> = self.components.keys().cloned().collect();
        for name in names {
            self.mandatory_depends(&name)?;
        }
        Ok(())
    }

    /// Components that declare `name` directly as a dependency.
    pub fn dependents_of(&self, name: &str) -> Vec<&Component> {
        self.components
            .values()
            .filter(|c| c.depends().iter().any(|d| d.name() == name))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ComponentGroup {
    type Item = &'a Component;
    type IntoIter = indexmap::map::Values<'a, String, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.values()
    }
}

fn chain_line(parent: &str, dep: &Dependency) -> String {
    match dep.guard_text() {
        Some(guard) => format!("{} -> {} ? {}", parent, dep.name(), guard),
        None => format!("{} -> {}", parent, dep.name()),
    }
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; returns false if it was already selected.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The selected components, in selection order, skipping unknown names.
    pub fn components<'g>(&'g self, group: &'g ComponentGroup) -> impl Iterator<Item = &'g Component> {
        self.names.iter().filter_map(|name| group.get(name))
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ComponentSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ComponentSet {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ComponentRecord;
    use crate::core::ComponentKind;

    fn group(records: Vec<ComponentRecord>) -> ComponentGroup {
        let mut group = ComponentGroup::new();
        for record in records {
            assert!(group.add(Component::from_record(record)));
        }
        group
    }

    fn common(name: &str) -> ComponentRecord {
        ComponentRecord::new(name, ComponentKind::Common)
    }

    // ==========================================================================
    // Group membership
    // ==========================================================================

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut g = group(vec![common("a").with_version("v1")]);
        assert!(!g.add(Component::from_record(common("a").with_version("v2"))));
        assert_eq!(g.len(), 1);
        assert_eq!(g.get("a").unwrap().version(), "v1");
    }

    // ==========================================================================
    // resolve_depends
    // ==========================================================================

    #[test]
    fn test_cycle_excludes_root() {
        let mut g = group(vec![
            common("A").with_depend("B", ""),
            common("B").with_depend("A", ""),
        ]);

        let closure = g.resolve_depends("A", &DependOptions::default()).unwrap();
        assert_eq!(closure.components.to_vec(), vec!["B"]);
        assert!(closure.is_complete());
        assert!(g.get("B").unwrap().depends_on().contains("A"));
        assert!(g.get("A").unwrap().depends_on().contains("B"));
    }

    #[test]
    fn test_depth_first_order() {
        let mut g = group(vec![
            common("root").with_depend("a", "").with_depend("b", ""),
            common("a").with_depend("c", ""),
            common("b"),
            common("c"),
        ]);

        let closure = g.resolve_depends("root", &DependOptions::default()).unwrap();
        assert_eq!(closure.components.to_vec(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_shared_dependency_has_all_dependents() {
        let mut g = group(vec![
            common("root").with_depend("a", "").with_depend("b", ""),
            common("a").with_depend("shared", ""),
            common("b").with_depend("shared", ""),
            common("shared"),
        ]);

        g.resolve_depends("root", &DependOptions::default()).unwrap();
        let dependents: Vec<_> = g.get("shared").unwrap().depends_on().iter().cloned().collect();
        assert_eq!(dependents, vec!["a", "b"]);
    }

    #[test]
    fn test_unresolved_are_deduplicated() {
        let mut g = group(vec![
            common("root")
                .with_depend("ghost", "v1")
                .with_depend("a", ""),
            common("a").with_depend("ghost", "v2"),
        ]);

        let closure = g.resolve_depends("root", &DependOptions::default()).unwrap();
        assert_eq!(closure.unresolved.len(), 1);
        assert_eq!(closure.unresolved[0].name(), "ghost");
        assert_eq!(closure.unresolved[0].condition(), "v1");
        assert_eq!(closure.components.to_vec(), vec!["a"]);
    }

    #[test]
    fn test_exclude_names() {
        let mut g = group(vec![
            common("sol").with_depend("boardB", "").with_depend("uart", ""),
            ComponentRecord::new("boardB", ComponentKind::Board),
            common("uart"),
        ]);

        let closure = g
            .resolve_depends("sol", &DependOptions::excluding(["boardB"]))
            .unwrap();
        assert_eq!(closure.components.to_vec(), vec!["uart"]);
        assert!(g.get("boardB").unwrap().depends_on().is_empty());
    }

    #[test]
    fn test_mandatory_only_skips_local_conditionals() {
        let mut g = group(vec![
            common("root")
                .with_depend("wifi", "? <CONFIG_WIFI>")
                .with_depend("ghost", "? <CONFIG_GHOST>"),
            common("wifi"),
        ]);

        let options = DependOptions {
            mandatory_only: true,
            ..Default::default()
        };
        let closure = g.resolve_depends("root", &options).unwrap();
        assert!(closure.components.is_empty());
        assert_eq!(closure.unresolved.len(), 1);

        let closure = g.resolve_depends("root", &DependOptions::default()).unwrap();
        assert_eq!(closure.components.to_vec(), vec!["wifi"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut g = group(vec![
            common("A").with_depend("B", "").with_depend("C", ""),
            common("B").with_depend("C", ""),
            common("C"),
        ]);

        let first = g.resolve_depends("A", &DependOptions::default()).unwrap();
        let second = g.resolve_depends("A", &DependOptions::default()).unwrap();
        assert_eq!(first.components, second.components);
        assert_eq!(g.get("C").unwrap().depends_on().len(), 2);
    }

    #[test]
    fn test_chain_is_sorted() {
        let mut g = group(vec![
            common("sol")
                .with_depend("uart", "")
                .with_depend("kv", "master ? <CONFIG_KV>"),
            common("uart"),
            common("kv").with_depend("uart", ""),
        ]);

        let closure = g.resolve_depends("sol", &DependOptions::default()).unwrap();
        assert_eq!(
            closure.chain,
            vec![
                "kv -> uart".to_string(),
                "sol -> kv ? <CONFIG_KV>".to_string(),
                "sol -> uart".to_string(),
            ]
        );
    }

    // ==========================================================================
    // Reverse dependencies
    // ==========================================================================

    #[test]
    fn test_link_and_scan_dependents() {
        let mut g = group(vec![
            common("app").with_depend("lib", ""),
            common("tool").with_depend("lib", ""),
            common("lib"),
        ]);

        g.link_dependents().unwrap();
        assert_eq!(g.get("lib").unwrap().depends_on().len(), 2);

        let names: Vec<_> = g.dependents_of("lib").iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["app", "tool"]);
    }
}
