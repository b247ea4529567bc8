//! Workspace - every component found on disk, and the operations over them.
//!
//! A Workspace owns the [`ComponentGroup`] for one SDK tree. It is the only
//! place components are added or removed, so the `depends_on` back-references
//! stay consistent with what is on disk.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexSet;

use crate::core::component::Component;
use crate::core::group::{ComponentGroup, ComponentSet};
use crate::core::manifest::{self, MANIFEST_NAME};
use crate::core::{ComponentKind, Dependency};
use crate::resolver::{self, OptionalDepend, ResolveError};
use crate::util::context::KEEL_DIR;
use crate::util::{fs, Config, GlobalContext};

/// Top-level directories scanned for components.
pub const SCAN_ROOTS: &[&str] = &[
    "hardware",
    "kernel",
    "components",
    "examples",
    "test",
    "documentation",
];

/// Top-level directories starting with this prefix are scanned too.
pub const SOLUTIONS_PREFIX: &str = "solutions";

/// A workspace containing every local component.
#[derive(Debug)]
pub struct Workspace {
    /// Workspace root directory
    root: PathBuf,

    /// Directory the command was run from
    cwd: PathBuf,

    /// Merged configuration
    config: Config,

    /// All local components
    group: ComponentGroup,
}

impl Workspace {
    /// Find the workspace around the context's cwd and scan it.
    pub fn open(ctx: &GlobalContext) -> Result<Self> {
        let root = ctx.find_workspace_root()?;
        let config = ctx.load_config(&root);
        let group = scan(&root, ctx.cwd())?;

        tracing::debug!("found {} components under {}", group.len(), root.display());

        Ok(Workspace {
            root,
            cwd: ctx.cwd().to_path_buf(),
            config,
            group,
        })
    }

    /// Build a workspace around an existing group.
    pub fn from_group(
        root: impl Into<PathBuf>,
        cwd: impl Into<PathBuf>,
        config: Config,
        group: ComponentGroup,
    ) -> Self {
        Workspace {
            root: root.into(),
            cwd: cwd.into(),
            config,
            group,
        }
    }

    /// Re-discover components, e.g. after a fetch.
    pub fn rescan(&mut self) -> Result<()> {
        self.group = scan(&self.root, &self.cwd)?;
        Ok(())
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get every local component.
    pub fn group(&self) -> &ComponentGroup {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut ComponentGroup {
        &mut self.group
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.group.get(name)
    }

    /// Get the .keel directory.
    pub fn keel_dir(&self) -> PathBuf {
        self.root.join(KEEL_DIR)
    }

    /// Where the remote component index is checked out.
    pub fn index_dir(&self) -> PathBuf {
        self.keel_dir().join("index")
    }

    /// Where the remote component list is cached.
    pub fn remote_cache_path(&self) -> PathBuf {
        self.keel_dir().join("components.json")
    }

    /// Directory a component of `kind` named `name` is installed into.
    pub fn install_path(&self, kind: ComponentKind, name: &str) -> PathBuf {
        self.root.join(kind.install_dir()).join(name)
    }

    fn require(&self, name: &str) -> Result<(), ResolveError> {
        if self.group.contains(name) {
            Ok(())
        } else {
            Err(ResolveError::ComponentNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Every component `name` depends on, conditionally or not.
    pub fn mandatory_depends(&mut self, name: &str) -> Result<ComponentSet> {
        self.require(name)?;
        self.group.mandatory_depends(name)
    }

    /// Components that declare `name` as a direct dependency.
    pub fn dependents_of(&mut self, name: &str) -> Result<Vec<String>> {
        self.require(name)?;
        self.group.load_all()?;
        Ok(self
            .group
            .dependents_of(name)
            .into_iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    fn candidates<'a>(&'a self, components: &'a ComponentSet) -> Vec<&'a Component> {
        components.components(&self.group).collect()
    }

    /// Names `parents` require through unconditional dependencies within `components`.
    pub fn collect_mandatory(
        &self,
        components: &ComponentSet,
        parents: &IndexSet<String>,
        exclude: &IndexSet<String>,
    ) -> IndexSet<String> {
        resolver::collect_mandatory(&self.candidates(components), parents, exclude)
    }

    /// Components reachable from `mandatory` only through conditional dependencies.
    pub fn collect_optional(
        &self,
        components: &ComponentSet,
        mandatory: &IndexSet<String>,
        exclude: &IndexSet<String>,
    ) -> Vec<OptionalDepend> {
        resolver::collect_optional(&self.candidates(components), mandatory, exclude)
    }

    /// Assign each selected component the conditions it is pulled in under.
    ///
    /// Returns the mandatory names (parents included) and the optional
    /// dependencies found.
    pub fn resolve_conditions(
        &mut self,
        components: &ComponentSet,
        parents: &IndexSet<String>,
        exclude: &IndexSet<String>,
    ) -> (IndexSet<String>, Vec<OptionalDepend>) {
        let mut mandatory = self.collect_mandatory(components, parents, exclude);
        mandatory.extend(parents.iter().cloned());
        let optional = self.collect_optional(components, &mandatory, exclude);

        for name in components.iter() {
            if let Some(component) = self.group.get_mut(name) {
                let conditions = optional
                    .iter()
                    .find(|o| o.name == name)
                    .map(|o| o.conditions.clone())
                    .unwrap_or_default();
                component.set_conditions(conditions);
            }
        }

        (mandatory, optional)
    }

    /// Drop missing dependencies the selected components' flags do not need.
    pub fn filter_still_needed(
        &self,
        components: &ComponentSet,
        missing: &mut Vec<Dependency>,
    ) -> Vec<Dependency> {
        resolver::filter_still_needed(&self.candidates(components), missing)
    }

    /// Find the solution to resolve.
    ///
    /// With a name, that component must exist and be a solution. Without,
    /// the solution whose directory is the current directory is used.
    pub fn current_solution(&mut self, name: Option<&str>) -> Result<String> {
        if let Some(name) = name {
            self.require(name)?;
            self.group.load(name)?;
            let is_solution = self
                .group
                .get(name)
                .is_some_and(|c| c.kind() == ComponentKind::Solution);
            if !is_solution {
                return Err(ResolveError::SolutionNotFound {
                    dir: self.group.get(name).map(|c| c.path().to_path_buf()).unwrap_or_default(),
                }
                .into());
            }
            return Ok(name.to_string());
        }

        let cwd = fs::normalize_path(&self.cwd);
        let names: Vec<String> = self.group.names().map(String::from).collect();
        for name in names {
            let at_cwd = self
                .group
                .get(&name)
                .is_some_and(|c| fs::normalize_path(c.path()) == cwd);
            if !at_cwd {
                continue;
            }
            self.group.load(&name)?;
            if self.group.get(&name).is_some_and(|c| c.kind() == ComponentKind::Solution) {
                return Ok(name);
            }
        }

        Err(ResolveError::SolutionNotFound { dir: self.cwd.clone() }.into())
    }

    /// Remove a component and every dependency nothing else uses.
    ///
    /// Fails with `RemovalBlocked`, leaving the workspace untouched, when
    /// another component depends on `name`. Returns the removed names in
    /// removal order.
    pub fn remove(&mut self, name: &str) -> Result<Vec<String>> {
        self.require(name)?;
        self.group.load_all()?;
        self.group.link_dependents()?;

        if let Some(component) = self.group.get(name) {
            if !component.depends_on().is_empty() {
                return Err(ResolveError::RemovalBlocked {
                    name: name.to_string(),
                    blockers: component.depends_on().iter().cloned().collect(),
                }
                .into());
            }
        }

        let mut removed = Vec::new();
        self.remove_unused(name, &mut removed)?;
        Ok(removed)
    }

    fn remove_unused(&mut self, name: &str, removed: &mut Vec<String>) -> Result<()> {
        let depends: Vec<String> = match self.group.get(name) {
            Some(component) => component.depends().iter().map(|d| d.name().to_string()).collect(),
            None => return Ok(()),
        };

        for dep in depends {
            if dep == name {
                continue;
            }
            let Some(component) = self.group.get_mut(&dep) else {
                continue;
            };
            component.remove_dependent(name);
            if component.depends_on().is_empty() {
                self.remove_unused(&dep, removed)?;
            } else {
                tracing::debug!(
                    "keeping `{}`, still used by {}",
                    dep,
                    component
                        .depends_on()
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        if let Some(component) = self.group.remove(name) {
            let path = component.path();
            if fs::is_inside(path, &self.root) {
                fs::remove_dir_all_if_exists(path)?;
            } else if !path.as_os_str().is_empty() {
                tracing::warn!(
                    "not deleting `{}`, it is outside the workspace",
                    path.display()
                );
            }
            tracing::info!("removed `{}`", name);
            removed.push(name.to_string());
        }

        Ok(())
    }
}

/// Discover every component under the workspace root.
fn scan(root: &Path, cwd: &Path) -> Result<ComponentGroup> {
    let mut dirs: Vec<PathBuf> = SCAN_ROOTS.iter().map(|d| root.join(d)).collect();

    let mut solution_roots: Vec<PathBuf> = match std::fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .filter(|e| e.file_name().to_string_lossy().starts_with(SOLUTIONS_PREFIX))
            .map(|e| e.path())
            .collect(),
        Err(_) => Vec::new(),
    };
    solution_roots.sort();
    dirs.extend(solution_roots);

    let mut found: Vec<PathBuf> = dirs
        .iter()
        .filter(|d| d.is_dir())
        .flat_map(|d| fs::find_dirs_containing(d, MANIFEST_NAME))
        .collect();

    if cwd.join(MANIFEST_NAME).is_file() {
        let cwd_path = fs::normalize_path(cwd);
        let known = found.iter().any(|p| fs::normalize_path(p) == cwd_path);
        if !known && manifest::load_record(cwd)?.kind == ComponentKind::Solution {
            found.push(cwd.to_path_buf());
        }
    }

    let mut group = ComponentGroup::new();
    for path in found {
        let component = Component::discovered(path);
        if let Some(existing) = group.get(component.name()) {
            return Err(ResolveError::DuplicateComponent {
                name: component.name().to_string(),
                first: existing.path().to_path_buf(),
                second: component.path().to_path_buf(),
            }
            .into());
        }
        group.add(component);
    }

    Ok(group)
}
