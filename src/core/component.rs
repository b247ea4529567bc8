//! Component - a live node of the component graph.
//!
//! A Component wraps a ComponentRecord with the state the resolver keeps
//! while it works: whether the manifest has been read, which components
//! depend on this one, and the conditions it was pulled in under.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexSet;

use crate::core::condition::GuardFlag;
use crate::core::manifest::{self, MANIFEST_NAME};
use crate::core::record::{ComponentRecord, FlagValue};
use crate::core::{ComponentKind, Dependency};

/// A component known to a workspace.
#[derive(Debug, Clone)]
pub struct Component {
    /// Key of this component within its group
    name: String,

    /// Manifest data; defaulted until loaded
    record: ComponentRecord,

    /// Whether the manifest has been parsed
    loaded: bool,

    /// Names of the components that directly depend on this one
    depends_on: IndexSet<String>,

    /// Condition lists this component was pulled in under (optional closure only)
    conditions: Vec<Vec<GuardFlag>>,
}

impl Component {
    /// Create an unloaded component for a directory found on disk.
    ///
    /// The directory name is the component's key until the manifest is read.
    pub fn discovered(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Component {
            record: ComponentRecord {
                name: name.clone(),
                path,
                ..Default::default()
            },
            name,
            loaded: false,
            depends_on: IndexSet::new(),
            conditions: Vec::new(),
        }
    }

    /// Create a loaded component from a record.
    pub fn from_record(record: ComponentRecord) -> Self {
        Component {
            name: record.name.clone(),
            record,
            loaded: true,
            depends_on: IndexSet::new(),
            conditions: Vec::new(),
        }
    }

    /// Read the manifest if it has not been read yet.
    ///
    /// Returns `Ok(false)` when the directory has no manifest.
    pub fn load(&mut self) -> Result<bool> {
        if self.loaded {
            return Ok(true);
        }

        let dir = self.record.path.clone();
        if dir.as_os_str().is_empty() || !dir.join(MANIFEST_NAME).is_file() {
            return Ok(false);
        }

        let record = manifest::load_record(&dir)?;
        if record.name != self.name {
            tracing::warn!(
                "component `{}` is declared in directory `{}`",
                record.name,
                dir.display()
            );
        }

        self.record = record;
        self.loaded = true;
        Ok(true)
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the manifest has been read.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Get the manifest data.
    pub fn record(&self) -> &ComponentRecord {
        &self.record
    }

    /// Get mutable manifest data.
    pub fn record_mut(&mut self) -> &mut ComponentRecord {
        &mut self.record
    }

    pub fn version(&self) -> &str {
        &self.record.version
    }

    pub fn kind(&self) -> ComponentKind {
        self.record.kind
    }

    /// Get the component directory.
    pub fn path(&self) -> &Path {
        &self.record.path
    }

    /// Declared dependencies; empty until loaded.
    pub fn depends(&self) -> &[Dependency] {
        &self.record.depends
    }

    /// Look up a config flag.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.record.flag(name)
    }

    /// Names of the components that depend on this one.
    pub fn depends_on(&self) -> &IndexSet<String> {
        &self.depends_on
    }

    /// Record `dependent` as depending on this component.
    ///
    /// Returns false when it was already recorded or is this component.
    pub fn add_dependent(&mut self, dependent: &str) -> bool {
        if dependent == self.name {
            return false;
        }
        self.depends_on.insert(dependent.to_string())
    }

    /// Forget that `dependent` depends on this component.
    pub fn remove_dependent(&mut self, dependent: &str) -> bool {
        self.depends_on.shift_remove(dependent)
    }

    /// Condition lists assigned by the optional closure.
    pub fn conditions(&self) -> &[Vec<GuardFlag>] {
        &self.conditions
    }

    /// Replace the condition lists.
    pub fn set_conditions(&mut self, conditions: Vec<Vec<GuardFlag>>) {
        self.conditions = conditions;
    }
}
