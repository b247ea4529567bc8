//! RemoteSource trait - where components that are not installed come from.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::dependency::DependencySpec;
use crate::core::record::ComponentRecord;
use crate::core::{Component, ComponentKind, Dependency};

/// Summary of a component available from a remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteComponent {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: ComponentKind,

    /// Latest published version
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: String,

    /// Repository to clone
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub depends: Vec<DependencySpec>,
}

impl RemoteComponent {
    /// Create a summary with no dependencies.
    pub fn new(name: impl Into<String>, kind: ComponentKind, version: impl Into<String>) -> Self {
        RemoteComponent {
            name: name.into(),
            kind,
            version: version.into(),
            description: String::new(),
            url: String::new(),
            depends: Vec::new(),
        }
    }

    /// Add a dependency.
    pub fn with_depend(mut self, dep: Dependency) -> Self {
        self.depends.push(DependencySpec::from_dependency(&dep));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Declared dependencies in normalized form.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.depends
            .iter()
            .cloned()
            .filter_map(DependencySpec::into_dependency)
            .collect()
    }

    /// Directory this component installs into under `root`.
    pub fn install_path(&self, root: &Path) -> PathBuf {
        root.join(self.kind.install_dir()).join(&self.name)
    }

    /// A loaded component standing in for this summary.
    pub fn to_component(&self, root: &Path) -> Component {
        let mut record = ComponentRecord::new(self.name.clone(), self.kind)
            .with_version(self.version.clone())
            .with_path(self.install_path(root));
        record.description = self.description.clone();
        record.depends = self.dependencies();
        Component::from_record(record)
    }
}

/// A source of components that are not installed locally.
///
/// Sources are shared between fetch workers, so every method takes `&self`.
pub trait RemoteSource: Send + Sync {
    /// Get the source name for display.
    fn name(&self) -> &str;

    /// List every component the source offers.
    fn list_available(&self) -> Result<Vec<RemoteComponent>>;

    /// Fetch `component` at `reference` (a branch or tag) into `dest`.
    fn fetch(&self, component: &RemoteComponent, reference: &str, dest: &Path) -> Result<()>;
}
