//! Test utilities and mocks for keel unit tests.
//!
//! Fixtures build real workspaces and git repositories in temp dirs; the
//! mocks stand in for the remote component source and the installer.

pub mod fixtures;

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::core::dependency::DependencySpec;
use crate::core::MANIFEST_NAME;
use crate::ops::resolve::MissingInstaller;
use crate::sources::{RemoteComponent, RemoteSource};

pub use fixtures::*;

/// In-memory remote source.
///
/// Fetching writes a manifest for the component at the requested reference.
#[derive(Debug, Default)]
pub struct MockRemote {
    components: Vec<RemoteComponent>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    fetched: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockRemote {
    pub fn new(components: Vec<RemoteComponent>) -> Self {
        MockRemote {
            components,
            ..Default::default()
        }
    }

    /// Make fetching `name` fail.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Make every fetch take at least `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Most fetches that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// `(name, reference)` of every successful fetch.
    pub fn fetched(&self) -> Vec<(String, String)> {
        self.fetched.lock().unwrap().clone()
    }

    /// Names fetched, sorted.
    pub fn fetched_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.fetched().into_iter().map(|(n, _)| n).collect();
        names.sort();
        names
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl RemoteSource for MockRemote {
    fn name(&self) -> &str {
        "mock"
    }

    fn list_available(&self) -> Result<Vec<RemoteComponent>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.components.clone())
    }

    fn fetch(&self, component: &RemoteComponent, reference: &str, dest: &Path) -> Result<()> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let result = self.write_manifest(component, reference, dest);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MockRemote {
    fn write_manifest(&self, component: &RemoteComponent, reference: &str, dest: &Path) -> Result<()> {
        if self.failing.contains(&component.name) {
            bail!("connection refused");
        }

        let mut manifest = format!(
            "name: {}\nversion: {}\ntype: {}\n",
            component.name,
            reference,
            component.kind.as_str()
        );
        if !component.depends.is_empty() {
            let depends: Vec<DependencySpec> = component.depends.clone();
            manifest.push_str("depends:\n");
            for line in serde_yaml::to_string(&depends)?.lines() {
                manifest.push_str("  ");
                manifest.push_str(line);
                manifest.push('\n');
            }
        }

        std::fs::create_dir_all(dest)?;
        std::fs::write(dest.join(MANIFEST_NAME), manifest)?;
        self.fetched
            .lock()
            .unwrap()
            .push((component.name.clone(), reference.to_string()));
        Ok(())
    }
}

/// Installer that records requests and writes manifests from a table.
#[derive(Debug, Default)]
pub struct MockInstaller {
    /// Workspace-relative directory and manifest written per component
    available: Vec<(String, String, String)>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl MockInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installing `name` writes `manifest` into `<root>/<rel_dir>`.
    pub fn provides(mut self, name: &str, rel_dir: &str, manifest: &str) -> Self {
        self.available
            .push((name.to_string(), rel_dir.to_string(), manifest.to_string()));
        self
    }

    /// Every `(name, version)` requested, in order.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl MissingInstaller for MockInstaller {
    fn install(&self, root: &Path, name: &str, version: Option<&str>) -> Result<()> {
        self.requests
            .lock()
            .unwrap()
            .push((name.to_string(), version.map(String::from)));

        let Some((_, rel_dir, manifest)) = self.available.iter().find(|(n, _, _)| n == name) else {
            bail!("`{}` is not available", name);
        };
        let dir = root.join(rel_dir);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(MANIFEST_NAME), manifest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::load_record;
    use crate::core::{ComponentKind, Dependency};
    use tempfile::TempDir;

    #[test]
    fn test_mock_remote_writes_loadable_manifest() {
        let tmp = TempDir::new().unwrap();
        let uart = RemoteComponent::new("uart", ComponentKind::DrvPeripheral, "v1")
            .with_depend(Dependency::unconditional("rhino"))
            .with_depend(Dependency::new("wifi", "? <CONFIG_WIFI>"));
        let remote = MockRemote::new(vec![uart.clone()]);

        remote.fetch(&uart, "v1.1", tmp.path()).unwrap();
        let record = load_record(tmp.path()).unwrap();
        assert_eq!(record.version, "v1.1");
        assert_eq!(record.depends.len(), 2);
        assert!(record.depends[1].is_conditional());
        assert_eq!(remote.fetched(), vec![("uart".to_string(), "v1.1".to_string())]);
    }

    #[test]
    fn test_mock_installer_unknown() {
        let tmp = TempDir::new().unwrap();
        let installer = MockInstaller::new();
        assert!(installer.install(tmp.path(), "ghost", None).is_err());
        assert_eq!(installer.requests().len(), 1);
    }
}
