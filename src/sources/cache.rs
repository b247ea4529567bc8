//! Cached list of remote components.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sources::RemoteComponent;
use crate::util::fs;

/// The remote component list, cached as JSON inside the workspace.
#[derive(Debug, Clone)]
pub struct RemoteCache {
    path: PathBuf,
}

impl RemoteCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RemoteCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached list.
    ///
    /// A missing or empty cache is `None`.
    pub fn load(&self) -> Result<Option<Vec<RemoteComponent>>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        let components: Vec<RemoteComponent> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;

        if components.is_empty() {
            Ok(None)
        } else {
            Ok(Some(components))
        }
    }

    /// Replace the cached list.
    pub fn store(&self, components: &[RemoteComponent]) -> Result<()> {
        let contents = serde_json::to_string_pretty(components)
            .context("failed to serialize remote components")?;
        fs::write_string(&self.path, &contents)?;
        tracing::debug!(
            "cached {} remote components in {}",
            components.len(),
            self.path.display()
        );
        Ok(())
    }
}
