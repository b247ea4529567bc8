//! Global context for Keel operations.
//!
//! Provides centralized access to paths, verbosity and workspace discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::util::config::{self, Config};

/// Directory that marks a keel workspace root.
pub const KEEL_DIR: &str = ".keel";

/// Manifest whose presence marks a workspace created before `.keel/` existed.
pub const KERNEL_MARKER: &str = "kernel/rhino/package.yaml";

/// Error locating the workspace.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("could not find a keel workspace in `{}` or any parent directory", .dir.display())]
    WorkspaceNotFound { dir: PathBuf },
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Keel data (~/.keel/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(KEEL_DIR));

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a different home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Keel home directory (~/.keel/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Find the workspace root, searching upward from cwd.
    ///
    /// The nearest directory holding `.keel/` wins. Failing that, the nearest
    /// directory holding `kernel/rhino/package.yaml` is used.
    pub fn find_workspace_root(&self) -> Result<PathBuf, ContextError> {
        let ancestors = || self.cwd.ancestors();

        ancestors()
            .find(|dir| dir.join(KEEL_DIR).is_dir())
            .or_else(|| ancestors().find(|dir| dir.join(KERNEL_MARKER).is_file()))
            .map(Path::to_path_buf)
            .ok_or_else(|| ContextError::WorkspaceNotFound {
                dir: self.cwd.clone(),
            })
    }

    /// Load the merged global and project configuration for a workspace.
    pub fn load_config(&self, root: &Path) -> Config {
        config::load_config(&self.config_path(), &config::project_config_path(root))
    }

    /// Ensure a directory exists, creating it if necessary.
    pub fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }
}
