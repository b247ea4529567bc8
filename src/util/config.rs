//! Configuration file support for Keel.
//!
//! Keel reads two configuration files:
//! - Global: `~/.keel/config.toml` - User-wide defaults
//! - Project: `<workspace>/.keel/config.toml` - Workspace overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Branch of the component index used when none is configured.
pub const DEFAULT_BRANCH: &str = "master";

/// Number of concurrent fetch workers used when none is configured.
pub const DEFAULT_JOBS: usize = 5;

/// Compiler handed to the solution builder when none is configured.
pub const DEFAULT_COMPILER: &str = "gcc";

/// Keel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote component index
    pub remote: RemoteConfig,

    /// Install settings
    pub install: InstallConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// Where remote components are listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Git URL of the component index repository
    pub index: Option<String>,

    /// Branch of the index to track
    pub branch: Option<String>,
}

/// Install-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Never install missing components while resolving
    pub disable_auto_install: bool,

    /// Concurrent fetch workers
    pub jobs: Option<usize>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default compiler
    pub compiler: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config file: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.remote.index.is_some() {
            self.remote.index = other.remote.index;
        }
        if other.remote.branch.is_some() {
            self.remote.branch = other.remote.branch;
        }

        if other.install.disable_auto_install {
            self.install.disable_auto_install = true;
        }
        if other.install.jobs.is_some() {
            self.install.jobs = other.install.jobs;
        }

        if other.build.compiler.is_some() {
            self.build.compiler = other.build.compiler;
        }
    }

    /// Branch of the component index.
    pub fn branch(&self) -> &str {
        self.remote.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// Number of fetch workers, never zero.
    pub fn jobs(&self) -> usize {
        self.install.jobs.unwrap_or(DEFAULT_JOBS).max(1)
    }

    /// Default compiler.
    pub fn compiler(&self) -> &str {
        self.build.compiler.as_deref().unwrap_or(DEFAULT_COMPILER)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keel/config.toml)
/// 2. Global config (~/.keel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global keel config directory (~/.keel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".keel"))
}

/// Get the project config path (<root>/.keel/config.toml).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".keel").join("config.toml")
}
