//! package.yaml manifest parsing.
//!
//! Every component directory carries a `package.yaml`. Only the fields the
//! resolver and the solution builder need are read; everything else in the
//! file is ignored.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::core::dependency::{DependencySpec, ScalarText};
use crate::core::record::{BuildConfig, ComponentRecord, FlagValue};
use crate::core::ComponentKind;
use crate::util::fs;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "package.yaml";

/// The manifest as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub name: String,

    pub version: Option<ScalarText>,

    #[serde(rename = "type")]
    pub kind: ComponentKind,

    pub description: Option<String>,

    pub depends: Vec<DependencySpec>,

    pub supported_boards: Vec<DependencySpec>,

    pub hw_info: HwInfo,

    #[serde(alias = "defconfig")]
    pub def_config: IndexMap<String, FlagValue>,

    pub build_config: BuildConfig,
}

/// Hardware selection of a solution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HwInfo {
    pub board_name: Option<String>,
}

impl Manifest {
    /// Parse a manifest from a string.
    pub fn parse(contents: &str) -> Result<Self> {
        // An empty file is a manifest with every field defaulted.
        if contents.trim().is_empty() {
            return Ok(Manifest::default());
        }
        let manifest: Manifest = serde_yaml::from_str(contents)?;
        Ok(manifest)
    }

    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Normalize into a ComponentRecord rooted at `dir`.
    pub fn into_record(self, dir: &Path) -> ComponentRecord {
        let mut record = ComponentRecord {
            name: self.name,
            version: self.version.map(ScalarText::into_text).unwrap_or_default(),
            kind: self.kind,
            description: self.description.unwrap_or_default(),
            depends: self
                .depends
                .into_iter()
                .filter_map(DependencySpec::into_dependency)
                .collect(),
            supported_boards: self
                .supported_boards
                .into_iter()
                .filter_map(DependencySpec::into_dependency)
                .collect(),
            board_name: self.hw_info.board_name.filter(|b| !b.is_empty()),
            config_flags: self.def_config,
            build_config: self.build_config,
            path: dir.to_path_buf(),
        };
        record.inject_version_flag();
        record
    }
}

/// Load the record for the component in `dir`.
pub fn load_record(dir: &Path) -> Result<ComponentRecord> {
    let manifest = Manifest::load(&dir.join(MANIFEST_NAME))?;
    Ok(manifest.into_record(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dependency;
    use tempfile::TempDir;

    const SOLUTION: &str = r#"
name: demo
version: v7.4
type: solution
description: Demo application
depends:
  - rhino
  - uart: master
  - wifi: "? <CONFIG_WIFI>"
supported_boards:
  - boardA
  - boardB: v1.0
hw_info:
  board_name: boardA
def_config:
  CONFIG_DEBUG: 1
  SW_VERSION: "1.0.2"
build_config:
  include:
    - include
  cflag: -O2
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(SOLUTION).unwrap();
        assert_eq!(manifest.name, "demo");
        assert_eq!(manifest.kind, ComponentKind::Solution);
        assert_eq!(manifest.depends.len(), 3);
        assert_eq!(manifest.hw_info.board_name.as_deref(), Some("boardA"));
    }

    #[test]
    fn test_into_record() {
        let record = Manifest::parse(SOLUTION)
            .unwrap()
            .into_record(Path::new("/ws/solutions/demo"));

        assert_eq!(record.version, "v7.4");
        assert_eq!(record.depends[0], Dependency::unconditional("rhino"));
        assert!(record.depends[2].is_conditional());
        assert_eq!(
            record.supported_board_names().collect::<Vec<_>>(),
            vec!["boardA", "boardB"]
        );
        assert_eq!(record.flag("CONFIG_DEBUG"), Some(&FlagValue::Int(1)));
        assert_eq!(
            record.flag("DEMO_SW_VERSION"),
            Some(&FlagValue::Str("demo_v7.4_1.0.2".into()))
        );
        assert_eq!(record.build_config.include, vec!["include"]);
        assert_eq!(record.build_config.cflag.as_deref(), Some("-O2"));
        assert_eq!(record.path, Path::new("/ws/solutions/demo"));
    }

    #[test]
    fn test_numeric_version() {
        let record = Manifest::parse("name: kv\nversion: 1.5\ntype: common\n")
            .unwrap()
            .into_record(Path::new("kv"));
        assert_eq!(record.version, "1.5");
    }

    #[test]
    fn test_load_reports_path() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "name: [broken").unwrap();

        let err = load_record(tmp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse manifest"));
    }
}
