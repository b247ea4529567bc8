//! ComponentRecord - the data loaded from one manifest.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{ComponentKind, Dependency};

/// A build-time configuration value from `def_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FlagValue {
    /// Whether this value asserts the flag.
    ///
    /// `null`, `false` and zero are unset; any string counts as set.
    pub fn is_set(&self) -> bool {
        match self {
            FlagValue::Null => false,
            FlagValue::Bool(b) => *b,
            FlagValue::Int(i) => *i != 0,
            FlagValue::Float(f) => *f != 0.0,
            FlagValue::Str(_) => true,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Null => Ok(()),
            FlagValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            FlagValue::Int(i) => write!(f, "{}", i),
            FlagValue::Float(v) => write!(f, "{}", v),
            FlagValue::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Build settings carried through to the solution builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Public include directories
    pub include: Vec<String>,

    /// Include directories used only by this component
    pub internal_include: Vec<String>,

    /// Prebuilt libraries to link
    pub libs: Vec<String>,

    /// Library search paths
    pub libpath: Vec<String>,

    pub cflag: Option<String>,
    pub cxxflag: Option<String>,
    pub asmflag: Option<String>,
    pub ldflag: Option<String>,

    /// Script run before the build
    pub prebuild_script: Option<String>,

    /// Script run after the build
    pub postbuild_script: Option<String>,
}

/// Everything a manifest says about one component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentRecord {
    pub name: String,
    pub version: String,
    pub kind: ComponentKind,
    pub description: String,

    /// Declared dependencies, in manifest order
    pub depends: Vec<Dependency>,

    /// Boards a solution can be built for
    pub supported_boards: Vec<Dependency>,

    /// Board selected by a solution (`hw_info.board_name`)
    pub board_name: Option<String>,

    /// Build-time feature flags
    pub config_flags: IndexMap<String, FlagValue>,

    pub build_config: BuildConfig,

    /// Component directory
    pub path: PathBuf,
}

impl ComponentRecord {
    /// Create a record with a name, kind and no dependencies.
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        ComponentRecord {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a dependency; `condition` is `""` for an unconditional one.
    pub fn with_depend(mut self, name: impl Into<String>, condition: impl Into<String>) -> Self {
        self.depends.push(Dependency::new(name, condition));
        self
    }

    /// Set a config flag.
    pub fn with_flag(mut self, name: impl Into<String>, value: FlagValue) -> Self {
        self.config_flags.insert(name.into(), value);
        self
    }

    /// Set the component directory.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Names of the supported boards.
    pub fn supported_board_names(&self) -> impl Iterator<Item = &str> {
        self.supported_boards.iter().map(Dependency::name)
    }

    /// Look up a config flag.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.config_flags.get(name)
    }

    /// Record the component's own version as `<NAME>_SW_VERSION`.
    ///
    /// Solutions that define `SW_VERSION` get it appended.
    pub fn inject_version_flag(&mut self) {
        let key = format!("{}_SW_VERSION", self.name.to_uppercase());
        let mut value = format!("{}_{}", self.name, self.version);
        if self.kind == ComponentKind::Solution {
            if let Some(sw) = self.config_flags.get("SW_VERSION") {
                let sw = match sw {
                    FlagValue::Str(s) => s.clone(),
                    other => other.to_string(),
                };
                value = format!("{}_{}", value, sw);
            }
        }
        self.config_flags.insert(key, FlagValue::Str(value));
    }
}
