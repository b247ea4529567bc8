//! Component kinds and their on-disk locations.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The kind of a component, as declared by `type:` in its manifest.
///
/// The kind decides where the component lives inside the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Board,
    Chip,
    Arch,
    DrvCore,
    DrvPeripheral,
    DrvExternalDevice,
    Kernel,
    Solution,
    Document,
    /// Anything else, including `sdk`.
    #[default]
    #[serde(other)]
    Common,
}

impl ComponentKind {
    /// Directory (relative to the workspace root) that holds components of this kind.
    pub fn install_dir(&self) -> &'static Path {
        Path::new(match self {
            ComponentKind::Board => "hardware/board",
            ComponentKind::Chip => "hardware/chip",
            ComponentKind::Arch => "hardware/arch",
            ComponentKind::DrvCore => "components/drivers/core",
            ComponentKind::DrvPeripheral => "components/drivers/peripheral",
            ComponentKind::DrvExternalDevice => "components/drivers/external_device",
            ComponentKind::Kernel => "kernel",
            ComponentKind::Solution => "solutions",
            ComponentKind::Document => ".",
            ComponentKind::Common => "components",
        })
    }

    /// Top-level workspace directory for this kind.
    pub fn top_dir(&self) -> &'static Path {
        Path::new(match self {
            ComponentKind::Board | ComponentKind::Chip | ComponentKind::Arch => "hardware",
            ComponentKind::DrvCore
            | ComponentKind::DrvPeripheral
            | ComponentKind::DrvExternalDevice
            | ComponentKind::Common => "components",
            ComponentKind::Kernel => "kernel",
            ComponentKind::Solution => "solutions",
            ComponentKind::Document => ".",
        })
    }

    /// Whether components of this kind produce objects of their own.
    pub fn needs_build(&self) -> bool {
        !matches!(self, ComponentKind::Board | ComponentKind::Chip)
    }

    /// The manifest spelling of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Board => "board",
            ComponentKind::Chip => "chip",
            ComponentKind::Arch => "arch",
            ComponentKind::DrvCore => "drv_core",
            ComponentKind::DrvPeripheral => "drv_peripheral",
            ComponentKind::DrvExternalDevice => "drv_external_device",
            ComponentKind::Kernel => "kernel",
            ComponentKind::Solution => "solution",
            ComponentKind::Document => "document",
            ComponentKind::Common => "common",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_dirs() {
        assert_eq!(ComponentKind::Board.install_dir(), Path::new("hardware/board"));
        assert_eq!(
            ComponentKind::DrvExternalDevice.install_dir(),
            Path::new("components/drivers/external_device")
        );
        assert_eq!(ComponentKind::Kernel.install_dir(), Path::new("kernel"));
        assert_eq!(ComponentKind::Common.install_dir(), Path::new("components"));
    }

    #[test]
    fn test_install_dir_is_under_top_dir() {
        assert_eq!(ComponentKind::Chip.top_dir(), Path::new("hardware"));
        assert_eq!(ComponentKind::Solution.top_dir(), Path::new("solutions"));
        for kind in [
            ComponentKind::Board,
            ComponentKind::Arch,
            ComponentKind::DrvCore,
            ComponentKind::DrvPeripheral,
            ComponentKind::Kernel,
            ComponentKind::Solution,
        ] {
            assert!(kind.install_dir().starts_with(kind.top_dir()), "{}", kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_common() {
        let kind: ComponentKind = serde_yaml::from_str("sdk").unwrap();
        assert_eq!(kind, ComponentKind::Common);

        let kind: ComponentKind = serde_yaml::from_str("drv_peripheral").unwrap();
        assert_eq!(kind, ComponentKind::DrvPeripheral);
    }

    #[test]
    fn test_needs_build() {
        assert!(!ComponentKind::Board.needs_build());
        assert!(!ComponentKind::Chip.needs_build());
        assert!(ComponentKind::Kernel.needs_build());
    }
}
