//! Hand-off of a validated component set to the solution builder.

use std::path::PathBuf;

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::core::condition::GuardFlag;
use crate::core::{ComponentKind, ComponentSet, FlagValue, Workspace};

/// One component of a build-ready solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionComponent {
    pub name: String,
    pub version: String,
    pub kind: ComponentKind,
    pub path: PathBuf,

    /// Conditions the component is built under; empty when mandatory
    pub conditions: Vec<Vec<GuardFlag>>,

    pub needs_build: bool,
}

/// A build-ready solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub name: String,
    pub board: Option<String>,
    pub compiler: String,
    pub components: Vec<SolutionComponent>,

    /// Config flags of every component; the first component to define a flag wins
    pub defines: IndexMap<String, FlagValue>,
}

impl Solution {
    pub fn component(&self, name: &str) -> Option<&SolutionComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Turns a resolved component set into a [`Solution`].
pub trait SolutionBuilder {
    fn build(&self, ws: &Workspace, components: &ComponentSet, compiler: &str) -> Result<Solution>;
}

/// Builds the solution description without generating any build files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSolutionBuilder;

impl SolutionBuilder for DefaultSolutionBuilder {
    fn build(&self, ws: &Workspace, components: &ComponentSet, compiler: &str) -> Result<Solution> {
        let Some(solution) = components
            .components(ws.group())
            .find(|c| c.kind() == ComponentKind::Solution)
        else {
            bail!("the resolved components contain no solution");
        };

        let mut defines = IndexMap::new();
        let mut members = Vec::with_capacity(components.len());
        for component in components.components(ws.group()) {
            for (flag, value) in &component.record().config_flags {
                defines.entry(flag.clone()).or_insert_with(|| value.clone());
            }
            members.push(SolutionComponent {
                name: component.name().to_string(),
                version: component.version().to_string(),
                kind: component.kind(),
                path: component.path().to_path_buf(),
                conditions: component.conditions().to_vec(),
                needs_build: component.kind().needs_build(),
            });
        }

        Ok(Solution {
            name: solution.name().to_string(),
            board: solution.record().board_name.clone(),
            compiler: compiler.to_string(),
            components: members,
            defines,
        })
    }
}
