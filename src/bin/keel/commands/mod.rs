//! Command implementations

pub mod completions;
pub mod deps;
pub mod init;
pub mod install;
pub mod list;
pub mod remove;
pub mod resolve;
pub mod update;

use anyhow::Result;
use keel::core::Workspace;
use keel::util::GlobalContext;

use crate::GlobalOptions;

/// Open the workspace around the current directory.
pub fn open_workspace(global: &GlobalOptions) -> Result<Workspace> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(global.verbose);
    Workspace::open(&ctx)
}
