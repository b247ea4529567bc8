//! `keel remove` command

use anyhow::Result;

use crate::cli::RemoveArgs;
use crate::commands::open_workspace;
use crate::GlobalOptions;
use keel::util::shell::Status;

pub fn execute(args: RemoveArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let mut ws = open_workspace(global)?;

    for name in ws.remove(&args.name)? {
        shell.status(Status::Removed, name);
    }
    Ok(())
}
