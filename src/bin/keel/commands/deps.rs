//! `keel deps` command

use anyhow::Result;

use crate::cli::DepsArgs;
use crate::commands::open_workspace;
use crate::GlobalOptions;
use keel::util::shell::Status;

pub fn execute(args: DepsArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let mut ws = open_workspace(global)?;

    if args.dependents {
        let dependents = ws.dependents_of(&args.name)?;
        if dependents.is_empty() {
            shell.status(Status::Info, format!("nothing depends on `{}`", args.name));
        }
        for name in dependents {
            shell.print(name);
        }
        return Ok(());
    }

    let depends = ws.mandatory_depends(&args.name)?;
    if depends.is_empty() {
        shell.status(Status::Info, format!("`{}` has no dependencies", args.name));
    }
    for component in depends.components(ws.group()) {
        shell.print(format!("{:<24} {}", component.name(), component.version()));
    }
    Ok(())
}
