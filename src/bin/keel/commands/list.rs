//! `keel list` command

use anyhow::Result;

use crate::cli::ListArgs;
use crate::commands::open_workspace;
use crate::GlobalOptions;
use keel::ops::remote_components;
use keel::sources::GitRemote;

pub fn execute(args: ListArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let mut ws = open_workspace(global)?;

    if args.remote {
        let source = GitRemote::from_workspace(&ws)?;
        for component in remote_components(&ws, &source, false)? {
            let installed = if ws.component(&component.name).is_some() {
                " (installed)"
            } else {
                ""
            };
            shell.print(format!(
                "{:<24} {:<12} {:<20}{}",
                component.name,
                component.version,
                component.kind.as_str(),
                installed
            ));
        }
        return Ok(());
    }

    ws.group_mut().load_all()?;
    let mut components: Vec<_> = ws.group().iter().collect();
    components.sort_by(|a, b| a.name().cmp(b.name()));

    for component in components {
        shell.print(format!(
            "{:<24} {:<12} {:<20} {}",
            component.name(),
            component.version(),
            component.kind().as_str(),
            component
                .path()
                .strip_prefix(ws.root())
                .unwrap_or(component.path())
                .display()
        ));
    }
    Ok(())
}
