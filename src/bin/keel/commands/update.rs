//! `keel update` command

use anyhow::Result;

use crate::cli::UpdateArgs;
use crate::commands::open_workspace;
use crate::GlobalOptions;
use keel::ops::refresh_remote;
use keel::sources::GitRemote;
use keel::util::shell::Status;

pub fn execute(_args: UpdateArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let ws = open_workspace(global)?;
    let source = GitRemote::from_workspace(&ws)?;

    shell.status(Status::Fetching, source.index_url());
    let components = refresh_remote(&ws, &source)?;
    shell.status(
        Status::Updated,
        format!("{} components available", components.len()),
    );
    Ok(())
}
