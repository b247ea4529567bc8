//! `keel install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::commands::open_workspace;
use crate::GlobalOptions;
use keel::ops::{execute_install, plan_install, InstallOptions, InstallOutcome};
use keel::sources::{FetchJob, FetchOutcome, GitRemote};
use keel::util::shell::Status;

pub fn execute(args: InstallArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let mut ws = open_workspace(global)?;
    let source = GitRemote::from_workspace(&ws)?;

    let options = InstallOptions {
        version: args.version,
        force: args.force,
        update: args.update,
        ..Default::default()
    };

    let Some(jobs) = plan_install(&ws, &source, &args.name, &options)? else {
        shell.status(
            Status::Skipped,
            format!("`{}` is already installed, use --force to reinstall", args.name),
        );
        return Ok(());
    };

    let progress = shell.progress(jobs.len() as u64, "Fetching");
    let report = |job: &FetchJob, outcome: &FetchOutcome| {
        match outcome {
            FetchOutcome::Fetched => progress.println(
                Status::Installed,
                format!("{} ({})", job.component.name, job.reference),
            ),
            FetchOutcome::Failed(reason) => progress.println(
                Status::Error,
                format!("{}: {}", job.component.name, reason),
            ),
            FetchOutcome::Cancelled => {
                progress.println(Status::Skipped, format!("{} (cancelled)", job.component.name))
            }
        }
        progress.inc(1);
    };

    let outcome = execute_install(&mut ws, &source, &jobs, &options, &report);
    progress.finish();

    if let InstallOutcome::Installed(names) = outcome? {
        shell.status(
            Status::Finished,
            format!("installed {} component(s)", names.len()),
        );
    }
    Ok(())
}
