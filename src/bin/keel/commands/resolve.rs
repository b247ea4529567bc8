//! `keel resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::open_workspace;
use crate::GlobalOptions;
use keel::core::condition::format_flags;
use keel::ops::{
    resolve_solution, DefaultSolutionBuilder, ResolveOptions, ResolveOutcome, SubcommandInstaller,
};
use keel::ResolveError;
use keel::util::diagnostic::{self, Diagnostic};
use keel::util::shell::Status;

pub fn execute(args: ResolveArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let mut ws = open_workspace(global)?;

    let options = ResolveOptions {
        board: args.board,
        solution: args.solution,
        exit_if_lost: !args.no_exit_if_lost,
        compiler: args.compiler,
        print_depends: args.print_depends,
    };

    let span = shell.span(Status::Resolving, "solution");
    let installer = SubcommandInstaller::current_exe()?;
    let res = match resolve_solution(&mut ws, &options, &installer, &DefaultSolutionBuilder)? {
        ResolveOutcome::Resolved(res) => res,
        ResolveOutcome::Missing(missing) => {
            for dep in &missing {
                let diag = Diagnostic::warning(format!("`{}` is missing", dep.name()));
                diagnostic::emit(&diag, shell.use_color());
            }
            return Err(ResolveError::unresolved(&missing).into());
        }
    };

    for component in &res.built.components {
        shell.status(
            Status::Info,
            format!("{} {}", component.name, component.version),
        );
    }
    for optional in &res.optional {
        let conditions: Vec<String> = optional
            .conditions
            .iter()
            .map(|flags| format_flags(flags))
            .collect();
        shell.note(format!(
            "`{}` is needed when {}",
            optional.name,
            conditions.join(" or ")
        ));
    }

    let board = res.board.as_deref().unwrap_or("no board");
    span.finish_with_message(format!(
        "`{}` for {} with {} ({} components)",
        res.solution,
        board,
        res.built.compiler,
        res.components.len()
    ));
    Ok(())
}
