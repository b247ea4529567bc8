//! Keel CLI - component resolution for embedded SDK workspaces

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use keel::resolver::ResolveError;
use keel::util::context::ContextError;
use keel::util::diagnostic::{self, suggestions, Diagnostic};
use keel::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// State shared by every command.
pub struct GlobalOptions {
    pub shell: Arc<Shell>,
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color));

    let filter = if cli.verbose {
        EnvFilter::new("keel=debug")
    } else {
        EnvFilter::new("keel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = GlobalOptions {
        shell: Arc::clone(&shell),
        verbose: cli.verbose,
    };

    if let Err(e) = run(cli.command, &global) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(command: Commands, global: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Init(args) => commands::init::execute(args, global),
        Commands::List(args) => commands::list::execute(args, global),
        Commands::Deps(args) => commands::deps::execute(args, global),
        Commands::Resolve(args) => commands::resolve::execute(args, global),
        Commands::Install(args) => commands::install::execute(args, global),
        Commands::Remove(args) => commands::remove::execute(args, global),
        Commands::Update(args) => commands::update::execute(args, global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(err: &anyhow::Error, shell: &Shell) {
    let diag = if let Some(e) = err.downcast_ref::<ResolveError>() {
        e.to_diagnostic()
    } else if let Some(e) = err.downcast_ref::<ContextError>() {
        Diagnostic::error(e.to_string()).with_suggestion(suggestions::NO_WORKSPACE)
    } else {
        Diagnostic::error(format!("{:#}", err))
    };
    diagnostic::emit(&diag, shell.use_color());
}
