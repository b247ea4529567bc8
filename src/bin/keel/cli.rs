//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;
use keel::util::shell::ColorChoice;

/// Keel - component resolution for embedded SDK workspaces
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mark a directory as a keel workspace
    Init(InitArgs),

    /// List the components of the workspace
    List(ListArgs),

    /// Show what a component depends on
    Deps(DepsArgs),

    /// Resolve the current solution for a board
    Resolve(ResolveArgs),

    /// Install a component and its dependencies from the remote index
    Install(InstallArgs),

    /// Remove a component and the dependencies nothing else uses
    Remove(RemoveArgs),

    /// Refresh the remote component list
    Update(UpdateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Git URL of the remote component index
    #[arg(long)]
    pub index: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// List components available from the remote index instead
    #[arg(long)]
    pub remote: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Component name
    pub name: String,

    /// Show the components that depend on it instead
    #[arg(long)]
    pub dependents: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Board to build for
    #[arg(short, long)]
    pub board: Option<String>,

    /// Solution to resolve (defaults to the current directory)
    #[arg(long)]
    pub solution: Option<String>,

    /// Report missing components without failing
    #[arg(long)]
    pub no_exit_if_lost: bool,

    /// Compiler to build with
    #[arg(long)]
    pub compiler: Option<String>,

    /// Print the dependency chain
    #[arg(long)]
    pub print_depends: bool,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Component name
    pub name: String,

    /// Branch or tag to install
    #[arg(short = 'b', long = "branch")]
    pub version: Option<String>,

    /// Reinstall even if already present
    #[arg(short, long)]
    pub force: bool,

    /// Refresh the remote component list first
    #[arg(long)]
    pub update: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Component name
    pub name: String,
}

#[derive(Args)]
pub struct UpdateArgs {}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
