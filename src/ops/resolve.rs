//! Solution resolution: from a solution directory to a build-ready component set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexSet;

use crate::core::{ComponentKind, ComponentSet, DependOptions, Dependency, Workspace};
use crate::ops::solution::{Solution, SolutionBuilder};
use crate::resolver::{OptionalDepend, ResolveError};
use crate::util::process::ProcessBuilder;

/// Options for [`resolve_solution`].
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Board to build for; defaults to the solution's own board
    pub board: Option<String>,

    /// Solution to resolve; defaults to the one in the current directory
    pub solution: Option<String>,

    /// Fail instead of returning `None` when dependencies are missing
    pub exit_if_lost: bool,

    /// Compiler override
    pub compiler: Option<String>,

    /// Log the dependency chain
    pub print_depends: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            board: None,
            solution: None,
            exit_if_lost: true,
            compiler: None,
            print_depends: false,
        }
    }
}

/// A resolved solution.
#[derive(Debug, Clone)]
pub struct SolutionResolution {
    pub solution: String,
    pub board: Option<String>,

    /// Every selected component, the solution included
    pub components: ComponentSet,

    /// Names required unconditionally, the parents included
    pub mandatory: IndexSet<String>,

    /// Components reachable only through conditional dependencies
    pub optional: Vec<OptionalDepend>,

    /// Sorted `parent -> child` lines
    pub chain: Vec<String>,

    pub built: Solution,
}

/// Result of [`resolve_solution`].
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    Resolved(Box<SolutionResolution>),

    /// Dependencies stayed missing and `exit_if_lost` was off
    Missing(Vec<Dependency>),
}

impl ResolveOutcome {
    pub fn into_resolved(self) -> Option<SolutionResolution> {
        match self {
            ResolveOutcome::Resolved(res) => Some(*res),
            ResolveOutcome::Missing(_) => None,
        }
    }

    /// Dependencies that could not be found; empty when resolved.
    pub fn missing(&self) -> &[Dependency] {
        match self {
            ResolveOutcome::Resolved(_) => &[],
            ResolveOutcome::Missing(missing) => missing,
        }
    }
}

/// Installs a component that is missing from the workspace.
pub trait MissingInstaller {
    fn install(&self, root: &Path, name: &str, version: Option<&str>) -> Result<()>;
}

/// Runs `<program> install <name> [-b <version>]` in the workspace root.
#[derive(Debug, Clone)]
pub struct SubcommandInstaller {
    program: PathBuf,
}

impl SubcommandInstaller {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        SubcommandInstaller {
            program: program.into(),
        }
    }

    /// Re-invoke the running executable.
    pub fn current_exe() -> Result<Self> {
        let program = std::env::current_exe().context("failed to locate the keel executable")?;
        Ok(Self::new(program))
    }

    fn command(&self, root: &Path, name: &str, version: Option<&str>) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .arg("install")
            .arg(name)
            .cwd(root);
        if let Some(version) = version {
            cmd = cmd.arg("-b").arg(version);
        }
        cmd
    }
}

impl MissingInstaller for SubcommandInstaller {
    fn install(&self, root: &Path, name: &str, version: Option<&str>) -> Result<()> {
        let cmd = self.command(root, name, version);
        tracing::info!("running `{}`", cmd.display_command());
        cmd.exec_and_check()?;
        Ok(())
    }
}

struct Attempt {
    exclude: IndexSet<String>,
    components: ComponentSet,
    missing: Vec<Dependency>,
    chain: Vec<String>,
}

/// Resolve the solution named by `options` (or found in the current directory).
///
/// Missing dependencies are handed to `installer` once; if every install
/// succeeds the workspace is rescanned and resolved again. When dependencies
/// stay missing this fails with `UnresolvedDependency`, or returns
/// [`ResolveOutcome::Missing`] if `exit_if_lost` is off.
pub fn resolve_solution(
    ws: &mut Workspace,
    options: &ResolveOptions,
    installer: &dyn MissingInstaller,
    builder: &dyn SolutionBuilder,
) -> Result<ResolveOutcome> {
    let solution = ws.current_solution(options.solution.as_deref())?;
    tracing::debug!("resolving solution `{}`", solution);

    let mut attempt = resolve_once(ws, &solution, options.board.as_deref())?;

    if !attempt.missing.is_empty() && install_missing(ws, installer, &attempt.missing) {
        ws.rescan()?;
        attempt = resolve_once(ws, &solution, options.board.as_deref())?;
    }

    if !attempt.missing.is_empty() {
        let err = ResolveError::unresolved(&attempt.missing);
        if options.exit_if_lost {
            return Err(err.into());
        }
        tracing::warn!("{}", err);
        return Ok(ResolveOutcome::Missing(attempt.missing));
    }

    let board = board_of(ws, &solution);
    let mut components = attempt.components;
    components.insert(solution.clone());

    let mut parents: IndexSet<String> = IndexSet::new();
    parents.insert(solution.clone());
    if let Some(board) = &board {
        parents.insert(board.clone());
    }

    let (mandatory, optional) = ws.resolve_conditions(&components, &parents, &attempt.exclude);

    if options.print_depends {
        for line in &attempt.chain {
            tracing::info!("{}", line);
        }
    }

    let compiler = options
        .compiler
        .clone()
        .unwrap_or_else(|| ws.config().compiler().to_string());
    let built = builder.build(ws, &components, &compiler)?;

    Ok(ResolveOutcome::Resolved(Box::new(SolutionResolution {
        solution,
        board,
        components,
        mandatory,
        optional,
        chain: attempt.chain,
        built,
    })))
}

fn board_of(ws: &Workspace, solution: &str) -> Option<String> {
    ws.component(solution)
        .and_then(|c| c.record().board_name.clone())
}

/// Select the board, compute the closure and filter what is missing.
fn resolve_once(ws: &mut Workspace, solution: &str, requested: Option<&str>) -> Result<Attempt> {
    ws.group_mut().load(solution)?;
    if let (Some(board), Some(sol)) = (requested, ws.group_mut().get_mut(solution)) {
        sol.record_mut().board_name = Some(board.to_string());
    }
    let board = board_of(ws, solution);

    let declared: Vec<Dependency> = ws
        .component(solution)
        .map(|c| c.depends().to_vec())
        .unwrap_or_default();

    let mut exclude = IndexSet::new();
    for dep in &declared {
        if !ws.group_mut().load(dep.name())? {
            continue;
        }
        let is_board = ws
            .component(dep.name())
            .is_some_and(|c| c.kind() == ComponentKind::Board);
        if is_board && board.as_deref() != Some(dep.name()) {
            tracing::debug!("excluding board `{}`", dep.name());
            exclude.insert(dep.name().to_string());
        }
    }

    if let Some(board) = &board {
        select_board(ws, solution, board, &declared);
    }

    let closure = ws.group_mut().resolve_depends(
        solution,
        &DependOptions {
            exclude: exclude.clone(),
            mandatory_only: false,
        },
    )?;

    let mut resolved = closure.components.clone();
    resolved.insert(solution);
    let mut missing = closure.unresolved;
    ws.filter_still_needed(&resolved, &mut missing);

    Ok(Attempt {
        exclude,
        components: closure.components,
        missing,
        chain: closure.chain,
    })
}

/// Make `board` a dependency of the solution if it is a supported board.
fn select_board(ws: &mut Workspace, solution: &str, board: &str, declared: &[Dependency]) {
    if !ws.group().contains(board) {
        tracing::warn!(
            "board `{}` is not in the workspace, try `keel install {}`",
            board,
            board
        );
    }

    if declared.iter().any(|d| d.name() == board) {
        return;
    }

    let Some(sol) = ws.group_mut().get_mut(solution) else {
        return;
    };
    let supported = sol
        .record()
        .supported_boards
        .iter()
        .find(|d| d.name() == board)
        .cloned();

    match supported {
        Some(dep) => sol.record_mut().depends.push(dep),
        None => tracing::warn!(
            "board `{}` is not supported by `{}`",
            board,
            solution
        ),
    }
}

/// Try to install every missing dependency. Returns true if all succeeded.
fn install_missing(ws: &Workspace, installer: &dyn MissingInstaller, missing: &[Dependency]) -> bool {
    if ws.config().install.disable_auto_install {
        tracing::debug!("auto install is disabled");
        return false;
    }

    let mut ok = true;
    for dep in missing {
        tracing::info!("installing missing component `{}`", dep.name());
        if let Err(e) = installer.install(ws.root(), dep.name(), dep.version_constraint()) {
            tracing::warn!("failed to install `{}`: {:#}", dep.name(), e);
            ok = false;
        }
    }
    ok
}
