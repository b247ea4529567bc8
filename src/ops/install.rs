//! Installing components from a remote source.

use anyhow::Result;

use crate::core::{ComponentGroup, DependOptions, Workspace};
use crate::resolver::ResolveError;
use crate::sources::{
    fetch_all, CancelToken, FetchJob, FetchOutcome, RemoteCache, RemoteComponent, RemoteSource,
};

/// Options for [`install`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Branch or tag of the requested component
    pub version: Option<String>,

    /// Fetch even when already installed
    pub force: bool,

    /// Refresh the remote component list first
    pub update: bool,

    pub cancel: CancelToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,

    /// Names fetched, in closure order
    Installed(Vec<String>),
}

/// Fetch the remote component list and cache it.
pub fn refresh_remote(ws: &Workspace, source: &dyn RemoteSource) -> Result<Vec<RemoteComponent>> {
    let components = source.list_available()?;
    RemoteCache::new(ws.remote_cache_path()).store(&components)?;
    tracing::info!("{} components available from {}", components.len(), source.name());
    Ok(components)
}

/// The remote component list, from the cache when there is one.
pub fn remote_components(
    ws: &Workspace,
    source: &dyn RemoteSource,
    update: bool,
) -> Result<Vec<RemoteComponent>> {
    if !update {
        if let Some(cached) = RemoteCache::new(ws.remote_cache_path()).load()? {
            return Ok(cached);
        }
    }
    refresh_remote(ws, source)
}

/// Install `name` and the unconditional dependencies it needs.
///
/// `on_done` is called from the fetch workers as each component finishes.
pub fn install(
    ws: &mut Workspace,
    source: &dyn RemoteSource,
    name: &str,
    options: &InstallOptions,
    on_done: &(dyn Fn(&FetchJob, &FetchOutcome) + Sync),
) -> Result<InstallOutcome> {
    match plan_install(ws, source, name, options)? {
        Some(jobs) => execute_install(ws, source, &jobs, options, on_done),
        None => Ok(InstallOutcome::AlreadyInstalled),
    }
}

/// Work out what installing `name` fetches.
///
/// Returns `None` when `name` is installed and `force` is off.
pub fn plan_install(
    ws: &Workspace,
    source: &dyn RemoteSource,
    name: &str,
    options: &InstallOptions,
) -> Result<Option<Vec<FetchJob>>> {
    if ws.component(name).is_some() && !options.force {
        tracing::info!("`{}` is already installed", name);
        return Ok(None);
    }

    let available = remote_components(ws, source, options.update)?;
    if !available.iter().any(|c| c.name == name) {
        return Err(ResolveError::ComponentNotFound {
            name: name.to_string(),
        }
        .into());
    }

    let mut remote = ComponentGroup::new();
    for component in &available {
        remote.add(component.to_component(ws.root()));
    }
    let closure = remote.resolve_depends(
        name,
        &DependOptions {
            mandatory_only: true,
            ..Default::default()
        },
    )?;
    for dep in &closure.unresolved {
        tracing::warn!("`{}` is not available from {}", dep.name(), source.name());
    }

    let mut order = vec![name.to_string()];
    order.extend(closure.components.iter().map(String::from));

    let mut jobs = Vec::new();
    for member in &order {
        if member != name && ws.component(member).is_some() && !options.force {
            tracing::debug!("`{}` is already installed", member);
            continue;
        }
        let Some(component) = available.iter().find(|c| &c.name == member) else {
            continue;
        };
        let reference = pick_version(&remote, &order, member, name, options, ws.config().branch());
        let dest = match ws.component(member) {
            Some(local) => local.path().to_path_buf(),
            None => ws.install_path(component.kind, member),
        };
        jobs.push(FetchJob {
            component: component.clone(),
            reference,
            dest,
        });
    }

    Ok(Some(jobs))
}

/// Fetch planned jobs, then rescan the workspace.
///
/// Fails with `FetchFailed` listing every component that was not fetched.
pub fn execute_install(
    ws: &mut Workspace,
    source: &dyn RemoteSource,
    jobs: &[FetchJob],
    options: &InstallOptions,
    on_done: &(dyn Fn(&FetchJob, &FetchOutcome) + Sync),
) -> Result<InstallOutcome> {
    let outcomes = fetch_all(source, jobs, ws.config().jobs(), &options.cancel, on_done)?;
    ws.rescan()?;

    let mut installed = Vec::new();
    let mut failed = Vec::new();
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            FetchOutcome::Fetched => installed.push(job.component.name.clone()),
            FetchOutcome::Failed(reason) => failed.push((job.component.name.clone(), reason)),
            FetchOutcome::Cancelled => {
                failed.push((job.component.name.clone(), "cancelled".to_string()))
            }
        }
    }

    if !failed.is_empty() {
        return Err(ResolveError::FetchFailed { failed }.into());
    }
    Ok(InstallOutcome::Installed(installed))
}

/// Version to check out for `member`.
///
/// The requested version wins for the root, then the constraint of the
/// first component in `order` that declares `member`, then the latest.
fn pick_version(
    remote: &ComponentGroup,
    order: &[String],
    member: &str,
    root: &str,
    options: &InstallOptions,
    default_branch: &str,
) -> String {
    if member == root {
        if let Some(version) = &options.version {
            return version.clone();
        }
    }

    let declared = order
        .iter()
        .filter_map(|parent| remote.get(parent))
        .flat_map(|parent| parent.depends())
        .find(|d| d.name() == member)
        .and_then(|d| d.version_constraint());
    if let Some(version) = declared {
        return version.to_string();
    }

    match remote.get(member).map(|c| c.version()) {
        Some(latest) if !latest.is_empty() => latest.to_string(),
        _ => default_branch.to_string(),
    }
}
