//! Bulk fetching of remote components on a worker pool.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::sources::{RemoteComponent, RemoteSource};
use crate::util::fs;

/// One component to fetch.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub component: RemoteComponent,

    /// Branch or tag to check out
    pub reference: String,

    /// Directory the component is fetched into; owned by this job
    pub dest: PathBuf,
}

/// What happened to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    Failed(String),
    /// Cancelled before it started
    Cancelled,
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched)
    }
}

/// Stops jobs that have not started yet.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fetch every job using `workers` threads.
///
/// Outcomes are returned in job order. A failed job never stops the others.
/// `on_done` is called from the worker thread as each job finishes.
pub fn fetch_all(
    source: &dyn RemoteSource,
    jobs: &[FetchJob],
    workers: usize,
    cancel: &CancelToken,
    on_done: &(dyn Fn(&FetchJob, &FetchOutcome) + Sync),
) -> Result<Vec<FetchOutcome>> {
    let mut dests = HashSet::new();
    for job in jobs {
        if !dests.insert(fs::normalize_path(&job.dest)) {
            bail!(
                "`{}` is the destination of more than one fetch",
                job.dest.display()
            );
        }
    }

    let workers = workers.max(1);
    tracing::debug!(
        "fetching {} components from {} with {} workers",
        jobs.len(),
        source.name(),
        workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to start fetch workers")?;

    let outcomes: Vec<FetchOutcome> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let outcome = run_job(source, job, cancel);
                on_done(job, &outcome);
                outcome
            })
            .collect()
    });

    Ok(outcomes)
}

fn run_job(source: &dyn RemoteSource, job: &FetchJob, cancel: &CancelToken) -> FetchOutcome {
    if cancel.is_cancelled() {
        return FetchOutcome::Cancelled;
    }

    match source.fetch(&job.component, &job.reference, &job.dest) {
        Ok(()) => {
            tracing::info!("fetched `{}` ({})", job.component.name, job.reference);
            FetchOutcome::Fetched
        }
        Err(e) => {
            tracing::debug!("fetching `{}` failed: {:#}", job.component.name, e);
            FetchOutcome::Failed(format!("{:#}", e))
        }
    }
}
