//! Remote component sources.

pub mod cache;
pub mod fetch;
pub mod git;
pub mod source;

pub use cache::RemoteCache;
pub use fetch::{fetch_all, CancelToken, FetchJob, FetchOutcome};
pub use git::GitRemote;
pub use source::{RemoteComponent, RemoteSource};
