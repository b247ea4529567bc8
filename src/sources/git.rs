//! Git-backed remote: an index repository listing components, and one
//! repository per component.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git2::{Commit, Repository, ResetType};
use serde::Deserialize;

use crate::core::{Workspace, MANIFEST_NAME};
use crate::sources::{RemoteComponent, RemoteSource};
use crate::util::diagnostic::suggestions;
use crate::util::fs;

/// File at the root of the index repository.
pub const INDEX_FILE: &str = "components.yaml";

const FETCH_REFSPECS: &[&str] = &[
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

#[derive(Debug, Default, Deserialize)]
struct IndexFile {
    #[serde(default)]
    remotes: Vec<IndexRemote>,

    #[serde(default)]
    components: Vec<IndexEntry>,
}

/// A named base URL component repositories can live under.
#[derive(Debug, Deserialize)]
struct IndexRemote {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    #[serde(flatten)]
    component: RemoteComponent,

    /// Name of an entry in `remotes`, used when `url` is empty
    #[serde(default)]
    remote: Option<String>,
}

/// Components listed by a git index repository.
#[derive(Debug, Clone)]
pub struct GitRemote {
    /// URL of the index repository
    index_url: String,

    /// Branch of the index to read
    branch: String,

    /// Local checkout of the index
    index_dir: PathBuf,
}

impl GitRemote {
    pub fn new(index_url: impl Into<String>, branch: impl Into<String>, index_dir: impl Into<PathBuf>) -> Self {
        GitRemote {
            index_url: index_url.into(),
            branch: branch.into(),
            index_dir: index_dir.into(),
        }
    }

    /// Create the remote configured for a workspace.
    pub fn from_workspace(ws: &Workspace) -> Result<Self> {
        let Some(index) = ws.config().remote.index.as_deref() else {
            bail!(
                "no remote component index is configured\n{}",
                suggestions::NO_REMOTE
            );
        };
        Ok(GitRemote::new(index, ws.config().branch(), ws.index_dir()))
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Clone or update the index checkout.
    pub fn sync_index(&self) -> Result<()> {
        let repo = open_or_clone(&self.index_url, &self.index_dir)?;
        checkout(&repo, &self.branch)
    }

    /// Read the components listed by the local index checkout.
    pub fn read_index(&self) -> Result<Vec<RemoteComponent>> {
        let path = self.index_dir.join(INDEX_FILE);
        let contents = fs::read_to_string(&path)?;
        let index: IndexFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let mut components = Vec::with_capacity(index.components.len());
        for entry in index.components {
            let mut component = entry.component;
            if component.url.is_empty() {
                let base = entry
                    .remote
                    .as_deref()
                    .and_then(|name| index.remotes.iter().find(|r| r.name == name));
                match base {
                    Some(remote) => {
                        component.url = format!(
                            "{}/{}.git",
                            remote.url.trim_end_matches('/'),
                            component.name
                        );
                    }
                    None => {
                        tracing::warn!("`{}` has no repository URL, skipped", component.name);
                        continue;
                    }
                }
            }
            components.push(component);
        }

        Ok(components)
    }
}

impl RemoteSource for GitRemote {
    fn name(&self) -> &str {
        &self.index_url
    }

    fn list_available(&self) -> Result<Vec<RemoteComponent>> {
        self.sync_index()?;
        self.read_index()
    }

    fn fetch(&self, component: &RemoteComponent, reference: &str, dest: &Path) -> Result<()> {
        if component.url.is_empty() {
            bail!("`{}` has no repository URL", component.name);
        }

        let repo = open_or_clone(&component.url, dest)?;
        checkout(&repo, reference)?;

        if !dest.join(MANIFEST_NAME).is_file() {
            tracing::warn!(
                "`{}` at `{}` has no {}",
                component.name,
                reference,
                MANIFEST_NAME
            );
        }
        Ok(())
    }
}

/// Open an existing checkout and fetch, or clone a fresh one.
fn open_or_clone(url: &str, dest: &Path) -> Result<Repository> {
    if dest.join(".git").exists() {
        tracing::info!("updating {}", url);
        let repo = Repository::open(dest)
            .with_context(|| format!("failed to open git repository: {}", dest.display()))?;
        {
            let mut remote = repo
                .find_remote("origin")
                .with_context(|| format!("{} has no `origin` remote", dest.display()))?;
            remote
                .fetch(FETCH_REFSPECS, None, None)
                .with_context(|| format!("failed to fetch {}", url))?;
        }
        return Ok(repo);
    }

    if dest.exists() && dest.read_dir().is_ok_and(|mut d| d.next().is_some()) {
        bail!(
            "`{}` already exists and is not a git checkout",
            dest.display()
        );
    }

    tracing::info!("cloning {}", url);
    if let Some(parent) = dest.parent() {
        fs::ensure_dir(parent)?;
    }
    Repository::clone(url, dest).with_context(|| format!("failed to clone {}", url))
}

/// Find `reference` as a remote branch, a tag, or a local branch.
fn find_commit<'r>(repo: &'r Repository, reference: &str) -> Option<Commit<'r>> {
    [
        format!("refs/remotes/origin/{}", reference),
        format!("refs/tags/{}", reference),
        format!("refs/heads/{}", reference),
    ]
    .iter()
    .find_map(|name| repo.find_reference(name).ok()?.peel_to_commit().ok())
}

/// The commit the remote's default branch points at.
fn default_branch(repo: &Repository) -> Result<Commit<'_>, git2::Error> {
    match repo.find_reference("refs/remotes/origin/HEAD") {
        Ok(reference) => reference.peel_to_commit(),
        Err(_) => repo.head()?.peel_to_commit(),
    }
}

/// Check out `reference`, falling back to the default branch.
fn checkout(repo: &Repository, reference: &str) -> Result<()> {
    let commit = match find_commit(repo, reference) {
        Some(commit) => commit,
        None => {
            tracing::warn!("no branch or tag `{}`, using the default branch", reference);
            default_branch(repo).context("repository has no default branch")?
        }
    };

    tracing::debug!("checking out {} for `{}`", commit.id(), reference);
    repo.set_head_detached(commit.id())?;
    repo.reset(commit.as_object(), ResetType::Hard, None)
        .with_context(|| format!("failed to check out `{}`", reference))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ComponentKind;
    use crate::test_support::GitRepoFixture;
    use tempfile::TempDir;

    fn uart_repo() -> GitRepoFixture {
        let repo = GitRepoFixture::new();
        repo.write(MANIFEST_NAME, "name: uart\nversion: v1.0\n");
        let first = repo.commit("v1.0");
        repo.tag("v1.0", first);
        repo.branch("stable", first);
        repo.write(MANIFEST_NAME, "name: uart\nversion: v2.0\n");
        repo.commit("v2.0");
        repo
    }

    fn uart(url: &str) -> RemoteComponent {
        RemoteComponent::new("uart", ComponentKind::DrvPeripheral, "v2.0").with_url(url)
    }

    fn version_at(dest: &Path) -> String {
        crate::core::manifest::load_record(dest).unwrap().version
    }

    #[test]
    fn test_fetch_tag_and_branch() {
        let upstream = uart_repo();
        let tmp = TempDir::new().unwrap();
        let remote = GitRemote::new("unused", "master", tmp.path().join("index"));

        let dest = tmp.path().join("components/uart");
        remote.fetch(&uart(&upstream.url()), "v1.0", &dest).unwrap();
        assert_eq!(version_at(&dest), "v1.0");

        // Existing checkout is updated in place.
        remote.fetch(&uart(&upstream.url()), "stable", &dest).unwrap();
        assert_eq!(version_at(&dest), "v1.0");
    }

    #[test]
    fn test_unknown_reference_falls_back_to_default_branch() {
        let upstream = uart_repo();
        let tmp = TempDir::new().unwrap();
        let remote = GitRemote::new("unused", "master", tmp.path().join("index"));

        let dest = tmp.path().join("uart");
        remote.fetch(&uart(&upstream.url()), "no-such-ref", &dest).unwrap();
        assert_eq!(version_at(&dest), "v2.0");
    }

    #[test]
    fn test_fetch_refuses_non_git_directory() {
        let upstream = uart_repo();
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("uart");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("local.c"), "").unwrap();

        let remote = GitRemote::new("unused", "master", tmp.path().join("index"));
        assert!(remote.fetch(&uart(&upstream.url()), "v1.0", &dest).is_err());
    }

    #[test]
    fn test_list_available_from_index() {
        let index = GitRepoFixture::new();
        index.write(
            INDEX_FILE,
            r#"
remotes:
  - name: main
    url: https://git.example.com/sdk/
components:
  - name: rhino
    type: kernel
    version: v7.4
    remote: main
  - name: uart
    type: drv_peripheral
    version: v1.0
    url: https://other.example.com/uart.git
    depends:
      - rhino
  - name: orphan
    remote: missing
"#,
        );
        index.commit("index");

        let tmp = TempDir::new().unwrap();
        let remote = GitRemote::new(index.url(), "no-such-branch", tmp.path().join("index"));
        let components = remote.list_available().unwrap();

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].url, "https://git.example.com/sdk/rhino.git");
        assert_eq!(components[0].kind, ComponentKind::Kernel);
        assert_eq!(components[1].dependencies()[0].name(), "rhino");
    }
}
