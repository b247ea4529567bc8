//! On-disk fixtures: SDK workspaces and git repositories in temp dirs.

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

use crate::core::{Workspace, MANIFEST_NAME};
use crate::util::context::KEEL_DIR;
use crate::util::GlobalContext;

/// An SDK workspace in a temp dir, marked with `.keel/`.
pub struct WorkspaceFixture {
    tmp: TempDir,
}

impl WorkspaceFixture {
    /// An empty workspace.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        std::fs::create_dir_all(tmp.path().join(KEEL_DIR)).expect("failed to create .keel");
        WorkspaceFixture { tmp }
    }

    /// A small SDK: one board, the kernel, a driver, and a solution.
    ///
    /// `demo -> uart -> rhino`; `demo` supports `boardA`.
    pub fn demo() -> Self {
        let fixture = Self::new();
        fixture.write(
            "hardware/board/boardA",
            "name: boardA\nversion: v1.0\ntype: board\n",
        );
        fixture.write("kernel/rhino", "name: rhino\nversion: v7.4\ntype: kernel\n");
        fixture.write(
            "components/drivers/peripheral/uart",
            "name: uart\nversion: master\ntype: drv_peripheral\ndepends:\n  - rhino: v7.4\n",
        );
        fixture.write(
            "solutions/demo",
            "name: demo\nversion: v1.0\ntype: solution\ndepends:\n  - uart\nsupported_boards:\n  - boardA\n",
        );
        fixture
    }

    /// Write `package.yaml` into `rel_dir`.
    pub fn write(&self, rel_dir: &str, manifest: &str) {
        let dir = self.root().join(rel_dir);
        std::fs::create_dir_all(&dir).expect("failed to create component dir");
        std::fs::write(dir.join(MANIFEST_NAME), manifest).expect("failed to write manifest");
    }

    /// Write `.keel/config.toml`.
    pub fn config(&self, contents: &str) {
        std::fs::write(self.root().join(KEEL_DIR).join("config.toml"), contents)
            .expect("failed to write config");
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// A context run from the workspace root, isolated from the real home.
    pub fn context(&self) -> GlobalContext {
        self.context_in("")
    }

    /// A context run from `rel` inside the workspace.
    pub fn context_in(&self, rel: &str) -> GlobalContext {
        let cwd = if rel.is_empty() {
            self.root().to_path_buf()
        } else {
            self.root().join(rel)
        };
        GlobalContext::with_cwd(cwd)
            .expect("failed to create context")
            .with_home(self.root().join(".home"))
    }

    /// Open the workspace from its root.
    pub fn open(&self) -> Workspace {
        Workspace::open(&self.context()).expect("failed to open workspace")
    }
}

impl Default for WorkspaceFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-bare git repository in a temp dir.
pub struct GitRepoFixture {
    tmp: TempDir,
    repo: Repository,
}

impl GitRepoFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let repo = Repository::init(tmp.path()).expect("failed to init repository");
        GitRepoFixture { tmp, repo }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// URL to clone from.
    pub fn url(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path: PathBuf = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dir");
        }
        std::fs::write(path, contents).expect("failed to write file");
    }

    /// Commit every file on the current branch.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = Signature::now("keel", "keel@example.com").expect("signature");
        let mut index = self.repo.index().expect("index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("add files");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }

    pub fn tag(&self, name: &str, commit: Oid) {
        let object = self.repo.find_object(commit, None).expect("find commit");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("create tag");
    }

    pub fn branch(&self, name: &str, commit: Oid) {
        let commit = self.repo.find_commit(commit).expect("find commit");
        self.repo.branch(name, &commit, false).expect("create branch");
    }
}

impl Default for GitRepoFixture {
    fn default() -> Self {
        Self::new()
    }
}
