//! CLI integration tests for keel.
//!
//! These tests drive the binary against small SDK workspaces on disk.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the keel binary command, isolated from the real home directory.
fn keel(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keel").unwrap();
    cmd.env("HOME", home).arg("--color").arg("never");
    cmd
}

fn write_manifest(root: &Path, rel_dir: &str, manifest: &str) {
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.yaml"), manifest).unwrap();
}

/// `demo -> uart -> rhino`, with `boardA` as a supported board.
fn demo_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join(".keel")).unwrap();
    fs::write(
        root.join(".keel/config.toml"),
        "[install]\ndisable_auto_install = true\n",
    )
    .unwrap();

    write_manifest(root, "hardware/board/boardA", "name: boardA\ntype: board\n");
    write_manifest(root, "kernel/rhino", "name: rhino\nversion: v7.4\ntype: kernel\n");
    write_manifest(
        root,
        "components/drivers/peripheral/uart",
        "name: uart\nversion: master\ntype: drv_peripheral\ndepends:\n  - rhino\n  - wifi: \"? <CONFIG_WIFI>\"\n",
    );
    write_manifest(
        root,
        "solutions/demo",
        "name: demo\ntype: solution\ndepends:\n  - uart\nsupported_boards:\n  - boardA\n",
    );
    tmp
}

// ============================================================================
// keel init
// ============================================================================

#[test]
fn test_init_creates_config() {
    let tmp = TempDir::new().unwrap();

    keel(tmp.path())
        .args(["init", "--index", "https://git.example.com/index.git"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let config = fs::read_to_string(tmp.path().join(".keel/config.toml")).unwrap();
    assert!(config.contains("https://git.example.com/index.git"));

    keel(tmp.path())
        .arg("init")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_outside_workspace_suggests_init() {
    let tmp = TempDir::new().unwrap();

    keel(tmp.path())
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("keel init"));
}

// ============================================================================
// keel list / deps
// ============================================================================

#[test]
fn test_list_components() {
    let ws = demo_workspace();

    keel(ws.path())
        .arg("list")
        .current_dir(ws.path().join("components"))
        .assert()
        .success()
        .stdout(predicate::str::contains("boardA"))
        .stdout(predicate::str::contains("drv_peripheral"))
        .stdout(predicate::str::contains("solutions/demo"));
}

#[test]
fn test_deps_and_dependents() {
    let ws = demo_workspace();

    keel(ws.path())
        .args(["deps", "demo"])
        .current_dir(ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("uart"))
        .stdout(predicate::str::contains("rhino"));

    keel(ws.path())
        .args(["deps", "rhino", "--dependents"])
        .current_dir(ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("uart"))
        .stdout(predicate::str::contains("demo").not());
}

// ============================================================================
// keel resolve
// ============================================================================

#[test]
fn test_resolve_solution() {
    let ws = demo_workspace();

    keel(ws.path())
        .args(["resolve", "-b", "boardA"])
        .current_dir(ws.path().join("solutions/demo"))
        .assert()
        .success()
        .stderr(predicate::str::contains("`demo` for boardA"))
        .stderr(predicate::str::contains("4 components"))
        .stderr(predicate::str::contains("`wifi` is needed when CONFIG_WIFI"));
}

#[test]
fn test_resolve_reports_every_missing_component() {
    let ws = demo_workspace();
    write_manifest(
        ws.path(),
        "solutions/demo",
        "name: demo\ntype: solution\ndepends:\n  - uart\n  - kv\n  - fatfs: v1.0\n",
    );

    keel(ws.path())
        .args(["resolve", "--solution", "demo"])
        .current_dir(ws.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("2 required component(s)"))
        .stderr(predicate::str::contains("kv"))
        .stderr(predicate::str::contains("fatfs"));

    keel(ws.path())
        .args(["resolve", "--solution", "demo", "--no-exit-if-lost"])
        .current_dir(ws.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("`kv` is missing"))
        .stderr(predicate::str::contains("`fatfs` is missing"));
}

#[test]
fn test_resolve_outside_solution() {
    let ws = demo_workspace();

    keel(ws.path())
        .arg("resolve")
        .current_dir(ws.path())
        .assert()
        .failure()
        .code(1);
}

// ============================================================================
// keel remove
// ============================================================================

#[test]
fn test_remove_blocked_by_dependents() {
    let ws = demo_workspace();

    keel(ws.path())
        .args(["remove", "rhino"])
        .current_dir(ws.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("required by `uart`"));

    assert!(ws.path().join("kernel/rhino/package.yaml").exists());
}

#[test]
fn test_remove_cascades() {
    let ws = demo_workspace();

    keel(ws.path())
        .args(["remove", "demo"])
        .current_dir(ws.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"));

    assert!(!ws.path().join("solutions/demo").exists());
    assert!(!ws.path().join("components/drivers/peripheral/uart").exists());
    assert!(!ws.path().join("kernel/rhino").exists());
    assert!(ws.path().join("hardware/board/boardA").exists());
}

// ============================================================================
// keel install / update
// ============================================================================

#[test]
fn test_install_without_remote() {
    let ws = demo_workspace();

    keel(ws.path())
        .args(["install", "kv"])
        .current_dir(ws.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote.index"));
}

// ============================================================================
// keel completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    keel(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keel"));
}
