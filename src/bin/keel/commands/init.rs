//! `keel init` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::InitArgs;
use crate::GlobalOptions;
use keel::util::config::{self, Config};
use keel::util::context::KEEL_DIR;
use keel::util::fs;
use keel::util::shell::Status;

pub fn execute(args: InitArgs, global: &GlobalOptions) -> Result<()> {
    let shell = &global.shell;
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    fs::ensure_dir(&root.join(KEEL_DIR))?;

    let config_path: PathBuf = config::project_config_path(&root);
    if config_path.exists() {
        shell.status(
            Status::Skipped,
            format!("{} already exists", config_path.display()),
        );
        return Ok(());
    }

    let mut config = Config::default();
    config.remote.index = args.index;
    config.save(&config_path)?;

    shell.status(
        Status::Created,
        format!("keel workspace at {}", root.display()),
    );
    Ok(())
}
