//! Subprocess execution.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};

/// Builder for running a child process.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string_lossy().into_owned()));
        self
    }

    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Run to completion, capturing output.
    pub fn exec(&self) -> Result<Output> {
        self.build_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to run `{}`", self.display_command()))
    }

    /// Run to completion and fail on a non-zero exit.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(output)
    }

    /// The command line, for messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("keel").args(["install", "uart", "-b", "v1.0"]);
        assert_eq!(pb.display_command(), "keel install uart -b v1.0");
        assert_eq!(pb.get_args().len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_and_check() {
        let output = ProcessBuilder::new("sh")
            .args(["-c", "echo hello"])
            .exec_and_check()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");

        assert!(ProcessBuilder::new("sh")
            .args(["-c", "exit 3"])
            .exec_and_check()
            .is_err());
    }
}
