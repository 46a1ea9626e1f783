//! External tool invocation
//!
//! An [`ExternalToolInvocation`] is the fully assembled command for one compile or link
//! step. It is built by the adapter, handed to a [`ToolRunner`], and discarded.

use crate::error::{BuildError, BuildResult};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Command;

/// Program name and argument vector for one external tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalToolInvocation {
    program: String,
    args: Vec<OsString>,
}

impl ExternalToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(&mut self, path: &Path) -> &mut Self {
        self.args.push(path.as_os_str().to_owned());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Program followed by arguments, lossily converted for inspection
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect()
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ExternalToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Executes invocations on behalf of a compiler
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ExternalToolInvocation) -> BuildResult<()>;
}

/// Spawns the tool as a child process and blocks until it exits.
///
/// stdout and stderr are inherited so the tool's diagnostics reach the user directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ExternalToolInvocation) -> BuildResult<()> {
        let status = invocation
            .to_command()
            .status()
            .map_err(|source| BuildError::Spawn {
                program: invocation.program().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::ToolFailed {
                command: invocation.to_string(),
                status,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_starts_with_program() {
        let mut inv = ExternalToolInvocation::new("nvcc");
        inv.arg("-O").path_arg(Path::new("k.cu"));
        assert_eq!(inv.argv(), vec!["nvcc", "-O", "k.cu"]);
        assert_eq!(inv.to_string(), "nvcc -O k.cu");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let inv = ExternalToolInvocation::new("nvext-definitely-not-a-real-tool");
        match ProcessRunner.run(&inv) {
            Err(BuildError::Spawn { program, .. }) => {
                assert_eq!(program, "nvext-definitely-not-a-real-tool")
            },
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_tool_failure() {
        let mut inv = ExternalToolInvocation::new("sh");
        inv.args(["-c", "exit 3"]);
        match ProcessRunner.run(&inv) {
            Err(BuildError::ToolFailed { status, .. }) => assert_eq!(status.code(), Some(3)),
            other => panic!("expected tool failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zero_exit_is_ok() {
        let inv = ExternalToolInvocation::new("true");
        assert!(ProcessRunner.run(&inv).is_ok());
    }
}
