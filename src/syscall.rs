// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External command execution.
//!
//! Bootstrapping is mostly a matter of calling other programs in the right
//! order: `git`, `cookiecutter`, `ln`, and `cp`. All of those calls go
//! through a [`CommandRunner`] so callers can swap in [`EchoRunner`] to see
//! what would happen without touching anything.

use std::{
    cell::RefCell,
    ffi::OsString,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use tracing::{info, instrument};

/// Run external programs.
pub trait CommandRunner {
    /// Run `program` with `args`, optionally inside `cwd`.
    ///
    /// Blocks until the program finishes. Standard input and output are
    /// inherited from the current process.
    ///
    /// # Errors
    ///
    /// - Return [`SyscallError::Spawn`] if program cannot be started.
    /// - Return [`SyscallError::Failed`] if program exits unsuccessfully.
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> Result<()>;

    /// Create directory and all of its missing parents.
    ///
    /// Existing directories are fine.
    ///
    /// # Errors
    ///
    /// - Return [`SyscallError::CreateDir`] if directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        mkdirp::mkdirp(path).map_err(|err| SyscallError::CreateDir {
            source: err,
            path: path.to_path_buf(),
        })?;

        Ok(())
    }

    /// Create symbolic link at `link` pointing to `target`.
    ///
    /// Shells out to `ln -s` where a shell provides it, and uses the
    /// platform's own symlink call everywhere else.
    ///
    /// # Errors
    ///
    /// - Return [`SyscallError`] if link cannot be created.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            self.run(
                "ln",
                &["-s".into(), target.into(), link.into()],
                None,
            )
        }

        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_dir(target, link).map_err(|err| {
                SyscallError::Symlink {
                    source: err,
                    link: link.to_path_buf(),
                }
            })
        }
    }
}

/// Run programs for real through [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip(self, args, cwd), level = "debug")]
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> Result<()> {
        let invocation = Invocation::new(program, args, cwd);
        info!("{invocation}");

        let mut command = Command::new(program);
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let status = command
            .spawn()
            .and_then(|mut child| child.wait())
            .map_err(|err| SyscallError::Spawn {
                source: err,
                program: program.into(),
            })?;

        if !status.success() {
            return Err(SyscallError::Failed {
                program: program.into(),
                status,
            });
        }

        Ok(())
    }
}

/// Print programs instead of running them.
///
/// Every call is echoed to standard output and recorded, so the full plan
/// can be inspected afterwards through [`EchoRunner::invocations`]. Directory
/// creation and symlinking are echoed as their shell equivalents.
#[derive(Debug, Default)]
pub struct EchoRunner {
    invocations: RefCell<Vec<Invocation>>,
}

impl EchoRunner {
    /// Construct new echo runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// All invocations recorded so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }
}

impl CommandRunner for EchoRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> Result<()> {
        let invocation = Invocation::new(program, args, cwd);
        println!("{invocation}");
        self.invocations.borrow_mut().push(invocation);

        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.run("mkdir", &["-p".into(), path.into()], None)
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.run("ln", &["-s".into(), target.into(), link.into()], None)
    }
}

/// Single call of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Construct new invocation record.
    pub fn new(program: impl Into<String>, args: &[OsString], cwd: Option<&Path>) -> Self {
        Self {
            program: program.into(),
            args: args.to_vec(),
            cwd: cwd.map(Path::to_path_buf),
        }
    }
}

impl Display for Invocation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        if let Some(cwd) = &self.cwd {
            write!(fmt, "({}) ", cwd.display())?;
        }

        fmt.write_str(&self.program)?;
        for arg in &self.args {
            write!(fmt, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}

/// External command error types.
#[derive(Debug, thiserror::Error)]
pub enum SyscallError {
    /// Program could not be started at all.
    #[error("failed to run command {program:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        program: String,
    },

    /// Program ran, but did not exit successfully.
    #[error("command {program:?} failed with {status}")]
    Failed { program: String, status: ExitStatus },

    /// Directory could not be created.
    #[error("failed to create directory at {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Symbolic link could not be created.
    #[error("failed to create symlink at {:?}", link.display())]
    Symlink {
        #[source]
        source: std::io::Error,
        link: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SyscallError> = std::result::Result<T, E>;
