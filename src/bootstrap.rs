// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Project bootstrapping.
//!
//! Bootstrapping a project is done in two stages. First, the project's
//! __source directory__ gets materialized through one of three
//! [`SourceStrategy`] variants: a Git clone, a symlink to an existing
//! directory, or a cookiecutter scaffold. Second, the __shared configuration__
//! that the source tree carries gets copied into the project's
//! `.dodo_commands` directory.
//!
//! # Existing Paths
//!
//! Bootstrapping never merges into, or overwrites an existing source
//! directory. If anything already occupies the source directory's path, then
//! the whole operation is aborted before any external command runs. Existing
//! configuration files are different: they may be overwritten, but only when
//! the caller opts in through force or confirm mode. See [`defaults`].
//!
//! # See Also
//!
//! 1. [`source`]
//! 2. [`defaults`]

pub mod defaults;
pub mod source;

pub use defaults::{CopyOutcome, CopyRecord};

use crate::{
    path::{full_src_dir, FsGlob, PathGlob},
    prompt::{Confirm, InquireConfirm},
    syscall::{CommandRunner, SystemRunner},
};

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Way to materialize a project's source directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Use whatever already exists at the source directory.
    #[default]
    None,

    /// Clone Git repository into source directory.
    Clone {
        /// URL of repository to clone.
        url: String,

        /// Shallow clone depth, zero meaning full history.
        depth: u32,

        /// Branch to checkout after cloning.
        branch: Option<String>,
    },

    /// Make source directory a symlink to an existing directory.
    Link {
        /// Directory to link to, may start with `~`.
        target: String,
    },

    /// Generate source directory from cookiecutter template.
    Scaffold {
        /// URL or path of the template, may start with `~`.
        url: String,
    },
}

/// Arguments of a single bootstrap run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapArgs {
    /// Absolute path to the project directory.
    pub project_dir: PathBuf,

    /// Source directory, relative to project directory unless absolute.
    pub src_dir: PathBuf,

    /// Optional subdirectory of source directory to materialize.
    pub src_subdir: Option<PathBuf>,

    /// Shared configuration directory, relative to full source directory.
    pub shared_config_dir: PathBuf,

    /// How to materialize the source directory.
    pub source: SourceStrategy,

    /// Overwrite existing configuration files without asking.
    pub use_force: bool,

    /// Ask before overwriting existing configuration files.
    pub confirm: bool,
}

impl BootstrapArgs {
    /// Full path of source directory these arguments refer to.
    pub fn full_src_dir(&self) -> PathBuf {
        full_src_dir(&self.project_dir, &self.src_dir, self.src_subdir.as_deref())
    }
}

/// Outcome of a successful bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Full path of source directory.
    pub src_dir: PathBuf,

    /// Every shared configuration entry considered, in copy order.
    pub copied: Vec<CopyRecord>,
}

/// Project bootstrapper.
///
/// Talks to the outside world only through its collaborators: a command
/// runner for external programs, a confirmation prompt for overwrites, and
/// a glob expander to find shared configuration files.
#[derive(Debug, Default)]
pub struct Bootstrap<R = SystemRunner, C = InquireConfirm, G = FsGlob>
where
    R: CommandRunner,
    C: Confirm,
    G: PathGlob,
{
    runner: R,
    confirm: C,
    glob: G,
}

impl<R, C, G> Bootstrap<R, C, G>
where
    R: CommandRunner,
    C: Confirm,
    G: PathGlob,
{
    /// Construct new bootstrapper.
    pub fn new(runner: R, confirm: C, glob: G) -> Self {
        Self {
            runner,
            confirm,
            glob,
        }
    }

    /// Bootstrap project.
    ///
    /// Creates the parent of the full source directory, materializes the
    /// source directory according to the source strategy, and then copies
    /// shared configuration into the project's configuration directory.
    ///
    /// # Errors
    ///
    /// - Return [`BootstrapError::SourceExists`] if clone or scaffold target
    ///   already exists.
    /// - Return [`BootstrapError::LinkExists`] if link name already exists.
    /// - Return [`BootstrapError::DestinationExists`] if a configuration
    ///   file exists and overwriting was not allowed.
    /// - Return [`BootstrapError::Syscall`] if an external command fails.
    /// - Return [`BootstrapError::Prompt`] if user cannot be asked.
    /// - Return [`BootstrapError::Glob`] if shared configuration cannot be
    ///   listed.
    #[instrument(skip(self, args), level = "debug")]
    pub fn run(&self, args: &BootstrapArgs) -> Result<BootstrapReport> {
        let src_dir = args.full_src_dir();
        info!("bootstrap source directory {:?}", src_dir.display());

        if let Some(parent) = src_dir.parent() {
            self.runner.create_dir_all(parent)?;
        }

        match &args.source {
            SourceStrategy::None => debug!("no source strategy selected"),
            SourceStrategy::Clone { url, depth, branch } => {
                source::clone_repository(&self.runner, &src_dir, url, *depth, branch.as_deref())?
            }
            SourceStrategy::Link { target } => {
                source::link_directory(&self.runner, target, &src_dir)?
            }
            SourceStrategy::Scaffold { url } => source::scaffold(&self.runner, url, &src_dir)?,
        }

        let shared_config_dir = src_dir.join(&args.shared_config_dir);
        let copied = defaults::copy_defaults(
            &self.runner,
            &self.confirm,
            &self.glob,
            &args.project_dir,
            &shared_config_dir,
            defaults::OverwritePolicy::from(args),
        )?;

        Ok(BootstrapReport { src_dir, copied })
    }

    #[cfg(test)]
    fn runner(&self) -> &R {
        &self.runner
    }
}

/// Bootstrap error types.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Clone or scaffold target already exists.
    #[error("cannot clone into {:?}, path already exists", path.display())]
    SourceExists { path: PathBuf },

    /// Symlink name already exists.
    #[error("cannot create a link because {:?} already exists", path.display())]
    LinkExists { path: PathBuf },

    /// Configuration file exists, and overwriting was not allowed.
    #[error(
        "destination path {:?} already exists, use the --confirm or --force flag to overwrite it",
        path.display()
    )]
    DestinationExists { path: PathBuf },

    /// External command fails.
    #[error(transparent)]
    Syscall(#[from] crate::syscall::SyscallError),

    /// User prompt fails.
    #[error(transparent)]
    Prompt(#[from] crate::prompt::PromptError),

    /// Shared configuration listing fails.
    #[error(transparent)]
    Glob(#[from] crate::path::PathError),
}

impl BootstrapError {
    /// Path that was found to already exist, if that is the failure.
    pub fn existing_path(&self) -> Option<&Path> {
        match self {
            Self::SourceExists { path }
            | Self::LinkExists { path }
            | Self::DestinationExists { path } => Some(path),
            _ => None,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;
