// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shared configuration defaults.
//!
//! A source tree may carry a directory of __shared configuration__ that every
//! checkout of the project should start out with. Each direct child of that
//! directory gets copied into the project's `.dodo_commands` directory.
//!
//! # Overwrite Policy
//!
//! Copying never silently replaces an existing configuration entry:
//!
//! - Confirm mode asks the user first, and skips the entry on "no".
//! - Force mode overwrites, but warns about it.
//! - Otherwise the whole operation fails on the first existing entry.

use crate::{
    bootstrap::{BootstrapArgs, BootstrapError, Result},
    path::{children_pattern, config_dir, path_exists, PathGlob},
    prompt::Confirm,
    syscall::CommandRunner,
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// How to treat configuration entries that already exist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OverwritePolicy {
    /// Overwrite without asking.
    pub use_force: bool,

    /// Ask before overwriting. Takes precedence over force.
    pub confirm: bool,
}

impl From<&BootstrapArgs> for OverwritePolicy {
    fn from(args: &BootstrapArgs) -> Self {
        Self {
            use_force: args.use_force,
            confirm: args.confirm,
        }
    }
}

/// What happened to a single shared configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Copied to a free destination.
    Copied,

    /// Copied over an existing destination.
    Overwritten,

    /// Left alone, because the user declined to overwrite.
    Skipped,
}

impl Display for CopyOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Copied => fmt.write_str("copied"),
            Self::Overwritten => fmt.write_str("overwritten"),
            Self::Skipped => fmt.write_str("skipped"),
        }
    }
}

/// Record of a single shared configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: CopyOutcome,
}

/// Copy shared configuration into project's configuration directory.
///
/// Every direct, non-hidden child of `shared_config_dir` is copied
/// recursively to `.dodo_commands/<name>` under `project_dir`. Existing
/// destinations are handled according to `policy`. A missing shared
/// configuration directory simply has nothing to copy.
///
/// # Errors
///
/// - Return [`BootstrapError::DestinationExists`] if a destination exists,
///   and `policy` allows neither asking nor forcing.
/// - Return [`BootstrapError::Prompt`] if user cannot be asked.
/// - Return [`BootstrapError::Syscall`] if copying fails.
/// - Return [`BootstrapError::Glob`] if shared configuration cannot be
///   listed.
#[instrument(skip(runner, confirm, glob), level = "debug")]
pub fn copy_defaults(
    runner: &impl CommandRunner,
    confirm: &impl Confirm,
    glob: &impl PathGlob,
    project_dir: &Path,
    shared_config_dir: &Path,
    policy: OverwritePolicy,
) -> Result<Vec<CopyRecord>> {
    let entries = glob.glob(&[children_pattern(shared_config_dir)])?;
    if entries.is_empty() {
        warn!(
            "no shared configuration found at {:?}",
            shared_config_dir.display()
        );
        return Ok(Vec::new());
    }

    let config_dir = config_dir(project_dir);
    runner.create_dir_all(&config_dir)?;

    let mut records = Vec::new();
    for source in entries {
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = config_dir.join(name);

        let outcome = if !path_exists(&destination) {
            CopyOutcome::Copied
        } else if policy.confirm {
            let message = format!(
                "Destination path {} already exists. Overwrite it?",
                destination.display()
            );
            if confirm.confirm(&message)? {
                CopyOutcome::Overwritten
            } else {
                info!("keep existing path {:?}", destination.display());
                CopyOutcome::Skipped
            }
        } else if policy.use_force {
            warn!("overwriting existing path {:?}", destination.display());
            CopyOutcome::Overwritten
        } else {
            return Err(BootstrapError::DestinationExists { path: destination });
        };

        if outcome != CopyOutcome::Skipped {
            runner.run(
                "cp",
                &["-rf".into(), source.as_path().into(), destination.as_path().into()],
                None,
            )?;
        }

        records.push(CopyRecord {
            source,
            destination,
            outcome,
        });
    }

    Ok(records)
}
