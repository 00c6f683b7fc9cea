// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Source directory materialization.
//!
//! Each strategy refuses to run if anything already occupies the source
//! directory's path. Nothing gets merged, and nothing gets overwritten.

use crate::{
    bootstrap::{BootstrapError, Result},
    path::{expand_user, path_exists},
    syscall::CommandRunner,
};

use std::{ffi::OsString, path::Path};
use tracing::{info, instrument};

/// Clone Git repository into source directory.
///
/// Runs `git clone` from the parent of `src_dir`. Passes `--depth` only for
/// a non-zero `depth`. Checks out `branch` afterwards if given.
///
/// # Errors
///
/// - Return [`BootstrapError::SourceExists`] if `src_dir` already exists.
/// - Return [`BootstrapError::Syscall`] if Git fails.
#[instrument(skip(runner), level = "debug")]
pub fn clone_repository(
    runner: &impl CommandRunner,
    src_dir: &Path,
    url: &str,
    depth: u32,
    branch: Option<&str>,
) -> Result<()> {
    if path_exists(src_dir) {
        return Err(BootstrapError::SourceExists {
            path: src_dir.to_path_buf(),
        });
    }

    let parent = src_dir.parent().unwrap_or(src_dir);
    let name = src_dir.file_name().unwrap_or(src_dir.as_os_str());

    let mut args: Vec<OsString> = vec!["clone".into(), url.into(), name.into()];
    if depth > 0 {
        args.push("--depth".into());
        args.push(depth.to_string().into());
    }
    info!("clone {url} into {:?}", src_dir.display());
    runner.run("git", &args, Some(parent))?;

    if let Some(branch) = branch {
        info!("checkout branch {branch}");
        runner.run("git", &["checkout".into(), branch.into()], Some(src_dir))?;
    }

    Ok(())
}

/// Make source directory a symlink to `target`.
///
/// A leading `~` of `target` is expanded to the user's home directory.
///
/// # Errors
///
/// - Return [`BootstrapError::LinkExists`] if `link` already exists, even as
///   a dangling symlink.
/// - Return [`BootstrapError::Syscall`] if symlink cannot be created.
#[instrument(skip(runner), level = "debug")]
pub fn link_directory(runner: &impl CommandRunner, target: &str, link: &Path) -> Result<()> {
    if path_exists(link) {
        return Err(BootstrapError::LinkExists {
            path: link.to_path_buf(),
        });
    }

    let target = expand_user(target);
    info!("link {:?} to {target}", link.display());
    runner.symlink(Path::new(&target), link)?;

    Ok(())
}

/// Generate source directory from cookiecutter template at `url`.
///
/// # Errors
///
/// - Return [`BootstrapError::SourceExists`] if `src_dir` already exists.
/// - Return [`BootstrapError::Syscall`] if cookiecutter fails.
#[instrument(skip(runner), level = "debug")]
pub fn scaffold(runner: &impl CommandRunner, url: &str, src_dir: &Path) -> Result<()> {
    if path_exists(src_dir) {
        return Err(BootstrapError::SourceExists {
            path: src_dir.to_path_buf(),
        });
    }

    let url = expand_user(url);
    info!("scaffold {:?} from {url}", src_dir.display());
    runner.run(
        "cookiecutter",
        &[url.into(), "-o".into(), src_dir.into()],
        None,
    )?;

    Ok(())
}
