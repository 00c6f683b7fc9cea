// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for project files that need to be
//! created, copied, or layered in some way. Nothing in here touches the file
//! system except [`path_exists`] and the [`FsGlob`] collaborator.

use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".dodo_commands";

/// Name of the project configuration file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Determine absolute path to a project's configuration directory.
///
/// Does not check if the path returned actually exists.
pub fn config_dir(project_dir: impl AsRef<Path>) -> PathBuf {
    project_dir.as_ref().join(CONFIG_DIR_NAME)
}

/// Determine full path of a project's source directory.
///
/// A relative `src_dir` is placed under `project_dir` and lexically
/// normalized. An absolute `src_dir` is returned as given. In both cases the
/// optional `src_subdir` is appended.
pub fn full_src_dir(
    project_dir: impl AsRef<Path>,
    src_dir: impl AsRef<Path>,
    src_subdir: Option<&Path>,
) -> PathBuf {
    let postfix = match src_subdir {
        Some(subdir) => src_dir.as_ref().join(subdir),
        None => src_dir.as_ref().to_path_buf(),
    };

    if src_dir.as_ref().is_absolute() {
        postfix
    } else {
        normalize(project_dir.as_ref().join(postfix))
    }
}

/// Make path absolute relative to `base` if it is not already.
pub fn absolutize(base: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    if path.as_ref().is_absolute() {
        path.as_ref().to_path_buf()
    } else {
        normalize(base.as_ref().join(path))
    }
}

/// Fold `.` and `..` components without consulting the file system.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            // INVARIANT: Never pop past the root or a prefix.
            Component::ParentDir => {
                if matches!(
                    result.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    result.pop();
                } else if !result.has_root() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }

    result
}

/// Expand leading `~` of user input to the user's home directory.
///
/// Input is left untouched when the home directory cannot be determined.
pub fn expand_user(input: impl AsRef<str>) -> String {
    shellexpand::tilde_with_context(input.as_ref(), || {
        dirs::home_dir().map(|home| home.to_string_lossy().into_owned())
    })
    .into_owned()
}

/// Check if anything occupies a path.
///
/// Unlike [`Path::exists`], a dangling symlink counts as existing.
pub fn path_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().symlink_metadata().is_ok()
}

/// Glob pattern for `pattern` placed under a directory.
///
/// The directory part is escaped so that it always matches literally, even
/// if it contains glob metacharacters like `[` or `*`. An absolute `pattern`
/// replaces the directory, and is returned as is.
pub fn pattern_under(dir: impl AsRef<Path>, pattern: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(Pattern::escape(dir.as_ref().to_string_lossy().as_ref())).join(pattern)
}

/// Glob pattern matching every direct child of a directory.
pub fn children_pattern(dir: impl AsRef<Path>) -> PathBuf {
    pattern_under(dir, "*")
}

/// Expand glob patterns into paths.
///
/// Layer of indirection between the code that needs glob expansion, and the
/// file system that answers it.
pub trait PathGlob {
    /// Expand each pattern in order, concatenating their matches.
    ///
    /// A pattern that matches nothing contributes nothing.
    fn glob(&self, patterns: &[PathBuf]) -> Result<Vec<PathBuf>>;
}

/// Glob expansion against the real file system.
///
/// Matches of each pattern come back in alphabetical order. Hidden entries
/// need a literal leading dot to match, the same way a shell does it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsGlob;

impl PathGlob for FsGlob {
    #[instrument(skip(self), level = "debug")]
    fn glob(&self, patterns: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };

        let mut matches = Vec::new();
        for pattern in patterns {
            let pattern = pattern.to_string_lossy();
            for entry in glob::glob_with(pattern.as_ref(), options)? {
                matches.push(entry?);
            }
        }
        debug!("glob matched {} paths", matches.len());

        Ok(matches)
    }
}

/// Glob expansion error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Glob pattern is malformed.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Matched path cannot be read.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
