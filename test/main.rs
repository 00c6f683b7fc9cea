// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::{Context, Result};
use git2::{Repository, RepositoryInitOptions, Signature};
use std::{
    fs::{create_dir_all, write},
    path::Path,
    process::Command,
};

/// Repository with a work tree, used as the remote to clone from.
pub(crate) struct RepoFixture {
    repo: Repository,
}

impl RepoFixture {
    /// Initialize repository whose first branch is `main`.
    pub(crate) fn new(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::init_opts(path, RepositoryInitOptions::new().initial_head("main"))?;
        Ok(Self { repo })
    }

    /// Write file into work tree, and commit it on top of HEAD.
    pub(crate) fn commit_file(&self, filename: impl AsRef<Path>, contents: &str) -> Result<()> {
        let filename = filename.as_ref();
        let workdir = self.repo.workdir().context("fixture has no work tree")?;
        let path = workdir.join(filename);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        write(&path, contents)?;

        let mut index = self.repo.index()?;
        index.add_path(filename)?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        // Unborn HEAD means this is the root commit.
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents = parent.iter().collect::<Vec<_>>();
        let signature = Signature::now("Dodo Fixture", "fixture@dodo.invalid")?;
        let message = format!("add {}", filename.display());
        self.repo
            .commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)?;

        Ok(())
    }

    /// Create branch at current HEAD commit.
    pub(crate) fn branch(&self, name: &str) -> Result<()> {
        let commit = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &commit, false)?;

        Ok(())
    }
}

/// Check if Git binary is available to shell out to.
pub(crate) fn has_git() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}
