// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive user prompts.

use tracing::instrument;

/// Ask the user a yes or no question.
pub trait Confirm {
    /// Ask `message`, and report whether the user agreed.
    ///
    /// # Errors
    ///
    /// - Return [`PromptError`] if the question cannot be asked or answered.
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Confirmation through the terminal, defaulting to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireConfirm;

impl Confirm for InquireConfirm {
    #[instrument(skip(self), level = "debug")]
    fn confirm(&self, message: &str) -> Result<bool> {
        Ok(inquire::Confirm::new(message).with_default(false).prompt()?)
    }
}

/// Prompt error types.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Terminal interaction failed, or user aborted.
    #[error(transparent)]
    Inquire(#[from] inquire::InquireError),
}

/// Friendly result alias :3
pub type Result<T, E = PromptError> = std::result::Result<T, E>;
