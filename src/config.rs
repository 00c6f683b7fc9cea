// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the project configuration file, and how the project
//! directory gets resolved from it.
//!
//! # General Layout
//!
//! The project configuration lives at `.dodo_commands/config.toml`, and has
//! two sections. The `root` section locates the project itself. The `layers`
//! section lists the configuration layers that get merged on top of the root
//! layer, either selected directly or reached through an alias.
//!
//! ```toml
//! [root]
//! project_dir = "~/projects/app"
//!
//! [layers]
//! root = "config.toml"
//! selected = ["server.*.toml"]
//!
//! [layers.aliases]
//! dev = "env/dev.toml"
//! ```

use crate::path::{absolutize, CONFIG_DIR_NAME};

use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Project configuration layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Settings locating the project.
    #[serde(default)]
    pub root: RootSettings,

    /// Configuration layers of the project.
    #[serde(default)]
    pub layers: LayerSettings,
}

impl ProjectConfig {
    /// Load project configuration from file.
    ///
    /// A missing file is not an error, it just means the project has no
    /// configuration yet. Default configuration is returned instead.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if existing file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is malformed.
    /// - Return [`ConfigError::ShellExpansion`] if shell expansion fails.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        if !path.as_ref().exists() {
            debug!("no project configuration at {:?}", path.as_ref().display());
            return Ok(Self::default());
        }

        read_to_string(path.as_ref())
            .map_err(|err| ConfigError::Read {
                source: err,
                path: path.as_ref().to_path_buf(),
            })?
            .parse()
    }

    /// Determine absolute project directory.
    ///
    /// Uses configured `root.project_dir` first. Otherwise, the directory
    /// holding the `.dodo_commands` directory that `config_path` lives in.
    /// Falls back to `cwd` when neither applies. Relative results are
    /// resolved against `cwd`.
    pub fn project_dir(&self, config_path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> PathBuf {
        if let Some(project_dir) = &self.root.project_dir {
            return absolutize(cwd, project_dir);
        }

        let config_path = absolutize(cwd.as_ref(), config_path);
        config_path
            .parent()
            .filter(|dir| dir.file_name().is_some_and(|name| name == CONFIG_DIR_NAME))
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.as_ref().to_path_buf())
    }
}

impl FromStr for ProjectConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: ProjectConfig =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path-like field.
        if let Some(project_dir) = &config.root.project_dir {
            config.root.project_dir = Some(expand(project_dir.to_string_lossy())?.into());
        }
        config.layers.root = expand(&config.layers.root)?;
        for pattern in config.layers.selected.iter_mut() {
            *pattern = expand(pattern.as_str())?;
        }
        for target in config.layers.aliases.values_mut() {
            *target = expand(target.as_str())?;
        }

        Ok(config)
    }
}

fn expand(input: impl AsRef<str>) -> Result<String> {
    Ok(shellexpand::full(input.as_ref())
        .map_err(ConfigError::ShellExpansion)?
        .into_owned())
}

/// Settings locating the project.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct RootSettings {
    /// Absolute path of the project directory.
    pub project_dir: Option<PathBuf>,
}

/// Configuration layer listing.
///
/// All patterns are globs relative to the project's configuration
/// directory, unless they are absolute.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct LayerSettings {
    /// Pattern of the root layer. Must match exactly one file.
    #[serde(default = "default_root_layer")]
    pub root: String,

    /// Patterns of directly selected layers.
    #[serde(default)]
    pub selected: Vec<String>,

    /// Alias names mapped to the pattern of the layer they stand for.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            root: default_root_layer(),
            selected: Vec::new(),
            aliases: BTreeMap::new(),
        }
    }
}

fn default_root_layer() -> String {
    crate::path::CONFIG_FILE_NAME.into()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
