// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layer ordering.
//!
//! A project's configuration is not one file, but a stack of __layers__ that
//! get merged on top of each other. The __root layer__ is always present,
//! and always merged first. Every other layer is either selected directly,
//! or reached through an alias that points at the layer's path.
//!
//! # Layer Order
//!
//! Layers other than the root are merged in order of their file name, not of
//! their full path. Thus `env/a.toml` comes before `server/b.toml`. When two
//! layers share a file name, the full path decides. Layer references may be
//! glob patterns, so a single reference can stand for zero, one, or many
//! layer files.

use crate::{
    config::LayerSettings,
    path::{pattern_under, PathError, PathGlob},
};

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Named configuration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
}

impl Layer {
    /// Construct new layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Set of layer references that make up a project's configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LayerSet {
    /// Pattern that must match the root layer, and nothing else.
    pub root_layer_path: PathBuf,

    /// Layers selected directly, by path pattern.
    pub selected_layer_by_path: BTreeMap<PathBuf, Layer>,

    /// Layers reached through an alias, by the alias target's path pattern.
    pub layer_by_alias_target_path: BTreeMap<PathBuf, Layer>,
}

impl LayerSet {
    /// Construct new layer set with root layer only.
    pub fn new(root_layer_path: impl Into<PathBuf>) -> Self {
        Self {
            root_layer_path: root_layer_path.into(),
            ..Default::default()
        }
    }

    /// Construct layer set from configured layer settings.
    ///
    /// Relative patterns are placed under `config_dir`, absolute ones are
    /// kept as they are. The `config_dir` part always matches literally.
    pub fn from_config(settings: &LayerSettings, config_dir: impl AsRef<Path>) -> Self {
        let config_dir = config_dir.as_ref();
        let mut layers = Self::new(pattern_under(config_dir, &settings.root));

        for pattern in &settings.selected {
            let name = Path::new(pattern)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| pattern.clone());
            layers.select(pattern_under(config_dir, pattern), Layer::new(name));
        }

        for (alias, target) in &settings.aliases {
            layers.alias(pattern_under(config_dir, target), Layer::new(alias.as_str()));
        }

        layers
    }

    /// Select layer directly by path pattern.
    pub fn select(&mut self, path: impl Into<PathBuf>, layer: Layer) {
        self.selected_layer_by_path.insert(path.into(), layer);
    }

    /// Select layer through an alias pointing at path pattern.
    pub fn alias(&mut self, target: impl Into<PathBuf>, layer: Layer) {
        self.layer_by_alias_target_path.insert(target.into(), layer);
    }

    /// Resolve ordered list of layer paths, see [`ordered_layer_paths`].
    ///
    /// # Errors
    ///
    /// - Return [`LayerError`] if resolution fails.
    pub fn ordered_paths(&self, glob: &impl PathGlob) -> Result<Vec<PathBuf>> {
        ordered_layer_paths(self, glob)
    }
}

/// Resolve ordered list of layer paths.
///
/// The root layer comes first, and exactly once. Every other layer reference
/// of both selections is deduplicated, sorted by file name with full path as
/// tie-break, and then expanded through `glob`. References matching nothing
/// are dropped. References matching many files keep all of them in place.
///
/// Same layer set and same file system state always give the same result.
///
/// # Errors
///
/// - Return [`LayerError::RootLayerMissing`] if root pattern matches nothing.
/// - Return [`LayerError::AmbiguousRootLayer`] if root pattern matches more
///   than one file.
/// - Return [`LayerError::Glob`] if glob expansion fails.
#[instrument(skip(layers, glob), level = "debug")]
pub fn ordered_layer_paths(layers: &LayerSet, glob: &impl PathGlob) -> Result<Vec<PathBuf>> {
    let root = resolve_root(&layers.root_layer_path, glob)?;
    debug!("root layer resolved to {:?}", root.display());

    let mut seen = HashSet::new();
    let mut references = layers
        .selected_layer_by_path
        .keys()
        .chain(layers.layer_by_alias_target_path.keys())
        .filter(|path| seen.insert(*path))
        .cloned()
        .collect::<Vec<_>>();
    references.sort_by(|left, right| by_file_name(left, right));

    let mut ordered = vec![root.clone()];
    ordered.extend(
        glob.glob(&references)?
            .into_iter()
            .filter(|path| *path != root),
    );

    Ok(ordered)
}

fn resolve_root(pattern: &Path, glob: &impl PathGlob) -> Result<PathBuf> {
    let mut matches = glob.glob(&[pattern.to_path_buf()])?;
    match matches.len() {
        0 => Err(LayerError::RootLayerMissing {
            pattern: pattern.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(LayerError::AmbiguousRootLayer {
            pattern: pattern.to_path_buf(),
            matches,
        }),
    }
}

/// Order by file name, then by full path.
///
/// A path ending in `..` has no file name, and sorts before every path that
/// has one.
fn by_file_name(left: &Path, right: &Path) -> Ordering {
    left.file_name()
        .cmp(&right.file_name())
        .then_with(|| left.cmp(right))
}

/// Layer resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// Root layer pattern does not match any file.
    #[error("root layer {:?} does not exist", pattern.display())]
    RootLayerMissing { pattern: PathBuf },

    /// Root layer pattern matches more than one file.
    #[error("root layer {:?} matches {} files: {matches:?}", pattern.display(), matches.len())]
    AmbiguousRootLayer {
        pattern: PathBuf,
        matches: Vec<PathBuf>,
    },

    /// Glob expansion of a layer pattern fails.
    #[error(transparent)]
    Glob(#[from] PathError),
}

/// Friendly result alias :3
pub type Result<T, E = LayerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FsGlob;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{cell::RefCell, collections::HashMap};

    /// Glob expansion from a fixed table. Unknown patterns match nothing.
    #[derive(Debug, Default)]
    struct TableGlob {
        table: HashMap<PathBuf, Vec<PathBuf>>,
        queries: RefCell<Vec<PathBuf>>,
    }

    impl TableGlob {
        fn with(mut self, pattern: &str, matches: &[&str]) -> Self {
            self.table.insert(
                pattern.into(),
                matches.iter().map(PathBuf::from).collect(),
            );
            self
        }

        fn literal(self, paths: &[&str]) -> Self {
            paths.iter().fold(self, |glob, path| glob.with(path, &[*path]))
        }
    }

    impl PathGlob for TableGlob {
        fn glob(&self, patterns: &[PathBuf]) -> crate::path::Result<Vec<PathBuf>> {
            self.queries.borrow_mut().extend(patterns.iter().cloned());
            Ok(patterns
                .iter()
                .flat_map(|pattern| self.table.get(pattern).cloned().unwrap_or_default())
                .collect())
        }
    }

    fn paths(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn root_first_then_by_file_name() -> anyhow::Result<()> {
        let glob = TableGlob::default()
            .with("/root/*", &["/root/a"])
            .literal(&["/x/b.yml", "/x/a.yml", "/root/a"]);
        let mut layers = LayerSet::new("/root/*");
        layers.select("/x/b.yml", Layer::new("b"));
        layers.select("/root/a", Layer::new("root"));
        layers.alias("/x/a.yml", Layer::new("a"));

        let result = ordered_layer_paths(&layers, &glob)?;
        assert_eq!(result, paths(&["/root/a", "/x/a.yml", "/x/b.yml"]));

        Ok(())
    }

    #[test]
    fn duplicates_are_removed_before_glob() -> anyhow::Result<()> {
        let glob = TableGlob::default().literal(&["/c/config.toml", "/c/dev.toml"]);
        let mut layers = LayerSet::new("/c/config.toml");
        layers.select("/c/dev.toml", Layer::new("dev"));
        layers.alias("/c/dev.toml", Layer::new("d"));

        let result = ordered_layer_paths(&layers, &glob)?;
        assert_eq!(result, paths(&["/c/config.toml", "/c/dev.toml"]));
        assert_eq!(
            glob.queries.borrow().clone(),
            paths(&["/c/config.toml", "/c/dev.toml"])
        );

        Ok(())
    }

    #[test]
    fn unmatched_patterns_drop_and_multi_matches_stay_in_place() -> anyhow::Result<()> {
        let glob = TableGlob::default()
            .literal(&["/c/config.toml", "/c/a.toml", "/c/z.toml"])
            .with("/c/m*.toml", &["/c/m1.toml", "/c/m2.toml"]);
        let mut layers = LayerSet::new("/c/config.toml");
        layers.select("/c/z.toml", Layer::new("z"));
        layers.select("/c/m*.toml", Layer::new("m"));
        layers.select("/c/a.toml", Layer::new("a"));
        layers.alias("/c/missing-*.toml", Layer::new("missing"));

        let result = ordered_layer_paths(&layers, &glob)?;
        let expect = paths(&[
            "/c/config.toml",
            "/c/a.toml",
            "/c/m1.toml",
            "/c/m2.toml",
            "/c/z.toml",
        ]);
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn equal_file_names_order_by_full_path() -> anyhow::Result<()> {
        let glob = TableGlob::default().literal(&["/c/config.toml", "/b/x.toml", "/a/x.toml"]);
        let mut layers = LayerSet::new("/c/config.toml");
        layers.alias("/b/x.toml", Layer::new("b"));
        layers.select("/a/x.toml", Layer::new("a"));

        let result = ordered_layer_paths(&layers, &glob)?;
        assert_eq!(result, paths(&["/c/config.toml", "/a/x.toml", "/b/x.toml"]));

        Ok(())
    }

    #[test]
    fn resolution_is_idempotent() -> anyhow::Result<()> {
        let glob = TableGlob::default().literal(&["/c/config.toml", "/c/b.toml", "/c/a.toml"]);
        let mut layers = LayerSet::new("/c/config.toml");
        layers.select("/c/b.toml", Layer::new("b"));
        layers.alias("/c/a.toml", Layer::new("a"));

        let first = layers.ordered_paths(&glob)?;
        let second = layers.ordered_paths(&glob)?;
        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn missing_root_layer_is_an_error() {
        let layers = LayerSet::new("/c/config.toml");
        let result = ordered_layer_paths(&layers, &TableGlob::default());
        assert!(matches!(result, Err(LayerError::RootLayerMissing { .. })));
    }

    #[test]
    fn ambiguous_root_layer_is_an_error() {
        let glob = TableGlob::default().with("/c/*.toml", &["/c/a.toml", "/c/b.toml"]);
        let layers = LayerSet::new("/c/*.toml");
        let result = ordered_layer_paths(&layers, &glob);
        assert!(matches!(
            result,
            Err(LayerError::AmbiguousRootLayer { matches: found, .. }) if found.len() == 2
        ));
    }

    #[test]
    fn layer_set_from_config() {
        let settings = LayerSettings {
            root: "config.toml".into(),
            selected: vec!["server.*.toml".into(), "/abs/extra.toml".into()],
            aliases: BTreeMap::from([("dev".into(), "env/dev.toml".into())]),
        };

        let result = LayerSet::from_config(&settings, "/p/.dodo_commands");
        let mut expect = LayerSet::new("/p/.dodo_commands/config.toml");
        expect.select("/p/.dodo_commands/server.*.toml", Layer::new("server.*"));
        expect.select("/abs/extra.toml", Layer::new("extra"));
        expect.alias("/p/.dodo_commands/env/dev.toml", Layer::new("dev"));
        assert_eq!(result, expect);
    }

    #[test]
    fn file_name_tie_break_puts_parent_reference_first() {
        let mut keys = paths(&["/c/b.toml", "/c/a/..", "/a/b.toml"]);
        keys.sort_by(|left, right| by_file_name(left, right));
        assert_eq!(keys, paths(&["/c/a/..", "/a/b.toml", "/c/b.toml"]));
    }

    #[sealed_test]
    fn config_dir_with_glob_metacharacters_matches_literally() -> anyhow::Result<()> {
        let config_dir = std::env::current_dir()?.join("proj[1]/.dodo_commands");
        std::fs::create_dir_all(&config_dir)?;
        std::fs::write(config_dir.join("config.toml"), "")?;
        std::fs::write(config_dir.join("dev.toml"), "")?;

        let settings = LayerSettings {
            selected: vec!["dev.toml".into()],
            ..Default::default()
        };
        let layers = LayerSet::from_config(&settings, &config_dir);

        let result = layers.ordered_paths(&FsGlob)?;
        let expect = vec![config_dir.join("config.toml"), config_dir.join("dev.toml")];
        assert_eq!(result, expect);

        Ok(())
    }

    #[sealed_test]
    fn ordered_layers_from_file_system() -> anyhow::Result<()> {
        let config_dir = std::env::current_dir()?.join(".dodo_commands");
        std::fs::create_dir_all(config_dir.join("env"))?;
        for name in ["config.toml", "server.b.toml", "server.a.toml", "env/dev.toml"] {
            std::fs::write(config_dir.join(name), "")?;
        }

        let settings = LayerSettings {
            root: "config.toml".into(),
            selected: vec!["server.*.toml".into()],
            aliases: BTreeMap::from([("dev".into(), "env/dev.toml".into())]),
        };
        let layers = LayerSet::from_config(&settings, &config_dir);

        let result = layers.ordered_paths(&FsGlob)?;
        let expect = vec![
            config_dir.join("config.toml"),
            config_dir.join("env/dev.toml"),
            config_dir.join("server.a.toml"),
            config_dir.join("server.b.toml"),
        ];
        assert_eq!(result, expect);

        Ok(())
    }
}
