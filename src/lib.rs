// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bootstrap dodo command projects, and order their configuration layers.
//!
//! # Bootstrapping
//!
//! A dodo command project keeps its configuration in a `.dodo_commands`
//! directory inside the __project directory__, while the code being worked on
//! lives in a __source directory__. Bootstrapping materializes the source
//! directory, by cloning, linking, or scaffolding it, and seeds the
//! configuration directory with the shared defaults the source tree ships.
//! See [`bootstrap`].
//!
//! # Layered Configuration
//!
//! Configuration is a stack of layer files merged on top of a root layer.
//! The [`layer`] module decides the order in which those files are merged.

pub mod bootstrap;
pub mod config;
pub mod layer;
pub mod path;
pub mod prompt;
pub mod syscall;

pub use bootstrap::{Bootstrap, BootstrapArgs, BootstrapError, BootstrapReport, SourceStrategy};
pub use layer::{ordered_layer_paths, Layer, LayerSet};
