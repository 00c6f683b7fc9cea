// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dodo_bootstrap::{
    config::ProjectConfig,
    layer::LayerSet,
    path::{absolutize, config_dir, pattern_under, FsGlob, CONFIG_DIR_NAME, CONFIG_FILE_NAME},
    prompt::InquireConfirm,
    syscall::{CommandRunner, EchoRunner, SystemRunner},
    Bootstrap, BootstrapArgs, Layer, SourceStrategy,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dodo [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Project directory to operate on.
    #[arg(short, long, global = true, value_name = "path")]
    pub project_dir: Option<PathBuf>,

    /// Project configuration file to use.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Ask before overwriting existing files.
    #[arg(long, global = true)]
    pub confirm: bool,

    /// Print external commands instead of running them.
    #[arg(long, global = true)]
    pub echo: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let context = Context::resolve(&self)?;
        match self.command {
            Command::Bootstrap(opts) => {
                let args = opts.into_args(&context, self.confirm);
                if self.echo {
                    run_bootstrap(EchoRunner::new(), args)
                } else {
                    run_bootstrap(SystemRunner, args)
                }
            }
            Command::Layers(opts) => run_layers(&context, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Materialize source directory, and copy shared configuration.
    #[command(
        override_usage = "dodo bootstrap [options] <src_dir> <shared_config_dir>"
    )]
    Bootstrap(BootstrapOptions),

    /// List configuration layers in merge order.
    #[command(override_usage = "dodo layers [options] [<layer>]...")]
    Layers(LayersOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct BootstrapOptions {
    /// Source directory of the project, relative to project directory.
    #[arg(value_name = "src_dir")]
    pub src_dir: PathBuf,

    /// Location relative to source directory where shared config is stored.
    #[arg(value_name = "shared_config_dir")]
    pub shared_config_dir: PathBuf,

    /// Overwrite existing configuration files.
    #[arg(short = 'f', long = "force")]
    pub use_force: bool,

    /// Clone this repository to the source directory.
    #[arg(long, group = "source", value_name = "url")]
    pub git_url: Option<String>,

    /// Make the source directory a symlink to this directory.
    #[arg(long, group = "source", value_name = "dir")]
    pub link_dir: Option<String>,

    /// Use cookiecutter to create the source directory.
    #[arg(long, group = "source", value_name = "url")]
    pub cookiecutter_url: Option<String>,

    /// Depth for cloning repositories.
    #[arg(long, default_value_t = 0, value_name = "depth")]
    pub depth: u32,

    /// Branch to checkout after cloning.
    #[arg(short, long, value_name = "branch")]
    pub branch: Option<String>,

    /// Subdirectory of source directory to clone into.
    #[arg(long, value_name = "dir")]
    pub src_subdir: Option<PathBuf>,
}

impl BootstrapOptions {
    fn into_args(self, context: &Context, confirm: bool) -> BootstrapArgs {
        if self.git_url.is_none() && (self.depth > 0 || self.branch.is_some()) {
            warn!("--depth and --branch only apply together with --git-url");
        }

        let source = if let Some(url) = self.git_url {
            SourceStrategy::Clone {
                url,
                depth: self.depth,
                branch: self.branch,
            }
        } else if let Some(target) = self.link_dir {
            SourceStrategy::Link { target }
        } else if let Some(url) = self.cookiecutter_url {
            SourceStrategy::Scaffold { url }
        } else {
            SourceStrategy::None
        };

        BootstrapArgs {
            project_dir: context.project_dir.clone(),
            src_dir: self.src_dir,
            src_subdir: self.src_subdir,
            shared_config_dir: self.shared_config_dir,
            source,
            use_force: self.use_force,
            confirm,
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct LayersOptions {
    /// Extra layers to select, relative to the configuration directory.
    #[arg(value_name = "layer")]
    pub layers: Vec<String>,
}

/// Project directory and configuration resolved from the command line.
#[derive(Debug)]
struct Context {
    project_dir: PathBuf,
    config: ProjectConfig,
}

impl Context {
    fn resolve(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let config_path = match &cli.config {
            Some(path) => absolutize(&cwd, path),
            None => cwd.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
        };
        let config = ProjectConfig::load(&config_path)?;
        let project_dir = match &cli.project_dir {
            Some(path) => absolutize(&cwd, path),
            None => config.project_dir(&config_path, &cwd),
        };

        Ok(Self {
            project_dir,
            config,
        })
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_bootstrap(runner: impl CommandRunner, args: BootstrapArgs) -> Result<()> {
    let bootstrap = Bootstrap::new(runner, InquireConfirm, FsGlob);
    let report = bootstrap.run(&args).inspect_err(|error| {
        if let Some(path) = error.existing_path() {
            info!("move {:?} out of the way, or bootstrap elsewhere", path.display());
        }
    })?;

    for record in &report.copied {
        info!(
            "{}: {:?}",
            record.outcome,
            record.destination.display()
        );
    }
    info!(
        "bootstrapped {:?} with {} configuration entries",
        report.src_dir.display(),
        report.copied.len()
    );

    Ok(())
}

fn run_layers(context: &Context, opts: LayersOptions) -> Result<()> {
    let config_dir = config_dir(&context.project_dir);
    let mut layers = LayerSet::from_config(&context.config.layers, &config_dir);
    for pattern in opts.layers {
        layers.select(pattern_under(&config_dir, &pattern), Layer::new(pattern));
    }

    for path in layers.ordered_paths(&FsGlob)? {
        println!("{}", path.display());
    }

    Ok(())
}
