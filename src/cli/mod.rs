pub mod container;
pub mod image;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{TransferConfig, DEFAULT_CONFIG_FILE};
use crate::docker::client::DockerCli;
use crate::docker::runtime::{CommandStatus, ContainerRuntime};
use image::PushRepoSource;

#[derive(Parser)]
#[command(name = "transferctl")]
#[command(version)]
#[command(about = "Build, run and snapshot a work container from a JSON config", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Build the image
    #[arg(long)]
    build: bool,

    /// Start the container (creating it if needed)
    #[arg(long)]
    start: bool,

    /// Commit the container
    #[arg(long)]
    commit: bool,

    /// Copy the host directory into the container, then commit it
    #[arg(long)]
    save: bool,

    /// Push the tagged image
    #[arg(long)]
    push: bool,

    /// Stop the container
    #[arg(long)]
    stop: bool,

    /// Stop and remove the container
    #[arg(long)]
    delete: bool,

    /// Container runtime binary (defaults to `docker` on PATH)
    #[arg(long, env = "TRANSFERCTL_DOCKER", value_name = "PATH")]
    docker: Option<PathBuf>,

    /// Config section holding the repository used by --push
    #[arg(long, env = "TRANSFERCTL_PUSH_REPO_FROM", value_enum, default_value_t = PushRepoSource::Container)]
    push_repo_from: PushRepoSource,

    /// Fail when a runtime command exits with a non-zero code
    #[arg(long)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// The lifecycle operations, in dispatch priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Build,
    Start,
    Commit,
    Save,
    Push(PushRepoSource),
    Stop,
    Delete,
}

impl Operation {
    /// Config fields the operation reads
    pub fn required_fields(&self) -> Vec<&'static str> {
        match self {
            Self::Build => vec!["image.name"],
            Self::Start => vec![
                "container.name",
                "image.name",
                "volume.mount-point",
                "volume.host-directory",
                "ports.default",
            ],
            Self::Commit => vec!["container.name", "commit.name", "commit.repo"],
            Self::Save => vec![
                "container.name",
                "commit.name",
                "commit.repo",
                "volume.host-directory",
            ],
            Self::Push(source) => vec!["commit.name", source.field()],
            Self::Stop | Self::Delete => vec!["container.name"],
        }
    }

    /// Validate the config for this operation, then perform it.
    /// Missing fields are all reported before any runtime command is issued.
    pub async fn run(&self, config: &TransferConfig, runtime: &dyn ContainerRuntime) -> Result<()> {
        config
            .require(&self.required_fields())
            .with_context(|| format!("Invalid config: {}", config.path().display()))?;

        tracing::debug!("Running {:?} with {}", self, config.path().display());

        match self {
            Self::Build => image::build_image(runtime, config).await,
            Self::Start => container::start_container(runtime, config).await,
            Self::Commit => image::commit_container(runtime, config).await,
            Self::Save => image::save_container(runtime, config).await,
            Self::Push(source) => image::push_image(runtime, config, *source).await,
            Self::Stop => container::stop_container(runtime, config).await.map(|_| ()),
            Self::Delete => container::delete_container(runtime, config).await,
        }
    }
}

impl Cli {
    /// The first requested operation in priority order, if any
    pub fn operation(&self) -> Option<Operation> {
        let flags = [
            (self.build, Operation::Build),
            (self.start, Operation::Start),
            (self.commit, Operation::Commit),
            (self.save, Operation::Save),
            (self.push, Operation::Push(self.push_repo_from)),
            (self.stop, Operation::Stop),
            (self.delete, Operation::Delete),
        ];

        flags
            .into_iter()
            .find(|(requested, _)| *requested)
            .map(|(_, operation)| operation)
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        let config = TransferConfig::load(&self.config)?;

        let Some(operation) = self.operation() else {
            tracing::info!(
                "Loaded {}; no operation requested",
                config.path().display()
            );
            return Ok(());
        };

        let runtime = DockerCli::new(self.docker.clone(), self.strict);
        operation.run(&config, &runtime).await
    }
}

/// Print the outcome line for a finished runtime command
pub(crate) fn report(status: CommandStatus, message: &str) {
    if status.success() {
        println!("{} {}", "✓".green().bold(), message);
    } else {
        println!(
            "{} {} (exit code {})",
            "!".yellow().bold(),
            message,
            status.code_or_signal()
        );
    }
}
