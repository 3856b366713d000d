use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use super::report;
use crate::config::TransferConfig;
use crate::docker::config::{image_tag, ARCHIVE_DIR, BUILD_FILE};
use crate::docker::runtime::ContainerRuntime;

/// Where `--push` reads the image repository from.
///
/// Commit and save always tag with `commit.repo`; push has historically
/// read `container.repo`, which is kept as the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PushRepoSource {
    /// `container.repo`
    #[default]
    Container,
    /// `commit.repo`, the same repository commit and save tag with
    Commit,
}

impl PushRepoSource {
    pub fn field(self) -> &'static str {
        match self {
            Self::Container => "container.repo",
            Self::Commit => "commit.repo",
        }
    }
}

/// Build the work image from Dockerfile.work in the working directory
pub async fn build_image(runtime: &dyn ContainerRuntime, config: &TransferConfig) -> Result<()> {
    let image = config.image_name()?;

    println!(
        "{} Building image {} from {}...",
        "=>".blue().bold(),
        image.cyan(),
        BUILD_FILE
    );

    let status = runtime.build_image(&image).await?;
    report(status, &format!("Built image {}", image));
    Ok(())
}

pub async fn commit_container(
    runtime: &dyn ContainerRuntime,
    config: &TransferConfig,
) -> Result<()> {
    let container = config.container_name()?;
    let name = config.string("commit.name")?;
    let repo = config.string("commit.repo")?;

    commit(runtime, &container, &repo, &name).await
}

/// Snapshot the host directory into the container, then commit it
pub async fn save_container(runtime: &dyn ContainerRuntime, config: &TransferConfig) -> Result<()> {
    let container = config.container_name()?;
    let name = config.string("commit.name")?;
    let repo = config.string("commit.repo")?;
    let host_directory = config.host_directory()?;

    println!(
        "{} Copying {} into {}:{}...",
        "=>".blue().bold(),
        host_directory,
        container.cyan(),
        ARCHIVE_DIR
    );

    let status = runtime.archive_into(&host_directory, &container).await?;
    report(status, &format!("Copied {} into {}", host_directory, container));

    commit(runtime, &container, &repo, &name).await
}

pub async fn push_image(
    runtime: &dyn ContainerRuntime,
    config: &TransferConfig,
    source: PushRepoSource,
) -> Result<()> {
    let name = config.string("commit.name")?;
    let repo = config.string(source.field())?;
    let tag = image_tag(&repo, &name);

    println!("{} Pushing image {}...", "=>".blue().bold(), tag.cyan());

    let status = runtime.push_image(&repo, &name).await?;
    report(status, &format!("Pushed image {}", tag));
    Ok(())
}

async fn commit(
    runtime: &dyn ContainerRuntime,
    container: &str,
    repo: &str,
    name: &str,
) -> Result<()> {
    let tag = image_tag(repo, name);

    println!(
        "{} Committing container {} as {}...",
        "=>".blue().bold(),
        container.cyan(),
        tag.cyan()
    );

    let status = runtime.commit_container(container, repo, name).await?;
    report(status, &format!("Committed {} as {}", container, tag));
    Ok(())
}
