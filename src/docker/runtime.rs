use async_trait::async_trait;
use thiserror::Error;

use super::config::{
    image_tag, DockerCommand, RunConfig, ARCHIVE_DIR, BUILD_CONTEXT, BUILD_FILE,
};

/// Errors from invoking the container runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Container runtime '{program}' not found. Is Docker installed?")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to launch `{command}`")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}")]
    Failed { command: String, code: i32 },
}

/// Exit status of a runtime invocation. `code` is `None` when the process
/// was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code with signals reported as -1
    pub fn code_or_signal(&self) -> i32 {
        self.code.unwrap_or(-1)
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Captured result of a runtime query
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: CommandStatus,
    pub stdout: String,
}

/// The external container runtime. Container and image state live entirely
/// in the runtime; callers observe it only through these invocations.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Run a command with inherited stdio and wait for it
    async fn execute(&self, command: &DockerCommand) -> Result<CommandStatus, RuntimeError>;

    /// Run a command capturing its stdout
    async fn capture(&self, command: &DockerCommand) -> Result<CapturedOutput, RuntimeError>;

    async fn build_image(&self, tag: &str) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Build {
            dockerfile: BUILD_FILE.to_string(),
            tag: tag.to_string(),
            context: BUILD_CONTEXT.to_string(),
        })
        .await
    }

    /// Whether a container (running or stopped) has exactly this name.
    /// The runtime's name filter matches substrings, so the listing is
    /// compared line by line.
    async fn container_exists(&self, name: &str) -> Result<bool, RuntimeError> {
        let output = self
            .capture(&DockerCommand::ListContainers {
                name: name.to_string(),
            })
            .await?;

        if !output.status.success() {
            tracing::debug!("Container listing for '{}' failed", name);
        }

        Ok(output.stdout.lines().any(|line| line.trim() == name))
    }

    async fn start_attached(&self, name: &str) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::StartAttached {
            name: name.to_string(),
        })
        .await
    }

    async fn run_container(&self, config: &RunConfig) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Run(config.clone())).await
    }

    async fn commit_container(
        &self,
        container: &str,
        repo: &str,
        name: &str,
    ) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Commit {
            container: container.to_string(),
            tag: image_tag(repo, name),
        })
        .await
    }

    /// Copy a host path into the container's archive directory
    async fn archive_into(
        &self,
        source: &str,
        container: &str,
    ) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Copy {
            source: source.to_string(),
            container: container.to_string(),
            destination: ARCHIVE_DIR.to_string(),
        })
        .await
    }

    async fn push_image(&self, repo: &str, name: &str) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Push {
            tag: image_tag(repo, name),
        })
        .await
    }

    async fn stop_container(&self, name: &str) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Stop {
            name: name.to_string(),
        })
        .await
    }

    async fn remove_container(&self, name: &str) -> Result<CommandStatus, RuntimeError> {
        self.execute(&DockerCommand::Remove {
            name: name.to_string(),
        })
        .await
    }
}
