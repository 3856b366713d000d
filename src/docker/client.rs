use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::config::DockerCommand;
use super::runtime::{CapturedOutput, CommandStatus, ContainerRuntime, RuntimeError};

/// Default runtime binary, looked up on PATH
pub const DEFAULT_RUNTIME: &str = "docker";

/// Container runtime backed by the docker command-line tool
pub struct DockerCli {
    program: Option<PathBuf>,
    strict: bool,
}

impl DockerCli {
    /// Create a client for `program` (or `docker` on PATH).
    ///
    /// The binary is resolved on first use, so configuration problems are
    /// reported before a missing runtime. With `strict`, a non-zero exit
    /// from any invocation becomes [`RuntimeError::Failed`].
    pub fn new(program: Option<PathBuf>, strict: bool) -> Self {
        Self { program, strict }
    }

    fn resolve(&self) -> Result<PathBuf, RuntimeError> {
        let program = self
            .program
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNTIME));

        which::which(&program).map_err(|source| RuntimeError::NotFound {
            program: program.display().to_string(),
            source,
        })
    }

    fn command(&self, command: &DockerCommand) -> Result<Command, RuntimeError> {
        let program = self.resolve()?;
        let args = command.args();
        tracing::debug!("Running: {} {}", program.display(), args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }

    fn check(&self, command: &DockerCommand, status: CommandStatus) -> Result<CommandStatus, RuntimeError> {
        if !status.success() {
            tracing::warn!(
                "`{}` exited with code {}",
                command,
                status.code_or_signal()
            );
            if self.strict {
                return Err(RuntimeError::Failed {
                    command: command.to_string(),
                    code: status.code_or_signal(),
                });
            }
        }
        Ok(status)
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn execute(&self, command: &DockerCommand) -> Result<CommandStatus, RuntimeError> {
        let status = self
            .command(command)?
            .status()
            .await
            .map_err(|source| RuntimeError::Launch {
                command: command.to_string(),
                source,
            })?;

        self.check(command, status.into())
    }

    async fn capture(&self, command: &DockerCommand) -> Result<CapturedOutput, RuntimeError> {
        let output = self
            .command(command)?
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| RuntimeError::Launch {
                command: command.to_string(),
                source,
            })?;

        let status = self.check(command, output.status.into())?;

        Ok(CapturedOutput {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
