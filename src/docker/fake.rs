use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::config::DockerCommand;
use super::runtime::{CapturedOutput, CommandStatus, ContainerRuntime, RuntimeError};

/// In-memory runtime that records every invocation instead of running it
#[derive(Default)]
pub struct FakeRuntime {
    containers: Vec<String>,
    exit_codes: HashMap<&'static str, i32>,
    calls: Mutex<Vec<DockerCommand>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names reported by `docker ps -a`
    pub fn with_containers(mut self, names: &[&str]) -> Self {
        self.containers = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Make every invocation of `subcommand` exit with `code`
    pub fn with_exit_code(mut self, subcommand: &'static str, code: i32) -> Self {
        self.exit_codes.insert(subcommand, code);
        self
    }

    pub fn calls(&self) -> Vec<DockerCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn subcommands(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.subcommand()).collect()
    }

    fn record(&self, command: &DockerCommand) -> CommandStatus {
        self.calls.lock().unwrap().push(command.clone());
        CommandStatus {
            code: Some(*self.exit_codes.get(command.subcommand()).unwrap_or(&0)),
        }
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn execute(&self, command: &DockerCommand) -> Result<CommandStatus, RuntimeError> {
        Ok(self.record(command))
    }

    async fn capture(&self, command: &DockerCommand) -> Result<CapturedOutput, RuntimeError> {
        let status = self.record(command);
        let stdout = self
            .containers
            .iter()
            .map(|name| format!("{}\n", name))
            .collect();
        Ok(CapturedOutput { status, stdout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exists_requires_exact_name() {
        let runtime = FakeRuntime::new().with_containers(&["web-old", "web2"]);
        assert!(!runtime.container_exists("web").await.unwrap());

        let runtime = FakeRuntime::new().with_containers(&["web-old", "web"]);
        assert!(runtime.container_exists("web").await.unwrap());
        assert_eq!(runtime.subcommands(), vec!["ps"]);
    }
}
