use anyhow::Result;
use colored::Colorize;

use super::report;
use crate::config::TransferConfig;
use crate::docker::config::RunConfig;
use crate::docker::runtime::{CommandStatus, ContainerRuntime, RuntimeError};

/// Start the work container: re-attach to an existing one, otherwise
/// create it with the configured mount, ports and GPU options.
pub async fn start_container(runtime: &dyn ContainerRuntime, config: &TransferConfig) -> Result<()> {
    let name = config.container_name()?;
    let image = config.image_name()?;
    let mount_point = config.mount_point()?;
    let host_directory = config.host_directory()?;
    let ports = config.ports()?;
    let gpu = config.gpu()?;

    if runtime.container_exists(&name).await? {
        println!(
            "{} Starting existing container {}...",
            "=>".blue().bold(),
            name.cyan()
        );
        let status = runtime.start_attached(&name).await?;
        report(status, &format!("Container {} exited", name));
        return Ok(());
    }

    let run = RunConfig {
        name,
        image,
        mounts: vec![(host_directory, mount_point)],
        ports,
        gpu,
    };

    println!("{} docker run {}", "=>".blue().bold(), run.args().join(" "));

    let status = runtime.run_container(&run).await?;
    report(status, &format!("Container {} exited", run.name));
    Ok(())
}

pub async fn stop_container(
    runtime: &dyn ContainerRuntime,
    config: &TransferConfig,
) -> Result<CommandStatus> {
    let name = config.container_name()?;

    println!("{} Stopping container {}...", "=>".blue().bold(), name.cyan());
    Ok(runtime.stop_container(&name).await?)
}

/// Stop the container if it is running, then remove it
pub async fn delete_container(runtime: &dyn ContainerRuntime, config: &TransferConfig) -> Result<()> {
    let name = config.container_name()?;

    let stopped = match stop_container(runtime, config).await {
        Ok(status) => status.success(),
        // A container that is not running fails to stop even in strict mode
        Err(e) if matches!(e.downcast_ref::<RuntimeError>(), Some(RuntimeError::Failed { .. })) => {
            false
        }
        Err(e) => return Err(e),
    };

    if stopped {
        println!("{} Stopped container {}", "✓".green().bold(), name.cyan());
    } else {
        println!("{} Container {} not running", "-".dimmed(), name.cyan());
    }

    let status = runtime.remove_container(&name).await?;
    report(status, &format!("Deleted container {}", name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Operation;
    use crate::config::GpuOptions;
    use crate::docker::config::DockerCommand;
    use crate::docker::fake::FakeRuntime;
    use serde_json::{json, Value};
    use std::path::Path;

    fn config(document: Value) -> TransferConfig {
        TransferConfig::from_value(Path::new("cfg.json"), document).unwrap()
    }

    fn start_config(extra: Value) -> TransferConfig {
        let mut document = json!({
            "image": {"name": "x"},
            "container": {"name": "c"},
            "volume": {"mount-point": "/m", "host-directory": "/h"},
            "ports": {"default": [80]}
        });
        if let (Some(base), Some(extra)) = (document.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        config(document)
    }

    fn run_args(runtime: &FakeRuntime) -> Vec<String> {
        runtime
            .calls()
            .iter()
            .find_map(|call| match call {
                DockerCommand::Run(run) => Some(run.args()),
                _ => None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_creates_missing_container() {
        let runtime = FakeRuntime::new();
        Operation::Start.run(&start_config(json!({})), &runtime).await.unwrap();

        assert_eq!(runtime.subcommands(), vec!["ps", "run"]);
        assert_eq!(
            runtime.calls()[1].args(),
            vec!["run", "--name", "c", "-v", "/h:/m", "-p", "80:80", "x"]
        );
    }

    #[tokio::test]
    async fn test_start_reattaches_existing_container() {
        let runtime = FakeRuntime::new().with_containers(&["c-old", "c"]);
        Operation::Start.run(&start_config(json!({})), &runtime).await.unwrap();

        assert_eq!(runtime.subcommands(), vec!["ps", "start"]);
        assert_eq!(
            runtime.calls()[1],
            DockerCommand::StartAttached { name: "c".into() }
        );
    }

    #[tokio::test]
    async fn test_start_ignores_substring_matches() {
        let runtime = FakeRuntime::new().with_containers(&["c-old"]);
        Operation::Start.run(&start_config(json!({})), &runtime).await.unwrap();
        assert_eq!(runtime.subcommands(), vec!["ps", "run"]);
    }

    #[tokio::test]
    async fn test_start_publishes_ports_in_order() {
        let runtime = FakeRuntime::new();
        let cfg = start_config(json!({"ports": {"default": [8080, 22]}}));
        Operation::Start.run(&cfg, &runtime).await.unwrap();

        let args = run_args(&runtime);
        let published: Vec<&str> = args
            .windows(2)
            .filter(|pair| pair[0] == "-p")
            .map(|pair| pair[1].as_str())
            .collect();
        assert_eq!(published, vec!["8080:8080", "22:22"]);
    }

    #[tokio::test]
    async fn test_start_without_gpu_section() {
        let runtime = FakeRuntime::new();
        Operation::Start.run(&start_config(json!({})), &runtime).await.unwrap();

        let args = run_args(&runtime);
        assert!(!args.iter().any(|a| a == "--ulimit" || a == "--gpus"));
    }

    #[tokio::test]
    async fn test_start_with_gpu_section() {
        let runtime = FakeRuntime::new();
        let cfg = start_config(json!({
            "gpu": {"ulimit": ["memlock=-1", "stack=67108864"], "gpus": "all"}
        }));
        Operation::Start.run(&cfg, &runtime).await.unwrap();

        match &runtime.calls()[1] {
            DockerCommand::Run(run) => assert_eq!(
                run.gpu,
                Some(GpuOptions {
                    ulimits: vec!["memlock=-1".into(), "stack=67108864".into()],
                    gpus: Some("all".into()),
                })
            ),
            other => panic!("expected run, got {}", other),
        }

        let args = run_args(&runtime);
        assert_eq!(args.iter().filter(|a| *a == "--gpus").count(), 1);
        assert_eq!(args.iter().filter(|a| *a == "--ulimit").count(), 2);
        assert_eq!(args.last().map(String::as_str), Some("x"));
    }

    #[tokio::test]
    async fn test_start_gpu_section_without_gpus() {
        let runtime = FakeRuntime::new();
        let cfg = start_config(json!({"gpu": {"ulimit": ["memlock=-1"]}}));
        Operation::Start.run(&cfg, &runtime).await.unwrap();

        let args = run_args(&runtime);
        assert!(!args.iter().any(|a| a == "--gpus"));
        assert_eq!(args.iter().filter(|a| *a == "--ulimit").count(), 1);
    }

    #[tokio::test]
    async fn test_stop_container() {
        let runtime = FakeRuntime::new();
        Operation::Stop
            .run(&config(json!({"container": {"name": "c"}})), &runtime)
            .await
            .unwrap();
        assert_eq!(runtime.calls(), vec![DockerCommand::Stop { name: "c".into() }]);
    }

    #[tokio::test]
    async fn test_delete_always_removes() {
        for stop_code in [0, 1] {
            let runtime = FakeRuntime::new().with_exit_code("stop", stop_code);
            Operation::Delete
                .run(&config(json!({"container": {"name": "c"}})), &runtime)
                .await
                .unwrap();

            assert_eq!(
                runtime.calls(),
                vec![
                    DockerCommand::Stop { name: "c".into() },
                    DockerCommand::Remove { name: "c".into() },
                ]
            );
        }
    }
}
