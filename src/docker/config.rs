use std::fmt;

use crate::config::GpuOptions;

/// Build file used by `--build`, relative to the build context
pub const BUILD_FILE: &str = "Dockerfile.work";

/// Build context used by `--build` (the working directory)
pub const BUILD_CONTEXT: &str = ".";

/// In-container destination for `--save` snapshots of the host directory
pub const ARCHIVE_DIR: &str = "/tf/archive/";

/// Settings for a fresh `docker run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub name: String,
    pub image: String,
    pub mounts: Vec<(String, String)>, // (host, container)
    pub ports: Vec<u16>,
    pub gpu: Option<GpuOptions>,
}

impl RunConfig {
    /// Arguments following `docker run`, image last
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--name".to_string(), self.name.clone()];

        for (host, container) in &self.mounts {
            args.push("-v".to_string());
            args.push(format!("{}:{}", host, container));
        }

        // Host and container side always share the port number
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}", port, port));
        }

        if let Some(gpu) = &self.gpu {
            for ulimit in &gpu.ulimits {
                args.push("--ulimit".to_string());
                args.push(ulimit.clone());
            }
            if let Some(gpus) = &gpu.gpus {
                args.push("--gpus".to_string());
                args.push(gpus.clone());
            }
        }

        args.push(self.image.clone());
        args
    }
}

/// Tag of a committed image: `<repo>/<name>`
pub fn image_tag(repo: &str, name: &str) -> String {
    format!("{}/{}", repo, name)
}

/// A single invocation of the docker CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerCommand {
    Build {
        dockerfile: String,
        tag: String,
        context: String,
    },
    ListContainers {
        name: String,
    },
    StartAttached {
        name: String,
    },
    Run(RunConfig),
    Commit {
        container: String,
        tag: String,
    },
    Copy {
        source: String,
        container: String,
        destination: String,
    },
    Push {
        tag: String,
    },
    Stop {
        name: String,
    },
    Remove {
        name: String,
    },
}

impl DockerCommand {
    pub fn subcommand(&self) -> &'static str {
        match self {
            Self::Build { .. } => "build",
            Self::ListContainers { .. } => "ps",
            Self::StartAttached { .. } => "start",
            Self::Run(_) => "run",
            Self::Commit { .. } => "commit",
            Self::Copy { .. } => "cp",
            Self::Push { .. } => "push",
            Self::Stop { .. } => "stop",
            Self::Remove { .. } => "rm",
        }
    }

    /// Full argument list, subcommand first
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.subcommand().to_string()];
        match self {
            Self::Build {
                dockerfile,
                tag,
                context,
            } => {
                args.extend(["-f".into(), dockerfile.clone(), "-t".into(), tag.clone()]);
                args.push(context.clone());
            }
            Self::ListContainers { name } => {
                args.extend([
                    "-a".into(),
                    "--filter".into(),
                    format!("name={}", name),
                    "--format".into(),
                    "{{.Names}}".into(),
                ]);
            }
            Self::StartAttached { name } => {
                args.extend(["-a".into(), name.clone()]);
            }
            Self::Run(config) => args.extend(config.args()),
            Self::Commit { container, tag } => {
                args.extend([container.clone(), tag.clone()]);
            }
            Self::Copy {
                source,
                container,
                destination,
            } => {
                args.push(source.clone());
                args.push(format!("{}:{}", container, destination));
            }
            Self::Push { tag } => args.push(tag.clone()),
            Self::Stop { name } | Self::Remove { name } => args.push(name.clone()),
        }
        args
    }
}

impl fmt::Display for DockerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "docker {}", self.args().join(" "))
    }
}
