use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or reading the transfer configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file {} must contain a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("Missing required config fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Config field '{path}' must be {expected}")]
    InvalidField { path: String, expected: &'static str },
}
