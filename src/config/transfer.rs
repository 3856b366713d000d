use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Default configuration file, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config-transfer-control.json";

/// Parsed transfer configuration (config-transfer-control.json).
///
/// The document is kept as raw JSON and addressed by dotted paths such as
/// `volume.host-directory`, so each operation only depends on the fields it
/// actually reads.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    path: PathBuf,
    document: Value,
}

/// GPU options attached to a fresh `docker run`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpuOptions {
    pub ulimits: Vec<String>,
    pub gpus: Option<String>,
}

impl TransferConfig {
    /// Load the configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let document: Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_value(path, document)
    }

    /// Wrap an already parsed document
    pub fn from_value(path: &Path, document: Value) -> Result<Self, ConfigError> {
        if !document.is_object() {
            return Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a dotted path (`a.b.c`); keys may contain dashes
    pub fn lookup(&self, field: &str) -> Option<&Value> {
        field
            .split('.')
            .try_fold(&self.document, |node, key| node.as_object()?.get(key))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.lookup(field).is_some()
    }

    /// Report every field in `required` that the document lacks, all at once
    pub fn require(&self, required: &[&str]) -> Result<(), ConfigError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|field| !self.contains(field))
            .map(|field| field.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingFields(missing))
        }
    }

    /// Deserialize an optional field, rejecting values of the wrong shape
    fn optional<T: DeserializeOwned>(
        &self,
        field: &str,
        expected: &'static str,
    ) -> Result<Option<T>, ConfigError> {
        match self.lookup(field) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| ConfigError::InvalidField {
                    path: field.to_string(),
                    expected,
                }),
        }
    }

    fn required<T: DeserializeOwned>(
        &self,
        field: &str,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        self.optional(field, expected)?
            .ok_or_else(|| ConfigError::MissingFields(vec![field.to_string()]))
    }

    /// Required string field
    pub fn string(&self, field: &str) -> Result<String, ConfigError> {
        self.required(field, "a string")
    }

    pub fn image_name(&self) -> Result<String, ConfigError> {
        self.string("image.name")
    }

    pub fn container_name(&self) -> Result<String, ConfigError> {
        self.string("container.name")
    }

    pub fn mount_point(&self) -> Result<String, ConfigError> {
        self.string("volume.mount-point")
    }

    pub fn host_directory(&self) -> Result<String, ConfigError> {
        self.string("volume.host-directory")
    }

    /// Ports published with the same number on host and container side
    pub fn ports(&self) -> Result<Vec<u16>, ConfigError> {
        self.required("ports.default", "an array of port numbers (0-65535)")
    }

    /// GPU options, present only when the config has a `gpu` section.
    /// A section without `ulimit` contributes no ulimit flags.
    pub fn gpu(&self) -> Result<Option<GpuOptions>, ConfigError> {
        let section: Option<Value> = self.optional("gpu", "an object")?;
        match section {
            None => Ok(None),
            Some(value) if !value.is_object() => Err(ConfigError::InvalidField {
                path: "gpu".to_string(),
                expected: "an object",
            }),
            Some(_) => Ok(Some(GpuOptions {
                ulimits: self
                    .optional("gpu.ulimit", "an array of strings")?
                    .unwrap_or_default(),
                gpus: self.optional("gpu.gpus", "a string")?,
            })),
        }
    }
}
