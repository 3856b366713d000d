pub mod error;
pub mod transfer;

pub use error::ConfigError;
pub use transfer::{GpuOptions, TransferConfig, DEFAULT_CONFIG_FILE};
