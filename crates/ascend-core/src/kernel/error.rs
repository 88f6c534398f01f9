//! Top-level error type aggregating the per-subsystem errors.
use thiserror::Error;

use crate::config::error::ConfigSystemError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigSystemError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageSystemError),

    #[error("Plugin system error: {0}")]
    Plugin(#[from] PluginSystemError),
}
