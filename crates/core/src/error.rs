use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OssError {
    /// Invalid or missing parameters. Raised before any shared state exists.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(String),

    /// The shared clock region could not be created or attached.
    #[error("failed to acquire clock region {path}: {source}")]
    ResourceAcquisition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Unmapping or removing the shared region failed. Best-effort only.
    #[error("failed to release clock region {path}: {source}")]
    ResourceRelease {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to terminate task {task}: {source}")]
    Terminate {
        task: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OssError>;
