use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "config file not found. Looked in:\n\
        - current directory: clusterflow.local.yaml, .clusterflow.local.yaml, clusterflow.yaml, .clusterflow.yaml\n\
        - ./.clusterflow/ directory\n\
        - ~/.config/clusterflow/clusterflow.yaml\n\
        or set CLUSTERFLOW_CONFIG_PATH to point at the file directly"
    )]
    ConfigFileNotFound,

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid extra var '{0}' (expected key=value)")]
    InvalidExtraVar(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
