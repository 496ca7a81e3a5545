//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Provider not found: {0} (expected 'powervs' or 'vpc')")]
    ProviderNotFound(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("missing role '{0}' in terraform output")]
    MissingRole(String),

    #[error("role '{0}' has no addresses")]
    EmptyRole(String),

    #[error("output '{key}' has unexpected shape: expected a list, found {found}")]
    UnexpectedShape { key: String, found: &'static str },

    #[error("role '{role}' entry #{index} is not a string")]
    NonStringAddress { role: String, index: usize },

    #[error("role '{role}' has invalid address '{address}'")]
    InvalidAddress { role: String, address: String },

    #[error("output '{0}' not found in terraform output")]
    MissingOutput(String),

    #[error("output '{key}' format is invalid: {reason}")]
    InvalidInstanceData { key: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
