pub mod error;
pub mod model;

pub use error::*;
pub use model::*;

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a config file
pub const CONFIG_PATH_ENV: &str = "CLUSTERFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 4] = [
    "clusterflow.local.yaml",
    ".clusterflow.local.yaml",
    "clusterflow.yaml",
    ".clusterflow.yaml",
];

/// Locate the config file.
///
/// Search order:
/// 1. `CLUSTERFLOW_CONFIG_PATH`
/// 2. current directory: clusterflow.local.yaml, .clusterflow.local.yaml, clusterflow.yaml, .clusterflow.yaml
/// 3. the same names inside `./.clusterflow/`
/// 4. `~/.config/clusterflow/clusterflow.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local_dir = current_dir.join(".clusterflow");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("clusterflow").join("clusterflow.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

impl ClusterflowConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Read a config file without validating it, so callers can layer
    /// overrides on top first
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            cluster = %config.common.cluster_name,
            provider = %config.deployer.target_provider,
            "Loaded config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.common.cluster_name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("common.cluster_name is required".into()));
        }
        if name.contains('/') || name == "." || name == ".." {
            return Err(ConfigError::Invalid(format!(
                "common.cluster_name '{}' must be a plain directory name",
                name
            )));
        }
        if self.deployer.playbook.trim().is_empty() {
            return Err(ConfigError::Invalid("deployer.playbook must not be empty".into()));
        }
        Ok(())
    }
}

/// Parse a `key=value` override. The value may itself contain `=`.
pub fn parse_extra_var(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidExtraVar(raw.to_string())),
    }
}
