//! Cloud provider trait definition

use crate::error::{CloudError, Result};
use crate::inventory::NodeInventory;
use crate::output::RawOutput;
use crate::terraform::{provider_var_file, write_var_file};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    PowerVs,
    Vpc,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::PowerVs => "powervs",
            ProviderKind::Vpc => "vpc",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "powervs" => Ok(ProviderKind::PowerVs),
            "vpc" => Ok(ProviderKind::Vpc),
            other => Err(CloudError::ProviderNotFound(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloud provider abstraction trait
///
/// Each backend wraps one infrastructure description and owns the rules for
/// reading its output. Calls carry no state between them; everything
/// persistent lives in the workspace directory.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Returns the provider name (e.g., "powervs", "vpc")
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Provider settings as flat terraform variables
    fn variables(&self) -> Result<Map<String, Value>>;

    /// Write [`CloudProvider::variables`] into the workspace
    async fn dump_config(&self, workspace: &Path) -> Result<PathBuf> {
        let path = provider_var_file(workspace, self.name());
        write_var_file(&path, &self.variables()?).await?;
        Ok(path)
    }

    /// Provision the infrastructure, returning the state location
    async fn apply(&self, workspace: &Path) -> Result<PathBuf>;

    /// Read the outputs of the last apply
    async fn output(&self, workspace: &Path) -> Result<RawOutput>;

    /// Tear the infrastructure down
    async fn destroy(&self, workspace: &Path) -> Result<()>;

    /// Convert raw output into the canonical inventory
    fn normalize(&self, raw: &RawOutput) -> Result<NodeInventory>;
}

/// Prefix every key of a serialized config struct, dropping empty strings so
/// terraform falls back to the module defaults.
pub fn prefixed_variables<T: serde::Serialize>(
    prefix: &str,
    config: &T,
) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(config)?;
    let Value::Object(fields) = value else {
        return Err(CloudError::InvalidConfig(format!(
            "{} settings must serialize to a map",
            prefix
        )));
    };

    Ok(fields
        .into_iter()
        .filter(|(_, v)| !matches!(v, Value::Null) && v.as_str() != Some(""))
        .map(|(k, v)| (format!("{}_{}", prefix, k), v))
        .collect())
}
