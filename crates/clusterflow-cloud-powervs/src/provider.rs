//! PowerVS provider implementation

use crate::error::{PowerVsError, Result};
use async_trait::async_trait;
use clusterflow_cloud::{
    CloudProvider, NodeInventory, ProviderKind, RawOutput, ShapePolicy, Terraform,
    prefixed_variables,
};
use clusterflow_config::PowerVsConfig;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODULE_DIR: &str = "data/powervs";

/// PowerVS provider
pub struct PowerVsProvider {
    terraform: Terraform,
    config: PowerVsConfig,
}

impl PowerVsProvider {
    /// Create the provider, failing fast on settings the module cannot default
    pub fn new(config: PowerVsConfig, module_dir: Option<PathBuf>) -> Result<Self> {
        if config.region.trim().is_empty() {
            return Err(PowerVsError::MissingSetting("region"));
        }
        if config.zone.trim().is_empty() {
            return Err(PowerVsError::MissingSetting("zone"));
        }

        let module_dir = module_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_DIR));
        Ok(Self {
            terraform: Terraform::new(module_dir),
            config,
        })
    }

    pub fn config(&self) -> &PowerVsConfig {
        &self.config
    }
}

#[async_trait]
impl CloudProvider for PowerVsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::PowerVs
    }

    fn display_name(&self) -> &str {
        "IBM Power Virtual Server"
    }

    fn variables(&self) -> clusterflow_cloud::Result<Map<String, Value>> {
        prefixed_variables(self.name(), &self.config)
    }

    async fn apply(&self, workspace: &Path) -> clusterflow_cloud::Result<PathBuf> {
        tracing::info!(
            zone = %self.config.zone,
            module = %self.terraform.module_dir().display(),
            "Applying PowerVS infrastructure"
        );
        self.terraform.apply(workspace, self.name()).await
    }

    async fn output(&self, workspace: &Path) -> clusterflow_cloud::Result<RawOutput> {
        self.terraform.output(workspace).await
    }

    async fn destroy(&self, workspace: &Path) -> clusterflow_cloud::Result<()> {
        tracing::info!(zone = %self.config.zone, "Destroying PowerVS infrastructure");
        self.terraform.destroy(workspace, self.name()).await
    }

    fn normalize(&self, raw: &RawOutput) -> clusterflow_cloud::Result<NodeInventory> {
        clusterflow_cloud::normalize(raw, ShapePolicy::Strict)
    }
}
