//! VPC provider implementation

use crate::error::{Result, VpcError};
use async_trait::async_trait;
use clusterflow_cloud::{
    CloudProvider, NodeInventory, ProviderKind, RawOutput, ShapePolicy, Terraform,
    prefixed_variables,
};
use clusterflow_config::VpcConfig;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODULE_DIR: &str = "data/vpc";

/// VPC provider
pub struct VpcProvider {
    terraform: Terraform,
    config: VpcConfig,
}

impl VpcProvider {
    pub fn new(config: VpcConfig, module_dir: Option<PathBuf>) -> Result<Self> {
        if config.region.trim().is_empty() {
            return Err(VpcError::MissingSetting("region"));
        }

        let module_dir = module_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_DIR));
        Ok(Self {
            terraform: Terraform::new(module_dir),
            config,
        })
    }

    pub fn config(&self) -> &VpcConfig {
        &self.config
    }
}

#[async_trait]
impl CloudProvider for VpcProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vpc
    }

    fn display_name(&self) -> &str {
        "IBM Cloud VPC"
    }

    fn variables(&self) -> clusterflow_cloud::Result<Map<String, Value>> {
        prefixed_variables(self.name(), &self.config)
    }

    async fn apply(&self, workspace: &Path) -> clusterflow_cloud::Result<PathBuf> {
        tracing::info!(
            region = %self.config.region,
            vpc = %self.config.name,
            "Applying VPC infrastructure"
        );
        self.terraform.apply(workspace, self.name()).await
    }

    async fn output(&self, workspace: &Path) -> clusterflow_cloud::Result<RawOutput> {
        self.terraform.output(workspace).await
    }

    async fn destroy(&self, workspace: &Path) -> clusterflow_cloud::Result<()> {
        tracing::info!(region = %self.config.region, "Destroying VPC infrastructure");
        self.terraform.destroy(workspace, self.name()).await
    }

    fn normalize(&self, raw: &RawOutput) -> clusterflow_cloud::Result<NodeInventory> {
        clusterflow_cloud::normalize(raw, ShapePolicy::ScalarTolerant)
    }
}
