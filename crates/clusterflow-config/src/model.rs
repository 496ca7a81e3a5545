//! Configuration model
//!
//! The YAML file carries one section per concern:
//!
//! ```yaml
//! common:
//!   cluster_name: ci-k8s-1
//!   api_key: "..."
//!   kubeconfig_path: ./kubeconfig
//! powervs:
//!   region: syd
//!   zone: syd05
//! deployer:
//!   target_provider: powervs
//!   retry_on_tf_failure: 2
//!   extra_vars:
//!     containerd_version: "1.7.2"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterflowConfig {
    pub common: CommonConfig,
    pub powervs: PowerVsConfig,
    pub vpc: VpcConfig,
    pub deployer: DeployerOptions,
}

/// Settings shared by every provider.
///
/// Serialized as-is into the playbook variables, so every field must stay a
/// flat scalar. Fields that only steer the deployer are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    pub cluster_name: String,
    pub api_key: String,
    pub ssh_private_key: String,
    pub ssh_public_key: String,
    pub kubeconfig_path: String,
    pub k8s_version: String,
    pub release_marker: String,
    pub build_version: String,
    pub runtime: String,
    pub network_plugin: String,
    pub workers_count: u32,
    pub bootstrap_token: String,
    /// Comma separated master addresses, filled in after provisioning
    pub extra_cert: String,
    #[serde(skip_serializing)]
    pub ignore_destroy: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            cluster_name: String::new(),
            api_key: String::new(),
            ssh_private_key: "~/.ssh/id_rsa".to_string(),
            ssh_public_key: "~/.ssh/id_rsa.pub".to_string(),
            kubeconfig_path: String::new(),
            k8s_version: String::new(),
            release_marker: "ci/latest".to_string(),
            build_version: String::new(),
            runtime: "containerd".to_string(),
            network_plugin: "calico".to_string(),
            workers_count: 1,
            bootstrap_token: String::new(),
            extra_cert: String::new(),
            ignore_destroy: false,
        }
    }
}

/// PowerVS provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerVsConfig {
    pub region: String,
    pub zone: String,
    pub service_id: String,
    pub network_name: String,
    pub image_name: String,
    pub memory: String,
    pub processors: String,
    pub proc_type: String,
    pub sys_type: String,
    pub ssh_key: String,
}

/// VPC provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VpcConfig {
    pub region: String,
    pub zone: String,
    #[serde(alias = "vpc_name")]
    pub name: String,
    pub subnet_name: String,
    pub resource_group: String,
    pub image_name: String,
    pub node_profile: String,
    pub ssh_key: String,
}

/// Knobs for the deployer itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerOptions {
    /// `powervs` or `vpc`
    pub target_provider: String,
    /// Additional apply attempts after the first failure
    pub retry_on_tf_failure: u32,
    /// Terminate the process when apply keeps failing
    pub break_on_upfail: bool,
    pub playbook: String,
    pub extra_vars: BTreeMap<String, String>,
    pub set_kubeconfig: bool,
    /// Reuse an existing cluster directory instead of failing
    pub ignore_cluster_dir: bool,
    pub fetch_instance_data: bool,
    /// Terraform module directory, `data/<provider>` when unset
    pub terraform_dir: Option<PathBuf>,
    pub logs_dir: PathBuf,
    pub check_dependencies: bool,
}

impl Default for DeployerOptions {
    fn default() -> Self {
        Self {
            target_provider: "powervs".to_string(),
            retry_on_tf_failure: 1,
            break_on_upfail: false,
            playbook: "install-k8s.yml".to_string(),
            extra_vars: BTreeMap::new(),
            set_kubeconfig: true,
            ignore_cluster_dir: false,
            fetch_instance_data: false,
            terraform_dir: None,
            logs_dir: PathBuf::from("_artifacts").join("logs"),
            check_dependencies: true,
        }
    }
}
