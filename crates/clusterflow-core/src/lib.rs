//! clusterflow core
//!
//! Drives a cluster from nothing to a verified, reachable Kubernetes
//! installation, and back down again. The heavy lifting is delegated to
//! external tools:
//!
//! - `terraform` through a [`clusterflow_cloud::CloudProvider`]
//! - `ansible-playbook` through a [`PlaybookRunner`]
//! - `kubectl` through a [`ClusterClient`]
//!
//! [`Deployer`] sequences them and owns the per-cluster [`Workspace`].

pub mod ansible;
pub mod apply;
pub mod deployer;
pub mod deps;
pub mod error;
pub mod health;
pub mod inventory;
pub mod kubeconfig;
pub mod logs;
pub mod vars;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use ansible::{AnsiblePlaybook, PlaybookRunner};
pub use apply::{ApplyDriver, BREAK_ON_FAILURE_EXIT_CODE, HaltFn};
pub use deployer::{Deployer, Phase, build_provider};
pub use error::{DeployError, HealthError, KubeconfigError, Result};
pub use health::{ClusterClient, HealthStatus, Kubectl, ProbeOutput};
pub use inventory::InventoryBuilder;
pub use kubeconfig::{replace_host, rewrite_kubeconfig};
pub use vars::AnsibleVars;
pub use workspace::Workspace;
