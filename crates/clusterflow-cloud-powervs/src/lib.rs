//! IBM Power Virtual Server provider for clusterflow
//!
//! Implements the `CloudProvider` trait on top of the PowerVS terraform
//! module. The module publishes node lists as plain lists, so any other
//! output shape is treated as a broken module rather than tolerated.
//!
//! # Requirements
//!
//! - `terraform` must be installed
//! - Credentials are passed through `common.api_key` untouched
//!
//! # Example
//!
//! ```ignore
//! use clusterflow_cloud::CloudProvider;
//! use clusterflow_cloud_powervs::PowerVsProvider;
//!
//! let provider = PowerVsProvider::new(config.powervs.clone(), None)?;
//! provider.dump_config(&workspace).await?;
//! let state = provider.apply(&workspace).await?;
//! ```

pub mod error;
pub mod provider;

pub use error::{PowerVsError, Result};
pub use provider::{DEFAULT_MODULE_DIR, PowerVsProvider};
