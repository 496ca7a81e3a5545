//! IBM Cloud VPC provider for clusterflow
//!
//! Implements the `CloudProvider` trait on top of the VPC terraform module.
//! Single-node clusters publish their addresses as bare strings, so outputs
//! are coerced into lists instead of rejected.

pub mod error;
pub mod provider;

pub use error::{Result, VpcError};
pub use provider::{DEFAULT_MODULE_DIR, VpcProvider};
