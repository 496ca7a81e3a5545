//! clusterflow cloud infrastructure
//!
//! Provider abstraction for clusterflow: a uniform `apply / output / destroy`
//! contract over terraform-described infrastructure, plus the rules that turn
//! each provider's outputs into one canonical node inventory.
//!
//! # Supported Providers
//!
//! - **PowerVS**: strict, list-shaped outputs
//! - **VPC**: tolerant of bare scalar outputs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               clusterflow-core                  │
//! │              (Deployer up/down)                 │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               clusterflow-cloud                 │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait CloudProvider { apply, output,    │   │
//! │  │                        destroy, normalize}│   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │  Terraform   │  │  Output normalizer   │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │    powervs    │ │      vpc      │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod error;
pub mod instance;
pub mod inventory;
pub mod output;
pub mod provider;
pub mod terraform;

// Re-exports
pub use error::{CloudError, Result};
pub use instance::{InstanceRecord, extract_all_instances, extract_instances};
pub use inventory::{NodeInventory, Role, is_valid_address};
pub use output::{RawOutput, ShapePolicy, normalize, unwrap_value};
pub use provider::{CloudProvider, ProviderKind, prefixed_variables};
pub use terraform::Terraform;
