//! VPC provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VpcError {
    #[error("vpc.{0} is required")]
    MissingSetting(&'static str),
}

pub type Result<T> = std::result::Result<T, VpcError>;
