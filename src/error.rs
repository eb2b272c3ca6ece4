//! Error type shared by the strict entry points of the crate.
//!
//! The lenient API repairs bad input (see the crate docs); only the
//! `try_*` constructors and [`DistributionConfig::validate`] report errors.
//!
//! [`DistributionConfig::validate`]: crate::config::DistributionConfig::validate

use thiserror::Error;

/// Errors raised when input cannot be accepted as given.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    /// Family or configuration parameters violate their constraints.
    #[error("invalid distribution parameters: {0}")]
    InvalidParameters(String),
    /// A support, grid or resolution lies outside the accepted domain.
    #[error("domain error: {0}")]
    Domain(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DistributionError>;
