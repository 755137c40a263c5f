//! Error types for decimesh

use thiserror::Error;

/// Main error type for decimesh operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for decimesh operations
pub type Result<T> = std::result::Result<T, Error>;
