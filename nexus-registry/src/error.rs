//! Configuration errors raised by the chain and environment tables.

use thiserror::Error;

/// Errors produced by lookups against the static tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The chain ID is not in the chain table.
    #[error("unknown chain ID {0}")]
    UnknownChain(u64),

    /// The value is not one of `main`, `demo`, `staging`, `production`.
    #[error("invalid environment {0:?} (expected main, demo, staging or production)")]
    InvalidEnvironment(String),

    /// The environment exists (or not) but cannot be synced to a bucket.
    #[error("environment {0:?} is not supported for registry sync")]
    UnsupportedEnvironment(String),

    /// No chain matches the qualified name.
    #[error("no chain matches {0:?}")]
    ChainNotFound(String),
}
