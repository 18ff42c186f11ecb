//! Chain table, environment model and registry document types shared by the
//! Nexus deployment tooling.
//!
//! Everything in this crate is static or pure: lookups against fixed tables
//! and the serde model of the shared registry document. Remote I/O lives in
//! `nexus-sync`.

mod environment;
mod error;
pub mod networks;
pub mod types;

pub use environment::{
    Buckets, DEFAULT_SHARED_BUCKET, DEFAULT_STAGING_BUCKET, Environment, validate_environment,
};
pub use error::Error;
pub use networks::Chain;
pub use types::{ContractMap, NetworkEntry, RegistryDocument, SYNCED_CONTRACTS};
