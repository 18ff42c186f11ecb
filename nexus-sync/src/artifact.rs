//! Reading per-chain deployment artifacts.
//!
//! An artifact is the JSON object written by the deployment step, mapping
//! contract name to deployed address. Only the allow-listed contracts are
//! ever synced; everything else is dropped here.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use nexus_registry::ContractMap;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No file at the expected path.
    #[error("artifact not found at {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not a JSON object.
    #[error("malformed artifact {}: {source}", .path.display())]
    Malformed {
        /// Artifact path.
        path: PathBuf,
        /// Parse error.
        source: serde_json::Error,
    },

    /// Any other read failure.
    #[error("reading artifact {}: {source}", .path.display())]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Load and parse the artifact at `path`.
///
/// Carriage returns are stripped before parsing so files written on Windows
/// hosts parse the same way.
///
/// # Errors
///
/// Returns [`ArtifactError::NotFound`] if the file is missing and
/// [`ArtifactError::Malformed`] if it is not a JSON object.
pub fn read(path: &Path) -> Result<ContractMap, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ArtifactError::NotFound(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let cleaned = raw.replace('\r', "");
    serde_json::from_str(&cleaned).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Keep only the contracts named in `allow_list`, copying their addresses
/// verbatim.
///
/// Filtering an already-filtered map with the same list returns it unchanged.
#[must_use]
pub fn filter_allowed(artifact: &ContractMap, allow_list: &[&str]) -> ContractMap {
    let mut filtered = ContractMap::new();
    for (name, address) in artifact {
        if !allow_list.contains(&name.as_str()) {
            tracing::info!(contract = %name, "skipping contract outside the sync allow-list");
            continue;
        }
        if !looks_like_address(address) {
            tracing::warn!(contract = %name, %address, "value is not an EVM address, syncing as-is");
        }
        filtered.insert(name.clone(), address.clone());
    }
    filtered
}

fn looks_like_address(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.parse::<Address>().is_ok())
}
