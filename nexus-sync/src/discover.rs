//! Discovery of deployment artifacts on disk.
//!
//! The artifact tree is laid out as:
//! ```text
//! <deployment_dir>/<environment>/
//!   ├── 1/Ethereum.json
//!   ├── 10/Optimism.json
//!   └── 8453/Base.json
//! ```

use std::path::Path;

use anyhow::{Context, Result, bail};
use nexus_registry::{Environment, networks};

use crate::config::Config;
use crate::merge::Target;

/// Build the ordered target list for a batch.
///
/// Without `chain_filter`, every numeric chain directory under the
/// environment is scanned (ascending chain ID) and each `*.json` file stem is
/// taken as the chain name. With a filter, the given order is kept and a
/// requested chain with no artifact on disk is still returned under its
/// canonical name, so the merge reports it as missing.
///
/// # Errors
///
/// Returns an error if a requested chain ID is not configured, if the
/// environment directory cannot be read, or if nothing was found.
pub fn discover(
    config: &Config,
    environment: Environment,
    chain_filter: Option<&[u64]>,
) -> Result<Vec<Target>> {
    let env_dir = config.environment_dir(environment);

    let targets = if let Some(ids) = chain_filter {
        let mut targets = Vec::new();
        for &chain_id in ids {
            let canonical = networks::name_for(chain_id)?;
            let found = artifact_names(&env_dir.join(chain_id.to_string()))?;
            if found.is_empty() {
                tracing::warn!(chain_id, dir = %env_dir.display(), "no artifact on disk for requested chain");
                targets.push(Target::new(chain_id, canonical));
            } else {
                targets.extend(found.into_iter().map(|name| Target::new(chain_id, name)));
            }
        }
        targets
    } else {
        scan(&env_dir)?
    };

    if targets.is_empty() {
        bail!("no deployments found under {}", env_dir.display());
    }

    tracing::info!(
        %environment,
        targets = targets.len(),
        "discovered deployments"
    );
    Ok(targets)
}

/// Parse a comma-separated chain ID list such as `1,10,8453`.
///
/// # Errors
///
/// Returns an error if any element is not an integer.
pub fn parse_chain_list(raw: &str) -> Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().with_context(|| format!("invalid chain ID {s:?}")))
        .collect()
}

fn scan(env_dir: &Path) -> Result<Vec<Target>> {
    if !env_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut chain_ids = Vec::new();
    let entries =
        std::fs::read_dir(env_dir).with_context(|| format!("reading {}", env_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading {}", env_dir.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().to_str().map(str::parse::<u64>) {
            Some(Ok(chain_id)) => chain_ids.push(chain_id),
            _ => tracing::debug!(path = %entry.path().display(), "ignoring non chain-id directory"),
        }
    }
    chain_ids.sort_unstable();

    let mut targets = Vec::new();
    for chain_id in chain_ids {
        for name in artifact_names(&env_dir.join(chain_id.to_string()))? {
            targets.push(Target::new(chain_id, name));
        }
    }
    Ok(targets)
}

/// Sorted `*.json` file stems in `dir`; empty if the directory is missing.
fn artifact_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("reading {}", dir.display()))?
            .path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_owned());
        }
    }
    names.sort();
    Ok(names)
}
