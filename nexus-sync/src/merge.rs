//! Batch merge of deployment artifacts into the registry document.
//!
//! For each target, in the order given:
//! 1. Check the chain name against the chain table.
//! 2. Read `<deployment_dir>/<env>/<chain_id>/<chain_name>.json`.
//! 3. Keep only the allow-listed contracts.
//! 4. Require the network to already exist in the registry document.
//! 5. Write the filtered contracts into `networks.<name>.contracts`.
//!
//! A failing target is recorded and skipped; it never aborts the batch.
//! Targets are processed sequentially against the single in-memory document.

use std::fmt;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use nexus_registry::{ContractMap, Environment, RegistryDocument, SYNCED_CONTRACTS, networks};
use thiserror::Error;

use crate::artifact::{self, ArtifactError};
use crate::config::Config;

/// A `(chain_id, chain_name)` pair to sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// Chain name as found on disk; must match the canonical name.
    pub chain_name: String,
}

impl Target {
    /// Create a new target.
    pub fn new(chain_id: u64, chain_name: impl Into<String>) -> Self {
        Self {
            chain_id,
            chain_name: chain_name.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.chain_name, self.chain_id)
    }
}

/// Why a single network was skipped.
#[derive(Debug, Error)]
pub enum NetworkFailure {
    /// The chain name does not match the chain table.
    #[error(
        "network name {provided:?} does not match chain {chain_id} (expected {})",
        .expected.unwrap_or("a configured chain")
    )]
    NetworkValidationFailed {
        /// Chain ID of the target.
        chain_id: u64,
        /// Name supplied by the caller.
        provided: String,
        /// Canonical name, if the chain ID is configured.
        expected: Option<&'static str>,
    },

    /// No artifact file for this chain.
    #[error("artifact not found at {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// The artifact exists but is not a JSON object.
    #[error(transparent)]
    MalformedArtifact(ArtifactError),

    /// The artifact exists but could not be read.
    #[error(transparent)]
    ArtifactUnreadable(ArtifactError),

    /// The artifact lists none of the allow-listed contracts.
    #[error("no syncable contracts ({}) in {}", SYNCED_CONTRACTS.join(", "), .0.display())]
    NoAllowedContracts(PathBuf),

    /// The registry document has no entry for this network yet.
    #[error("network {0:?} is not in the registry document; it must be bootstrapped first")]
    NetworkNotBootstrapped(String),
}

impl From<ArtifactError> for NetworkFailure {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound(path) => Self::ArtifactNotFound(path),
            e @ ArtifactError::Malformed { .. } => Self::MalformedArtifact(e),
            e @ ArtifactError::Io { .. } => Self::ArtifactUnreadable(e),
        }
    }
}

/// Result of syncing one target.
#[derive(Debug)]
pub struct NetworkOutcome {
    /// The target this outcome is for.
    pub target: Target,
    /// The contracts written into the document, or why the network was
    /// skipped.
    pub result: Result<ContractMap, NetworkFailure>,
}

/// Per-network results of a batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per target.
    pub outcomes: Vec<NetworkOutcome>,
}

impl BatchReport {
    /// Successfully merged networks and their updated contracts.
    pub fn succeeded(&self) -> impl Iterator<Item = (&Target, &ContractMap)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|c| (&o.target, c)))
    }

    /// Skipped networks and the reason.
    pub fn failed(&self) -> impl Iterator<Item = (&Target, &NetworkFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.target, e)))
    }

    /// Number of merged networks.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    /// Number of skipped networks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Merge the artifacts of `targets` into `document`.
///
/// When at least one network succeeds, `updated_at` is set to the current UTC
/// time. When none succeeds the document is left exactly as it was.
pub fn merge_batch(
    config: &Config,
    environment: Environment,
    document: &mut RegistryDocument,
    targets: &[Target],
) -> BatchReport {
    let mut report = BatchReport::default();

    for target in targets {
        let result = merge_network(config, environment, document, target);
        match &result {
            Ok(contracts) => tracing::info!(
                chain_id = target.chain_id,
                network = %target.chain_name,
                contracts = contracts.len(),
                "merged"
            ),
            Err(e) => tracing::warn!(
                chain_id = target.chain_id,
                network = %target.chain_name,
                error = %e,
                "skipped"
            ),
        }
        report.outcomes.push(NetworkOutcome {
            target: target.clone(),
            result,
        });
    }

    if report.success_count() > 0 {
        document.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    tracing::info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "merge finished"
    );
    report
}

fn merge_network(
    config: &Config,
    environment: Environment,
    document: &mut RegistryDocument,
    target: &Target,
) -> Result<ContractMap, NetworkFailure> {
    let expected = networks::name_for(target.chain_id).ok();
    if expected != Some(target.chain_name.as_str()) {
        return Err(NetworkFailure::NetworkValidationFailed {
            chain_id: target.chain_id,
            provided: target.chain_name.clone(),
            expected,
        });
    }

    let path = config.artifact_path(environment, target.chain_id, &target.chain_name);
    let contents = artifact::read(&path)?;

    let filtered = artifact::filter_allowed(&contents, SYNCED_CONTRACTS);
    if filtered.is_empty() {
        return Err(NetworkFailure::NoAllowedContracts(path));
    }

    let entry = document
        .network_mut(&target.chain_name)
        .ok_or_else(|| NetworkFailure::NetworkNotBootstrapped(target.chain_name.clone()))?;
    entry.merge_contracts(&filtered);

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::DateTime;
    use serde_json::json;

    use super::*;

    fn config(root: &Path) -> Config {
        Config {
            deployment_dir: root.to_path_buf(),
            ..Config::default()
        }
    }

    fn write_artifact(root: &Path, env: Environment, chain_id: u64, name: &str, body: &str) {
        let dir = root.join(env.as_str()).join(chain_id.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{name}.json")), body).unwrap();
    }

    fn document(value: serde_json::Value) -> RegistryDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn merges_allow_listed_contracts_only() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            Environment::Main,
            1,
            "Ethereum",
            r#"{"NexusBootstrap":"0xAAA","NexusAccountFactory":"0xBBB","Other":"0xCCC"}"#,
        );
        let mut doc = document(json!({"networks": {"Ethereum": {"contracts": {}}}, "updated_at": null}));

        let report = merge_batch(
            &config(dir.path()),
            Environment::Main,
            &mut doc,
            &[Target::new(1, "Ethereum")],
        );

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 0);
        assert_eq!(
            serde_json::to_value(&doc.networks["Ethereum"].contracts).unwrap(),
            json!({"NexusBootstrap": "0xAAA", "NexusAccountFactory": "0xBBB"})
        );
        let stamp = doc.updated_at.as_deref().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
    }

    #[test]
    fn preserves_untouched_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), Environment::Demo, 8453, "Base", r#"{"NexusBootstrap":"0x2"}"#);
        let mut doc = document(json!({
            "networks": {
                "Base": {"contracts": {"A": "0x1"}, "extra": 42},
                "Gnosis": {"contracts": {"NexusBootstrap": "0x9"}}
            },
            "updated_at": null
        }));

        let report = merge_batch(
            &config(dir.path()),
            Environment::Demo,
            &mut doc,
            &[Target::new(8453, "Base")],
        );

        assert_eq!(report.success_count(), 1);
        assert_eq!(
            serde_json::to_value(&doc.networks["Base"]).unwrap(),
            json!({"contracts": {"A": "0x1", "NexusBootstrap": "0x2"}, "extra": 42})
        );
        assert_eq!(
            serde_json::to_value(&doc.networks["Gnosis"]).unwrap(),
            json!({"contracts": {"NexusBootstrap": "0x9"}})
        );
    }

    #[test]
    fn missing_artifact_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), Environment::Main, 10, "Optimism", r#"{"NexusAccountFactory":"0xF"}"#);
        let mut doc = document(json!({
            "networks": {"Base": {"contracts": {}}, "Optimism": {"contracts": {}}}
        }));

        let report = merge_batch(
            &config(dir.path()),
            Environment::Main,
            &mut doc,
            &[Target::new(8453, "Base"), Target::new(10, "Optimism")],
        );

        let failures: Vec<_> = report.failed().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.chain_id, 8453);
        assert!(matches!(failures[0].1, NetworkFailure::ArtifactNotFound(_)));
        assert_eq!(report.success_count(), 1);
        assert!(doc.networks["Base"].contracts.is_empty());
        assert_eq!(doc.networks["Optimism"].contracts["NexusAccountFactory"], json!("0xF"));
    }

    #[test]
    fn network_must_be_bootstrapped() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), Environment::Staging, 137, "Polygon", r#"{"NexusBootstrap":"0x1"}"#);
        let mut doc = document(json!({"networks": {"Base": {"contracts": {}}}, "updated_at": null}));
        let before = doc.clone();

        let report = merge_batch(
            &config(dir.path()),
            Environment::Staging,
            &mut doc,
            &[Target::new(137, "Polygon")],
        );

        assert_eq!(report.success_count(), 0);
        assert!(matches!(
            report.failed().next(),
            Some((_, NetworkFailure::NetworkNotBootstrapped(name))) if name == "Polygon"
        ));
        assert_eq!(doc, before, "a batch without successes must not touch the document");
    }

    #[test]
    fn name_mismatch_and_unknown_chain_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), Environment::Main, 1, "Base", r#"{"NexusBootstrap":"0x1"}"#);
        let mut doc = document(json!({"networks": {"Base": {"contracts": {}}}}));

        let report = merge_batch(
            &config(dir.path()),
            Environment::Main,
            &mut doc,
            &[Target::new(1, "Base"), Target::new(424_242, "Base")],
        );

        let failures: Vec<_> = report.failed().collect();
        assert_eq!(failures.len(), 2);
        assert!(matches!(
            failures[0].1,
            NetworkFailure::NetworkValidationFailed { expected: Some("Ethereum"), .. }
        ));
        assert!(matches!(
            failures[1].1,
            NetworkFailure::NetworkValidationFailed { expected: None, .. }
        ));
        assert!(doc.updated_at.is_none());
    }

    #[test]
    fn malformed_and_empty_artifacts_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), Environment::Main, 1, "Ethereum", "{oops");
        write_artifact(dir.path(), Environment::Main, 10, "Optimism", r#"{"Nexus":"0x1"}"#);
        let mut doc = document(json!({
            "networks": {"Ethereum": {"contracts": {}}, "Optimism": {"contracts": {}}}
        }));

        let report = merge_batch(
            &config(dir.path()),
            Environment::Main,
            &mut doc,
            &[Target::new(1, "Ethereum"), Target::new(10, "Optimism")],
        );

        let failures: Vec<_> = report.failed().map(|(_, e)| e).collect();
        assert!(matches!(failures[0], NetworkFailure::MalformedArtifact(_)));
        assert!(matches!(failures[1], NetworkFailure::NoAllowedContracts(_)));
        assert_eq!(report.success_count(), 0);
    }
}
