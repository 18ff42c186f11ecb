//! Batch synchronisation of Nexus deployment addresses into the shared
//! registry document.
//!
//! One run fetches the environment's registry document once, merges every
//! discovered chain artifact into it in memory, shows the operator the full
//! result, and uploads the merged document at most once.

pub mod artifact;
pub mod commit;
pub mod config;
pub mod discover;
pub mod merge;
pub mod remote;

use nexus_registry::{Environment, RegistryDocument};
use thiserror::Error;

use crate::commit::{CommitOutcome, Confirm};
use crate::config::Config;
use crate::merge::{BatchReport, Target};
use crate::remote::{RemoteError, RemoteRegistry};

/// Fatal batch outcomes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Every network failed; nothing was offered for upload.
    #[error("no network could be merged ({failed} failed)")]
    NoSuccessfulNetworks {
        /// Number of failed networks.
        failed: usize,
    },

    /// The confirmed upload failed.
    #[error(transparent)]
    Upload(#[from] RemoteError),
}

/// What a completed batch produced.
#[derive(Debug)]
pub struct BatchRun {
    /// Per-network results.
    pub report: BatchReport,
    /// The merged document (uploaded only if `outcome` is
    /// [`CommitOutcome::Uploaded`]).
    pub document: RegistryDocument,
    /// Result of the commit step.
    pub outcome: CommitOutcome,
}

/// Fetch, merge, confirm and upload.
///
/// # Errors
///
/// Returns [`SyncError::NoSuccessfulNetworks`] without prompting or writing
/// when every target fails, and [`SyncError::Upload`] if the confirmed upload
/// fails.
pub async fn run_batch<C: Confirm + ?Sized>(
    config: &Config,
    remote: &RemoteRegistry,
    environment: Environment,
    targets: &[Target],
    confirm: &mut C,
) -> Result<BatchRun, SyncError> {
    let (document, report) = prepare(config, remote, environment, targets).await?;
    let outcome = commit::commit(remote, environment, &document, &report, confirm).await?;
    Ok(BatchRun {
        report,
        document,
        outcome,
    })
}

/// Fetch and merge without prompting or uploading.
///
/// # Errors
///
/// Returns [`SyncError::NoSuccessfulNetworks`] when every target fails.
pub async fn prepare(
    config: &Config,
    remote: &RemoteRegistry,
    environment: Environment,
    targets: &[Target],
) -> Result<(RegistryDocument, BatchReport), SyncError> {
    let mut document = remote.fetch(environment).await;
    let report = merge::merge_batch(config, environment, &mut document, targets);

    if report.success_count() == 0 {
        for (target, reason) in report.failed() {
            tracing::error!(network = %target, error = %reason, "network failed");
        }
        return Err(SyncError::NoSuccessfulNetworks {
            failed: report.failure_count(),
        });
    }
    Ok((document, report))
}
