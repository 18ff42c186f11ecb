//! Operator confirmation and the single upload that ends a batch.
//!
//! The whole batch is shown at once: every merged network with its
//! addresses, then every skipped network with the reason. The operator
//! accepts or rejects all of it with one answer, and on acceptance the fully
//! merged document is uploaded in one write.

use std::fmt::{self, Write as _};
use std::io::{BufRead, Write};

use nexus_registry::{Environment, RegistryDocument};
use serde_json::Value;

use crate::merge::BatchReport;
use crate::remote::{RemoteError, RemoteRegistry};

/// Something that can approve or reject a batch after seeing its summary.
pub trait Confirm {
    /// Returns `true` to upload, `false` to discard the batch.
    fn confirm(&mut self, summary: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, summary: &str) -> bool {
        self(summary)
    }
}

/// Interactive confirmation on a terminal: prints the summary, asks
/// `Proceed? [y/N]`, and reads one line.
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on standard input and output.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Prompt on arbitrary streams.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, summary: &str) -> bool {
        if write!(self.output, "{summary}\nProceed with upload? [y/N] ")
            .and_then(|()| self.output.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

/// Only a lone `y` (any case, surrounding whitespace ignored) accepts.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// How the commit step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The document was uploaded.
    Uploaded,
    /// The operator declined; nothing was written.
    Declined,
}

/// Render the human-readable batch summary shown before confirmation.
#[must_use]
pub fn render_summary(
    environment: Environment,
    bucket: &str,
    document: &RegistryDocument,
    report: &BatchReport,
) -> String {
    let mut out = String::new();
    if let Err(e) = write_summary(&mut out, environment, bucket, document, report) {
        tracing::warn!(error = %e, "batch summary truncated");
    }
    out
}

fn write_summary(
    out: &mut String,
    environment: Environment,
    bucket: &str,
    document: &RegistryDocument,
    report: &BatchReport,
) -> fmt::Result {
    writeln!(
        out,
        "Registry update for {environment} (s3://{bucket}/{})",
        RemoteRegistry::key(environment)
    )?;

    writeln!(out, "\nUpdated networks:")?;
    for (target, contracts) in report.succeeded() {
        writeln!(out, "  {target}")?;
        for (name, address) in contracts {
            writeln!(out, "    {name:<22} {}", display_address(address))?;
        }
    }

    let failures: Vec<_> = report.failed().collect();
    if !failures.is_empty() {
        writeln!(out, "\nSkipped networks:")?;
        for (target, reason) in failures {
            writeln!(out, "  {target}: {reason}")?;
        }
    }

    writeln!(
        out,
        "\n{} succeeded, {} failed; updated_at = {}",
        report.success_count(),
        report.failure_count(),
        document.updated_at.as_deref().unwrap_or("null")
    )
}

fn display_address(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_owned)
}

/// Ask for confirmation and, if given, upload `document` once.
///
/// # Errors
///
/// Returns [`RemoteError`] if the upload fails.
pub async fn commit<C: Confirm + ?Sized>(
    remote: &RemoteRegistry,
    environment: Environment,
    document: &RegistryDocument,
    report: &BatchReport,
    confirm: &mut C,
) -> Result<CommitOutcome, RemoteError> {
    let summary = render_summary(environment, remote.bucket(), document, report);
    if !confirm.confirm(&summary) {
        tracing::info!(%environment, "upload declined, registry left unchanged");
        return Ok(CommitOutcome::Declined);
    }

    remote.upload(environment, document).await?;
    Ok(CommitOutcome::Uploaded)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use nexus_registry::ContractMap;
    use object_store::ObjectStore;
    use object_store::memory::InMemory;
    use serde_json::json;

    use super::*;
    use crate::merge::{NetworkFailure, NetworkOutcome, Target};

    fn report() -> BatchReport {
        BatchReport {
            outcomes: vec![
                NetworkOutcome {
                    target: Target::new(8453, "Base"),
                    result: Ok(ContractMap::from([
                        ("NexusAccountFactory".to_owned(), json!("0xBBB")),
                        ("NexusBootstrap".to_owned(), json!("0xAAA")),
                    ])),
                },
                NetworkOutcome {
                    target: Target::new(137, "Polygon"),
                    result: Err(NetworkFailure::NetworkNotBootstrapped("Polygon".to_owned())),
                },
            ],
        }
    }

    #[test]
    fn affirmative_answers() {
        for yes in ["y", "Y", " y\n", "Y\r\n"] {
            assert!(is_affirmative(yes), "{yes:?}");
        }
        for no in ["", "n", "yes", "YES", "yy", "\n", "ok"] {
            assert!(!is_affirmative(no), "{no:?}");
        }
    }

    #[test]
    fn summary_lists_addresses_and_failures() {
        let mut doc = RegistryDocument::default();
        doc.updated_at = Some("2026-10-18T00:00:00Z".to_owned());
        let summary = render_summary(Environment::Main, "bucket", &doc, &report());

        assert!(summary.contains("s3://bucket/main/latest.json"), "{summary}");
        assert!(summary.contains("Base (8453)"), "{summary}");
        assert!(summary.contains("0xAAA") && summary.contains("0xBBB"), "{summary}");
        assert!(summary.contains("Polygon (137)"), "{summary}");
        assert!(summary.contains("bootstrapped"), "{summary}");
        assert!(summary.contains("1 succeeded, 1 failed"), "{summary}");
    }

    #[test]
    fn summary_without_failures_has_no_skipped_section() {
        let mut report = report();
        report.outcomes.truncate(1);
        let summary =
            render_summary(Environment::Demo, "bucket", &RegistryDocument::default(), &report);

        assert!(!summary.contains("Skipped networks"), "{summary}");
        assert!(summary.ends_with("1 succeeded, 0 failed; updated_at = null\n"), "{summary}");
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn commit_with_answer_read_up_front() {
        let store = Arc::new(InMemory::new());
        let remote = RemoteRegistry::new(Arc::clone(&store) as Arc<dyn ObjectStore>, "bucket");
        let doc = RegistryDocument::default();
        let report = report();

        // The answer is collected before the async upload starts, so the
        // commit future holds no terminal handle and stays `Send`.
        let approved = false;
        let mut answer = |_: &str| approved;
        let pending = commit(&remote, Environment::Main, &doc, &report, &mut answer);
        assert_send(&pending);

        assert_eq!(pending.await.unwrap(), CommitOutcome::Declined);
        assert!(store.get(&RemoteRegistry::key(Environment::Main)).await.is_err());

        let outcome = commit(&remote, Environment::Main, &doc, &report, &mut |_: &str| true)
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Uploaded);
        assert!(store.get(&RemoteRegistry::key(Environment::Main)).await.is_ok());
    }

    #[test]
    fn prompt_reads_one_line() {
        let mut output = Vec::new();
        let mut prompt = Prompt::new(Cursor::new("y\nn\n"), &mut output);
        assert!(prompt.confirm("summary"));
        assert!(!prompt.confirm("summary"));
        assert!(!prompt.confirm("summary"), "EOF declines");
        drop(prompt);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Proceed with upload? [y/N]"));
    }
}
