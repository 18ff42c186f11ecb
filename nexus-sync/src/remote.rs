//! Access to the shared registry document in object storage.
//!
//! Each environment has one object, `<environment>/latest.json`, inside the
//! environment's bucket. Fetching never fails: a missing, unreachable, empty
//! or corrupt object is replaced by the empty document so the batch can go on.
//! Uploading is the only mutating remote call.

use std::sync::Arc;

use nexus_registry::{Environment, RegistryDocument};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use thiserror::Error;

/// Object name of the registry document inside an environment prefix.
const LATEST: &str = "latest.json";

/// Errors returned by [`RemoteRegistry::upload`].
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The document could not be serialized.
    #[error("serializing registry document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The storage service rejected the write.
    #[error("upload to s3://{bucket}/{key} failed: {source}")]
    UploadFailed {
        /// Target bucket.
        bucket: String,
        /// Target key.
        key: String,
        /// Storage error.
        source: object_store::Error,
    },
}

/// Client for the registry document of one bucket.
#[derive(Debug, Clone)]
pub struct RemoteRegistry {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl RemoteRegistry {
    /// Wrap an existing store. `bucket` is only used for log and error
    /// messages.
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Build an S3-backed client. Credentials, region and endpoint are read
    /// from the standard `AWS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the S3 client cannot be configured.
    pub fn s3(bucket: &str) -> Result<Self, object_store::Error> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()?;
        Ok(Self::new(Arc::new(store), bucket))
    }

    /// Bucket this client reads from and writes to.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of the registry document for `environment`.
    #[must_use]
    pub fn key(environment: Environment) -> ObjectPath {
        ObjectPath::from(format!("{}/{LATEST}", environment.as_str()))
    }

    /// Fetch the current registry document.
    ///
    /// Falls back to [`RegistryDocument::default`] when the object is missing,
    /// the request fails, or the body is empty or not a valid document.
    pub async fn fetch(&self, environment: Environment) -> RegistryDocument {
        let key = Self::key(environment);

        let body = match self.store.get(&key).await {
            Ok(result) => result.bytes().await,
            Err(e) => Err(e),
        };
        let bytes = match body {
            Ok(bytes) => bytes,
            Err(object_store::Error::NotFound { .. }) => {
                tracing::info!(bucket = %self.bucket, %key, "no registry document yet, starting empty");
                return RegistryDocument::default();
            }
            Err(e) => {
                tracing::warn!(bucket = %self.bucket, %key, error = %e, "fetch failed, starting empty");
                return RegistryDocument::default();
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::warn!(bucket = %self.bucket, %key, "registry document is empty, starting empty");
            return RegistryDocument::default();
        }

        match RegistryDocument::from_slice(&bytes) {
            Ok(doc) => {
                tracing::info!(
                    bucket = %self.bucket,
                    %key,
                    networks = doc.networks.len(),
                    "fetched registry document"
                );
                doc
            }
            Err(e) => {
                tracing::error!(bucket = %self.bucket, %key, error = %e, "corrupted registry document, starting empty");
                RegistryDocument::default()
            }
        }
    }

    /// Replace the registry document of `environment` with `document`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::UploadFailed`] if the storage write fails.
    pub async fn upload(
        &self,
        environment: Environment,
        document: &RegistryDocument,
    ) -> Result<(), RemoteError> {
        let key = Self::key(environment);
        let mut body = document.to_json()?;
        body.push('\n');

        self.store
            .put(&key, PutPayload::from(body.into_bytes()))
            .await
            .map_err(|source| RemoteError::UploadFailed {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source,
            })?;

        tracing::info!(bucket = %self.bucket, %key, "registry document uploaded");
        Ok(())
    }
}
