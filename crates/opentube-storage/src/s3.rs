use crate::publisher::{ObjectPublisher, PublishError, PublishResult, PublishedLocator};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::path::Path;

/// S3 publication implementation
#[derive(Clone)]
pub struct S3Publisher {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>, // CDN or website base overriding derived URLs
}

impl S3Publisher {
    /// Create a new S3Publisher instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `public_base_url` - Optional base URL (CDN, bucket website) used to
    ///   build public URLs instead of deriving them from the endpoint
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_base_url: Option<String>,
    ) -> PublishResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| PublishError::Config(e.to_string()))?;

        Ok(S3Publisher {
            store,
            bucket,
            region,
            endpoint_url,
            public_base_url,
        })
    }

    /// Generate the public URL for an object key.
    ///
    /// Prefers the configured public base (CDN), then the custom endpoint in
    /// path-style form, then the standard AWS virtual-hosted URL. The same key
    /// always maps to the same URL.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            // Path-style for S3-compatible providers: {endpoint}/{bucket}/{key}
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    /// Classify an object_store error into retryable or terminal.
    ///
    /// Auth and configuration failures never succeed on retry; everything
    /// else (network faults, 5xx) is assumed transient.
    fn classify(err: ObjectStoreError) -> PublishError {
        match err {
            ObjectStoreError::Unauthenticated { .. } | ObjectStoreError::PermissionDenied { .. } => {
                PublishError::Terminal(err.to_string())
            }
            ObjectStoreError::NotSupported { .. }
            | ObjectStoreError::NotImplemented { .. }
            | ObjectStoreError::Precondition { .. } => PublishError::Terminal(err.to_string()),
            ObjectStoreError::InvalidPath { .. } => PublishError::InvalidKey(err.to_string()),
            ObjectStoreError::UnknownConfigurationKey { .. } => {
                PublishError::Config(err.to_string())
            }
            other => PublishError::Retryable(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectPublisher for S3Publisher {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> PublishResult<PublishedLocator> {
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            PublishError::Terminal(format!(
                "Failed to read staged file {}: {}",
                local_path.display(),
                e
            ))
        })?;

        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = ObjectPath::from(key.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 publish failed"
            );
            Self::classify(e)
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 publish successful"
        );

        Ok(PublishedLocator {
            key: key.to_string(),
            url,
        })
    }

    async fn unpublish(&self, key: &str) -> PublishResult<()> {
        let start = std::time::Instant::now();
        let location = ObjectPath::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 unpublish successful"
                );
                Ok(())
            }
            // Deleting an object that is already gone is a success.
            Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 unpublish failed"
                );
                Err(Self::classify(e))
            }
        }
    }

    async fn exists(&self, key: &str) -> PublishResult<bool> {
        let location = ObjectPath::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(Self::classify(e)),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
