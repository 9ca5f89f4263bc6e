#[cfg(feature = "storage-local")]
use crate::LocalPublisher;
#[cfg(feature = "storage-s3")]
use crate::S3Publisher;
use crate::{ObjectPublisher, PublishError, PublishResult, StorageBackend};
use opentube_core::Config;
use std::sync::Arc;

/// Create a publication backend based on configuration
pub async fn create_publisher(config: &Config) -> PublishResult<Arc<dyn ObjectPublisher>> {
    let backend = config.storage_backend().unwrap_or(StorageBackend::S3);

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| PublishError::Config("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .unwrap_or_else(|| "us-east-1".to_string());
            let endpoint = config.s3_endpoint().map(String::from);
            let public_base = config.public_base_url().map(String::from);

            let publisher = S3Publisher::new(bucket, region, endpoint, public_base).await?;
            Ok(Arc::new(publisher))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(PublishError::Config(
            "S3 backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let publisher = LocalPublisher::new(
                config.local_storage_path(),
                config.local_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(publisher))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(PublishError::Config(
            "Local backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
