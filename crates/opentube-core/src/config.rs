use crate::constants::{
    DEFAULT_SERVER_PORT, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH,
};
use crate::storage_types::StorageBackend;
use anyhow::Result;
use std::env;
use std::str::FromStr;

/// Runtime configuration for the ingestion service.
///
/// Loaded once at startup from environment variables (with `.env` support via
/// dotenvy) and shared behind `Config`. Unknown or malformed optional values
/// fall back to defaults; required values (`JWT_SECRET`, `DATABASE_URL`) fail
/// startup.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub server_port: u16,
    pub cors_origins: String,
    pub environment: String,

    pub jwt_secret: String,

    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,

    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    /// CDN or bucket-website base used to derive public URLs from object keys.
    pub public_base_url: Option<String>,
    pub local_storage_path: String,
    pub local_base_url: String,

    pub staging_dir: String,
    pub max_video_size_mb: usize,

    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub probe_timeout_seconds: u64,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,

    pub publish_max_retries: u32,
    pub publish_base_delay_ms: u64,
    pub publish_max_delay_ms: u64,
}

/// Boxed configuration handle passed around the application.
#[derive(Debug, Clone)]
pub struct Config(pub Box<IngestConfig>);

impl Config {
    pub fn server_port(&self) -> u16 {
        self.0.server_port
    }

    pub fn cors_origins(&self) -> &str {
        &self.0.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.0.environment
    }

    pub fn is_production(&self) -> bool {
        self.0.environment == "production"
    }

    pub fn jwt_secret(&self) -> &str {
        &self.0.jwt_secret
    }

    pub fn database_url(&self) -> &str {
        &self.0.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.0.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.0.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.0.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.0.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.0.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.0.s3_endpoint.as_deref()
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.0.public_base_url.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.0.local_storage_path
    }

    pub fn local_base_url(&self) -> &str {
        &self.0.local_base_url
    }

    pub fn staging_dir(&self) -> &str {
        &self.0.staging_dir
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.0.max_video_size_mb * 1024 * 1024
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.0.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.0.ffprobe_path
    }

    pub fn probe_timeout_seconds(&self) -> u64 {
        self.0.probe_timeout_seconds
    }

    pub fn thumbnail_width(&self) -> u32 {
        self.0.thumbnail_width
    }

    pub fn thumbnail_height(&self) -> u32 {
        self.0.thumbnail_height
    }

    pub fn publish_max_retries(&self) -> u32 {
        self.0.publish_max_retries
    }

    pub fn publish_base_delay_ms(&self) -> u64 {
        self.0.publish_base_delay_ms
    }

    pub fn publish_max_delay_ms(&self) -> u64 {
        self.0.publish_max_delay_ms
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(DEFAULT_SERVER_PORT);

        let cors_origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .unwrap_or(10);

        let db_timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|v| StorageBackend::from_str(&v).ok());

        let s3_bucket = env::var("S3_BUCKET").ok();
        let s3_region = env::var("S3_REGION").ok();
        let s3_endpoint = env::var("S3_ENDPOINT").ok();
        let public_base_url = env::var("PUBLIC_STORAGE_URL").ok();

        let local_storage_path =
            env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./storage".to_string());

        let local_base_url = env::var("LOCAL_STORAGE_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/storage", server_port));

        let staging_dir = env::var("STAGING_DIR").unwrap_or_else(|_| "uploads".to_string());

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<usize>()
            .unwrap_or(500);

        let ffmpeg_path = env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
        let ffprobe_path = env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string());

        let probe_timeout_seconds = env::var("PROBE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let thumbnail_width = env::var("THUMBNAIL_WIDTH")
            .unwrap_or_else(|_| THUMBNAIL_WIDTH.to_string())
            .parse::<u32>()
            .unwrap_or(THUMBNAIL_WIDTH);

        let thumbnail_height = env::var("THUMBNAIL_HEIGHT")
            .unwrap_or_else(|_| THUMBNAIL_HEIGHT.to_string())
            .parse::<u32>()
            .unwrap_or(THUMBNAIL_HEIGHT);

        let publish_max_retries = env::var("PUBLISH_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .unwrap_or(3);

        let publish_base_delay_ms = env::var("PUBLISH_BASE_DELAY_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u64>()
            .unwrap_or(100);

        let publish_max_delay_ms = env::var("PUBLISH_MAX_DELAY_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()
            .unwrap_or(5000);

        Ok(Config(Box::new(IngestConfig {
            server_port,
            cors_origins,
            environment,
            jwt_secret,
            database_url,
            db_max_connections,
            db_timeout_seconds,
            storage_backend,
            s3_bucket,
            s3_region,
            s3_endpoint,
            public_base_url,
            local_storage_path,
            local_base_url,
            staging_dir,
            max_video_size_mb,
            ffmpeg_path,
            ffprobe_path,
            probe_timeout_seconds,
            thumbnail_width,
            thumbnail_height,
            publish_max_retries,
            publish_base_delay_ms,
            publish_max_delay_ms,
        })))
    }

    /// Validate configuration consistency at startup. Invalid combinations
    /// abort before the server binds so misconfiguration never serves traffic.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret().len() < 16 {
            anyhow::bail!("JWT_SECRET must be at least 16 characters");
        }

        if self.is_production() && self.cors_origins() == "*" {
            anyhow::bail!("CORS_ORIGINS must not be '*' in production");
        }

        if self.storage_backend() == Some(StorageBackend::S3) {
            if self.s3_bucket().is_none() {
                anyhow::bail!("S3_BUCKET is required when STORAGE_BACKEND is s3");
            }
            if self.s3_region().is_none() && self.s3_endpoint().is_none() {
                anyhow::bail!("S3_REGION or S3_ENDPOINT is required when STORAGE_BACKEND is s3");
            }
        }

        if self.0.max_video_size_mb == 0 {
            anyhow::bail!("MAX_VIDEO_SIZE_MB must be greater than zero");
        }

        if self.probe_timeout_seconds() == 0 {
            anyhow::bail!("PROBE_TIMEOUT_SECONDS must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config(Box::new(IngestConfig {
            server_port: 4000,
            cors_origins: "*".to_string(),
            environment: "development".to_string(),
            jwt_secret: "test-secret-at-least-16".to_string(),
            database_url: "postgres://localhost/opentube_test".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 30,
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            public_base_url: None,
            local_storage_path: "./storage".to_string(),
            local_base_url: "http://localhost:4000/storage".to_string(),
            staging_dir: "uploads".to_string(),
            max_video_size_mb: 500,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            probe_timeout_seconds: 30,
            thumbnail_width: 1280,
            thumbnail_height: 720,
            publish_max_retries: 3,
            publish_base_delay_ms: 100,
            publish_max_delay_ms: 5000,
        }))
    }

    #[test]
    fn test_valid_development_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = test_config();
        config.0.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.0.cors_origins = "https://opentube.example".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let mut config = test_config();
        config.0.storage_backend = Some(StorageBackend::S3);
        assert!(config.validate().is_err());

        config.0.s3_bucket = Some("media".to_string());
        config.0.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = test_config();
        config.0.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_video_size_converts_to_bytes() {
        let config = test_config();
        assert_eq!(config.max_video_size_bytes(), 500 * 1024 * 1024);
    }
}
