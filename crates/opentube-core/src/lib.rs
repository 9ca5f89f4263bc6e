//! Opentube Core Library
//!
//! This crate provides the core domain models, error types, configuration, and
//! resilience primitives that are shared across all opentube components.

pub mod breaker;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod retry;
pub mod storage_types;

// Re-export commonly used types
pub use breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use config::{Config, IngestConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, PublishErrorKind};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use storage_types::StorageBackend;
