//! Opentube Storage Library
//!
//! This crate provides the object publication abstraction for ingested media.
//! It includes the ObjectPublisher trait and implementations for S3-compatible
//! stores and the local filesystem, plus an in-memory publisher for tests.
//!
//! # Object key format
//!
//! Published objects use a fixed key layout shared by all backends:
//!
//! - **Videos**: `videos/{staged_filename}`
//! - **Thumbnails**: `thumbnails/thumb-{staged_filename}.png`
//!
//! where `staged_filename` is the unique name assigned at staging time. Keys
//! must not contain `..` or a leading `/`. Key derivation is centralized in the
//! `keys` module so the ingestion and deletion paths stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod publisher;
#[cfg(feature = "storage-s3")]
pub mod s3;

// Re-export commonly used types
pub use factory::create_publisher;
#[cfg(feature = "storage-local")]
pub use local::LocalPublisher;
pub use memory::{InjectedFailure, MemoryPublisher};
pub use opentube_core::StorageBackend;
pub use publisher::{ObjectPublisher, PublishError, PublishResult, PublishedLocator};
#[cfg(feature = "storage-s3")]
pub use s3::S3Publisher;
