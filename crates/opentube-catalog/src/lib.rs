//! Opentube Catalog Library
//!
//! This crate provides the asset catalog: the system of record for ingested
//! media. The CatalogWriter trait abstracts over Postgres and an in-memory
//! implementation used in tests.

pub mod memory;
pub mod postgres;
pub mod writer;

// Re-export commonly used types
pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;
pub use writer::CatalogWriter;
