pub mod ingest;

pub use ingest::{IngestionService, UploadRequest};
