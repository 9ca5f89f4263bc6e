//! Opentube API Library
//!
//! This crate provides the HTTP API handlers, middleware, and application setup.

// Module declarations
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use services::{IngestionService, UploadRequest};
