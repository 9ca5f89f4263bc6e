//! Opentube Media Library
//!
//! This crate provides the transient staging area for in-flight uploads and
//! media inspection via external ffmpeg/ffprobe tools. Staged files live in a
//! per-request scratch directory that is removed when ingestion finishes,
//! whatever the outcome.

pub mod inspector;
pub mod probe;
pub mod staging;
pub mod thumbnail;

// Re-export commonly used types
pub use inspector::{FfmpegInspector, Inspector, MediaProbeResult};
pub use probe::{DurationProbe, ProbeError};
pub use staging::{ArtifactKind, StagedArtifact, StagingArea, StagingError};
pub use thumbnail::ThumbnailRenderer;
