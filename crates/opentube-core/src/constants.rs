//! Shared constants used across opentube crates.

/// Default HTTP port when PORT is not set.
pub const DEFAULT_SERVER_PORT: u16 = 4000;

/// Pixel dimensions thumbnails are normalized to.
pub const THUMBNAIL_WIDTH: u32 = 1280;
pub const THUMBNAIL_HEIGHT: u32 = 720;

/// Thumbnails are captured at this fraction of the video duration instead of
/// frame 0, which is frequently black or blank.
pub const THUMBNAIL_OFFSET_FRACTION: f64 = 0.10;

/// Content type published alongside rendered thumbnails.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/png";

/// Objects for source videos live under this key prefix.
pub const VIDEO_KEY_PREFIX: &str = "videos";

/// Objects for thumbnails live under this key prefix.
pub const THUMBNAIL_KEY_PREFIX: &str = "thumbnails";
