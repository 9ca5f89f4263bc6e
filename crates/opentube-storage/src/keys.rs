//! Object key derivation
//!
//! Keys are derived from the staged filename so that a retried publish of the
//! same upload targets the same object, and so deletion can rebuild both keys
//! from the cataloged video URL.

use opentube_core::constants::{THUMBNAIL_KEY_PREFIX, VIDEO_KEY_PREFIX};

/// Object key for the source video: `videos/{staged_filename}`.
pub fn video_key(staged_name: &str) -> String {
    format!("{}/{}", VIDEO_KEY_PREFIX, staged_name)
}

/// Object key for the thumbnail: `thumbnails/thumb-{staged_filename}.png`.
pub fn thumbnail_key(staged_name: &str) -> String {
    format!("{}/thumb-{}.png", THUMBNAIL_KEY_PREFIX, staged_name)
}

/// Recover the staged filename from a cataloged video URL.
///
/// Public URLs always end in `.../videos/{staged_filename}`, so the last
/// path segment is the staged name.
pub fn staged_name_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|s| !s.is_empty())
}
