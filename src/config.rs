//! Application configuration constants and slideshow tuning.

use crate::error::{AppError, Result};
use serde::Deserialize;

/// Supported image file extensions for scanning directories.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Video extensions that are listed in a slideshow but never decoded here.
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "m4v", "webm"];

/// Number of items requested by the initial load and by each look-ahead batch.
pub const DEFAULT_ADVANCE_BATCH_SIZE: usize = 20;

/// Number of positions on each side of the current one that stay resident.
pub const DEFAULT_RETENTION_BUFFER_SIZE: usize = 20;

/// Longest edge, in pixels, of a decoded thumbnail.
pub const DEFAULT_THUMBNAIL_EDGE: u32 = 1024;

/// Entries kept by the decoded-thumbnail LRU cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Acquisitions allowed to run at once inside one batch.
pub const DEFAULT_MAX_CONCURRENT_ACQUISITIONS: usize = 4;

/// Window sizes and concurrency limits for a slideshow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlideshowConfig {
    pub advance_batch_size: usize,
    pub retention_buffer_size: usize,
    pub max_concurrent_acquisitions: usize,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            advance_batch_size: DEFAULT_ADVANCE_BATCH_SIZE,
            retention_buffer_size: DEFAULT_RETENTION_BUFFER_SIZE,
            max_concurrent_acquisitions: DEFAULT_MAX_CONCURRENT_ACQUISITIONS,
        }
    }
}

impl SlideshowConfig {
    /// Creates a config with the given window sizes and default concurrency.
    pub fn new(advance_batch_size: usize, retention_buffer_size: usize) -> Self {
        Self {
            advance_batch_size,
            retention_buffer_size,
            ..Self::default()
        }
    }

    /// Parses a JSON document. Missing fields fall back to the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AppError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero-sized windows and a zero concurrency limit.
    pub fn validate(&self) -> Result<()> {
        if self.advance_batch_size == 0 {
            return Err(AppError::InvalidConfig(
                "advance_batch_size must be at least 1".to_string(),
            ));
        }
        if self.retention_buffer_size == 0 {
            return Err(AppError::InvalidConfig(
                "retention_buffer_size must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_acquisitions == 0 {
            return Err(AppError::InvalidConfig(
                "max_concurrent_acquisitions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on resident thumbnails once a window pass has finished.
    pub fn resident_bound(&self) -> usize {
        self.retention_buffer_size
            .saturating_mul(2)
            .saturating_add(self.advance_batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = SlideshowConfig::default();
        assert_eq!(config.advance_batch_size, 20);
        assert_eq!(config.retention_buffer_size, 20);
        assert_eq!(config.resident_bound(), 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SlideshowConfig::from_json_str(r#"{"advance_batch_size": 5}"#).unwrap();
        assert_eq!(config.advance_batch_size, 5);
        assert_eq!(config.retention_buffer_size, DEFAULT_RETENTION_BUFFER_SIZE);
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let err = SlideshowConfig::from_json_str(r#"{"retention_buffer_size": 0}"#).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    fn huge_sizes_saturate_the_bound() {
        let json = format!(r#"{{"retention_buffer_size": {}}}"#, usize::MAX);
        let config = SlideshowConfig::from_json_str(&json).unwrap();
        assert_eq!(config.resident_bound(), usize::MAX);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(SlideshowConfig::from_json_str("{ nope").is_err());
    }
}
