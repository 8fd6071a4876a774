//! Value types describing slideshow items and their decoded thumbnails.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{SUPPORTED_IMAGE_EXTENSIONS, SUPPORTED_VIDEO_EXTENSIONS};

/// Stable identifier of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// File-type classification of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

impl MediaKind {
    /// Classifies a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if ext == "gif" {
            Some(MediaKind::Gif)
        } else if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// One displayable unit of a slideshow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: ItemId,
    pub name: String,
    pub modified: DateTime<Utc>,
    pub kind: MediaKind,
    /// Local file backing the item, if it has one.
    pub path: Option<PathBuf>,
}

impl MediaItem {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        modified: DateTime<Utc>,
        kind: MediaKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            modified,
            kind,
            path: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Decoded RGB8 thumbnail data.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
}

impl Thumbnail {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: data.into(),
        }
    }

    /// Bytes held by the pixel buffer.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_extension() {
        assert_eq!(MediaKind::from_path(Path::new("a/b.JPG")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("loop.gif")), Some(MediaKind::Gif));
        assert_eq!(MediaKind::from_path(Path::new("clip.mov")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
    }
}
