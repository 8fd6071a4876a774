use crate::error::Result;
use crate::media::{ItemId, MediaItem, MediaKind};
use chrono::{DateTime, Utc};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether `path` has an extension the slideshow can list.
pub fn is_supported_media(path: &Path) -> bool {
    MediaKind::from_path(path).is_some()
}

/// Scans `dir` (non-recursively) for supported media files.
///
/// Items are ordered by path and numbered from 1 in that order.
pub fn scan_directory(dir: &Path) -> Result<Vec<MediaItem>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_media(path))
        .collect();
    paths.sort();

    let items: Vec<MediaItem> = paths
        .into_iter()
        .zip(1u64..)
        .filter_map(|(path, id)| {
            let kind = MediaKind::from_path(&path)?;
            let modified: DateTime<Utc> = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .map(DateTime::from)
                .unwrap_or_default();
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some(MediaItem::new(ItemId(id), name, modified, kind).with_path(path))
        })
        .collect();

    debug!("Scanned {} media files in {}", items.len(), dir.display());
    Ok(items)
}
