//! Thumbnail acquisition boundary.
//!
//! The slideshow loader only knows [`ThumbnailSource`]. Whether a thumbnail
//! comes from memory, disk or a remote fetch is up to the implementation
//! handed to it.

use crate::config::{DEFAULT_CACHE_CAPACITY, DEFAULT_THUMBNAIL_EDGE};
use crate::error::{AppError, Result};
use crate::image_cache::ThumbnailCache;
use crate::image_loader;
use crate::media::{MediaItem, MediaKind, Thumbnail};
use log::{debug, warn};
use std::future::Future;
use std::sync::{Mutex, PoisonError};

/// Produces a thumbnail for one item.
///
/// Implementations must tolerate concurrent calls for distinct items, and
/// dropping the returned future cancels the acquisition.
pub trait ThumbnailSource: Send + Sync + 'static {
    fn acquire(&self, item: &MediaItem) -> impl Future<Output = Result<Thumbnail>> + Send;
}

/// Decodes thumbnails from the item's local file.
#[derive(Debug, Clone)]
pub struct FileThumbnailSource {
    max_edge: u32,
}

impl Default for FileThumbnailSource {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_EDGE)
    }
}

impl FileThumbnailSource {
    pub fn new(max_edge: u32) -> Self {
        Self { max_edge }
    }
}

impl ThumbnailSource for FileThumbnailSource {
    async fn acquire(&self, item: &MediaItem) -> Result<Thumbnail> {
        if item.kind == MediaKind::Video {
            return Err(AppError::Unsupported(format!(
                "{} is a video without a still preview",
                item.name
            )));
        }
        let path = item
            .path
            .clone()
            .ok_or_else(|| AppError::ImageLoad(format!("{} has no local file", item.name)))?;

        image_loader::load_thumbnail(path, self.max_edge).await
    }
}

/// Serves repeated acquisitions from an LRU cache in front of `inner`.
pub struct CachedThumbnailSource<S> {
    inner: S,
    cache: Mutex<ThumbnailCache>,
}

impl<S: ThumbnailSource> CachedThumbnailSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(ThumbnailCache::new(capacity)),
        }
    }

    /// Number of thumbnails currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<S: ThumbnailSource> ThumbnailSource for CachedThumbnailSource<S> {
    async fn acquire(&self, item: &MediaItem) -> Result<Thumbnail> {
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(item.id);
        if let Some(thumbnail) = cached {
            return Ok(thumbnail);
        }

        match self.inner.acquire(item).await {
            Ok(thumbnail) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .put(item.id, thumbnail.clone());
                debug!("Acquired {} ({})", item.id, item.name);
                Ok(thumbnail)
            }
            Err(e) => {
                warn!("Failed to acquire {} ({}): {}", item.id, item.name, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ItemId;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::path::Path;

    #[derive(Default)]
    struct CountingSource {
        calls: Mutex<HashMap<ItemId, usize>>,
    }

    impl CountingSource {
        fn calls(&self, id: ItemId) -> usize {
            self.calls.lock().unwrap().get(&id).copied().unwrap_or(0)
        }
    }

    impl ThumbnailSource for CountingSource {
        async fn acquire(&self, item: &MediaItem) -> Result<Thumbnail> {
            *self.calls.lock().unwrap().entry(item.id).or_default() += 1;
            if item.id.0 % 2 == 0 {
                Err(AppError::ImageLoad("even ids fail".to_string()))
            } else {
                Ok(Thumbnail::new(vec![1, 2, 3], 1, 1))
            }
        }
    }

    fn item(id: u64, kind: MediaKind) -> MediaItem {
        MediaItem::new(ItemId(id), format!("{}.png", id), Utc::now(), kind)
    }

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(8, 8).save(&path).unwrap();
        path
    }

    #[async_std::test]
    async fn file_source_decodes_local_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png");
        let source = FileThumbnailSource::new(4);

        let thumbnail = source
            .acquire(&item(1, MediaKind::Image).with_path(path))
            .await
            .unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (4, 4));
    }

    #[async_std::test]
    async fn file_source_rejects_videos_and_missing_paths() {
        let source = FileThumbnailSource::default();
        assert!(matches!(
            source.acquire(&item(1, MediaKind::Video)).await,
            Err(AppError::Unsupported(_))
        ));
        assert!(matches!(
            source.acquire(&item(2, MediaKind::Image)).await,
            Err(AppError::ImageLoad(_))
        ));
    }

    #[async_std::test]
    async fn cache_serves_repeat_acquisitions() {
        let cached = CachedThumbnailSource::with_capacity(CountingSource::default(), 4);
        let one = item(1, MediaKind::Image);

        cached.acquire(&one).await.unwrap();
        cached.acquire(&one).await.unwrap();

        assert_eq!(cached.inner.calls(ItemId(1)), 1);
        assert_eq!(cached.cached_len(), 1);
    }

    #[async_std::test]
    async fn failures_are_not_cached() {
        let cached = CachedThumbnailSource::with_capacity(CountingSource::default(), 4);
        let two = item(2, MediaKind::Image);

        assert!(cached.acquire(&two).await.is_err());
        assert!(cached.acquire(&two).await.is_err());

        assert_eq!(cached.inner.calls(ItemId(2)), 2);
        assert_eq!(cached.cached_len(), 0);
    }
}
