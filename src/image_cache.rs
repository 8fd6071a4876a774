//! Thumbnail cache for fast re-acquisition.
//!
//! Keeps decoded thumbnails keyed by item id under an LRU policy, so a
//! position that was evicted from the slideshow window can come back without
//! touching the disk again.

use crate::media::{ItemId, Thumbnail};
use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache for decoded thumbnails.
pub struct ThumbnailCache {
    cache: LruCache<ItemId, Thumbnail>,
}

impl ThumbnailCache {
    /// Creates a new cache with the specified capacity. A zero capacity holds one entry.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Retrieves a thumbnail from the cache if it exists.
    pub fn get(&mut self, id: ItemId) -> Option<Thumbnail> {
        let result = self.cache.get(&id).cloned();
        if result.is_some() {
            log::debug!("Cache HIT: {}", id);
        } else {
            log::debug!("Cache MISS: {}", id);
        }
        result
    }

    /// Stores a thumbnail in the cache.
    pub fn put(&mut self, id: ItemId, thumbnail: Thumbnail) {
        log::debug!(
            "Cache PUT: {} ({}x{})",
            id,
            thumbnail.width,
            thumbnail.height
        );
        self.cache.put(id, thumbnail);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}
