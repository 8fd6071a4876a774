//! Sliding-window thumbnail paging for photo slideshows.
//!
//! A [`NodeSequence`](state::NodeSequence) owns the ordered items, a
//! [`SlideshowService`](services::SlideshowService) keeps a bounded window of
//! thumbnails resident around the focused one, and a
//! [`ThumbnailSource`](services::ThumbnailSource) supplies the thumbnails.

pub mod config;
pub mod error;
pub mod events;
pub mod file_utils;
pub(crate) mod image_cache;
pub mod image_loader;
pub mod media;
pub mod services;
pub mod state;

pub use config::SlideshowConfig;
pub use error::{AppError, Result};
pub use events::{EventHub, SlideshowEvent, Subscription};
pub use media::{ItemId, MediaItem, MediaKind, Thumbnail};
pub use services::{
    CachedThumbnailSource, FileThumbnailSource, SlideView, SlideshowService, ThumbnailSource,
};
pub use state::{LoadState, NodeSequence, OrderMode};
