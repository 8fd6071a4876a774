//! Service layer for slideshow logic.
//!
//! Separates window bookkeeping and thumbnail acquisition from whatever view
//! drives the slideshow.

pub mod slideshow_service;
pub mod thumbnail_service;

pub use slideshow_service::{SlideView, SlideshowService};
pub use thumbnail_service::{CachedThumbnailSource, FileThumbnailSource, ThumbnailSource};
