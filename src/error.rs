//! Unified error types for the slideshow pager.

use crate::media::ItemId;
use std::fmt;

/// Application-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The starting item handed to a slideshow is not part of its item list
    StartItemNotFound(ItemId),
    /// Two items in one slideshow share an id
    DuplicateItem(ItemId),
    /// A navigation index points past the end of the item list
    IndexOutOfRange { index: usize, len: usize },
    /// Window sizes or limits that cannot produce a usable slideshow
    InvalidConfig(String),
    /// Error loading or decoding an image file
    ImageLoad(String),
    /// The item kind has no decodable still image
    Unsupported(String),
    /// Error scanning directory for image files
    DirectoryScan(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StartItemNotFound(id) => {
                write!(f, "Starting item {} is not in the item list", id)
            }
            AppError::DuplicateItem(id) => {
                write!(f, "Item {} appears more than once in the item list", id)
            }
            AppError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} is out of range for {} items", index, len)
            }
            AppError::InvalidConfig(msg) => write!(f, "Invalid slideshow config: {}", msg),
            AppError::ImageLoad(msg) => write!(f, "Image load error: {}", msg),
            AppError::Unsupported(msg) => write!(f, "Unsupported media: {}", msg),
            AppError::DirectoryScan(msg) => write!(f, "Directory scan error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::ImageLoad(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::DirectoryScan(err.to_string())
    }
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, AppError>;
