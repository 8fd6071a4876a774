use crate::error::{AppError, Result};
use crate::media::Thumbnail;
use std::path::{Path, PathBuf};

/// Decodes an image file and scales it down to fit in `max_edge` x `max_edge`.
///
/// Blocking; callers on an async task should use [`load_thumbnail`].
pub fn load_thumbnail_blocking(path: &Path, max_edge: u32) -> Result<Thumbnail> {
    let img = image::ImageReader::open(path)
        .map_err(|e| AppError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| AppError::ImageLoad(format!("{}: {}", path.display(), e)))?
        .decode()?;

    let img = if img.width() > max_edge || img.height() > max_edge {
        img.thumbnail(max_edge, max_edge)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Thumbnail::new(rgb.into_raw(), width, height))
}

/// Runs [`load_thumbnail_blocking`] on the blocking pool so decoding never
/// stalls the task that awaits it.
pub async fn load_thumbnail(path: PathBuf, max_edge: u32) -> Result<Thumbnail> {
    async_std::task::spawn_blocking(move || load_thumbnail_blocking(&path, max_edge)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn large_images_are_scaled_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 400, 100);

        let thumbnail = load_thumbnail_blocking(&path, 100).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (100, 25));
        assert_eq!(thumbnail.byte_len(), 100 * 25 * 3);
    }

    #[test]
    fn small_images_keep_their_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "small.png", 10, 12);

        let thumbnail = load_thumbnail_blocking(&path, 100).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (10, 12));
    }

    #[async_std::test]
    async fn missing_file_is_an_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_thumbnail(dir.path().join("gone.png"), 64).await.unwrap_err();
        assert!(matches!(err, AppError::ImageLoad(_)));
    }

    #[test]
    fn garbage_is_an_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            load_thumbnail_blocking(&path, 64),
            Err(AppError::ImageLoad(_))
        ));
    }
}
