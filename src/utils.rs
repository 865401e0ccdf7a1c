use image::{ImageDecoder, ImageReader};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use crate::types::{ImageDimensions, ImageMetadata};

/// Read pixel dimensions from the image header without decoding pixel data.
///
/// The file handle is owned by the reader and closed when it goes out of
/// scope, on success and on every error path.
pub fn read_image_dimensions(path: &Path) -> image::ImageResult<ImageDimensions> {
    let (width, height) = ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(ImageDimensions::new(width, height))
}

/// Inspect an image file for the metadata pass of the dataset store.
pub fn read_image_metadata(path: &Path) -> image::ImageResult<ImageMetadata> {
    let size_bytes = fs::metadata(path)?.len();
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let mime_type = reader
        .format()
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
        .to_string();
    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();

    Ok(ImageMetadata {
        size_bytes,
        mime_type,
        width,
        height,
        num_channels: decoder.color_type().channel_count(),
    })
}

/// Progress bar for a pass over `len` samples, prefixed with `stage`.
pub fn sample_progress_bar(len: u64, stage: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{prefix:.bold} {wide_bar:.green/white} {pos}/{len} samples [{elapsed}] {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    ProgressBar::new(len)
        .with_style(style)
        .with_prefix(stage.to_string())
}

/// Make `path` an empty directory, discarding whatever was there.
pub fn recreate_dir(path: &Path) -> std::io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => log::warn!("Replaced existing directory {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(path)
}
