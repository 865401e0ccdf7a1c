use glob::{glob, Pattern};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::types::ImageDimensions;
use crate::utils::read_image_dimensions;

/// List the `*.json` files directly under `dir`, in path order.
///
/// A missing directory is an error rather than an empty listing.
pub fn discover_annotation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::MissingAnnotationsDir {
            path: dir.to_path_buf(),
        });
    }

    // Glob metacharacters in the directory itself must match literally
    let pattern = Path::new(&Pattern::escape(&dir.to_string_lossy()))
        .join("*.json")
        .to_string_lossy()
        .into_owned();
    let entries = glob(&pattern).map_err(|source| IngestError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Parse an annotation file into its top-level array of objects.
///
/// Items are left as raw JSON so each one can be validated with its index.
pub fn read_annotation_file(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).map_err(|source| IngestError::ReadAnnotations {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| IngestError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Filesystem access needed to resolve an annotation item to its image.
pub trait ImageProbe {
    fn exists(&self, path: &Path) -> bool;

    /// Return the pixel size, or a human readable reason the image is unusable.
    fn dimensions(&self, path: &Path) -> std::result::Result<ImageDimensions, String>;
}

/// [`ImageProbe`] backed by the real filesystem and the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageProbe;

impl ImageProbe for FsImageProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn dimensions(&self, path: &Path) -> std::result::Result<ImageDimensions, String> {
        read_image_dimensions(path).map_err(|e| e.to_string())
    }
}
