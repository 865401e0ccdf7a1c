use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that abort an ingestion run.
///
/// Per-item problems with images are not errors; they surface as
/// [`crate::types::SkipReason`] instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("annotations directory not found: {}", path.display())]
    MissingAnnotationsDir { path: PathBuf },

    #[error("failed to enumerate annotation files: {0}")]
    Enumerate(#[from] glob::GlobError),

    #[error("failed to read annotation file {}: {source}", path.display())]
    ReadAnnotations {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid annotation #{index} in {}: {source}", path.display())]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset store I/O failed at {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize dataset {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
