//! ScreenSpot annotation ingestion
//!
//! This library converts ScreenSpot-style JSON annotations (UI element boxes in
//! screenshots) into normalized image samples and persists them as a dataset.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod schema;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, IngestConfig};
pub use conversion::{normalize_bbox, process_item};
pub use dataset::{build_dataset, ingest_annotations, IngestOutput};
pub use error::IngestError;
pub use io::{FsImageProbe, ImageProbe};
pub use store::{Dataset, DatasetSink, JsonDatasetStore};
pub use types::{
    AnnotationRecord, ImageDimensions, IngestSummary, ItemOutcome, NormalizedSample, SkipReason,
};
