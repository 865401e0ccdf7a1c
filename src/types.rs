use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

// One UI element annotation as it appears in a ScreenSpot JSON array.
// Unknown keys are ignored; every key except `id` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default)]
    pub id: Option<Value>,
    pub img_filename: String,
    /// Absolute `[x, y, width, height]` in pixels, top-left origin
    pub bbox: [f64; 4],
    pub data_type: String,
    pub instruction: String,
    pub data_source: String,
}

/// Pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A single label attached to a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_cls")]
pub struct Classification {
    pub label: String,
}

/// A single labeled box in relative `[x, y, width, height]` coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_cls")]
pub struct Detection {
    pub label: String,
    pub bounding_box: [f64; 4],
}

/// Media metadata filled in by the dataset store, not by the ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_cls")]
pub struct ImageMetadata {
    pub size_bytes: u64,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub num_channels: u8,
}

/// The output unit handed to a dataset sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSample {
    pub filepath: PathBuf,
    pub ui_id: Option<Value>,
    pub instruction: String,
    pub data_source: Classification,
    #[serde(rename = "action_detection")]
    pub detection: Detection,
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
}

/// Why an annotation item was dropped without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ImageNotFound { path: PathBuf },
    ImageUnreadable { path: PathBuf, reason: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ImageNotFound { path } => {
                write!(f, "Image not found: {}", path.display())
            }
            SkipReason::ImageUnreadable { path, reason } => {
                write!(f, "Could not open image {}: {}", path.display(), reason)
            }
        }
    }
}

/// Result of resolving one annotation item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Sample(NormalizedSample),
    Skipped(SkipReason),
}

// Counters collected over one ingestion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub files_processed: usize,
    pub items_seen: usize,
    pub samples_produced: usize,
    pub skipped_missing_image: usize,
    pub skipped_unreadable_image: usize,
}

impl IngestSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.items_seen += 1;
        match outcome {
            ItemOutcome::Sample(_) => self.samples_produced += 1,
            ItemOutcome::Skipped(SkipReason::ImageNotFound { .. }) => {
                self.skipped_missing_image += 1
            }
            ItemOutcome::Skipped(SkipReason::ImageUnreadable { .. }) => {
                self.skipped_unreadable_image += 1
            }
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped_missing_image + self.skipped_unreadable_image
    }

    pub fn print_summary(&self) {
        log::info!("=== Ingestion Summary ===");
        log::info!("Annotation files processed: {}", self.files_processed);
        log::info!("Annotation items seen: {}", self.items_seen);
        log::info!("Samples produced: {}", self.samples_produced);

        if self.total_skipped() > 0 {
            log::warn!(
                "Total skipped annotations: {} (missing image file: {}, unreadable image: {})",
                self.total_skipped(),
                self.skipped_missing_image,
                self.skipped_unreadable_image
            );
        }
    }
}
