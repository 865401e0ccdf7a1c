use serde_json::Value;
use std::path::Path;

use crate::error::{IngestError, Result};
use crate::io::ImageProbe;
use crate::types::{
    AnnotationRecord, Classification, Detection, ImageDimensions, ItemOutcome, NormalizedSample,
    SkipReason,
};

/// Convert an absolute `[x, y, w, h]` box to coordinates relative to the image size.
///
/// No clamping: out of range and negative values pass through unchanged.
/// `size` must be non-zero in both axes.
pub fn normalize_bbox(bbox: [f64; 4], size: ImageDimensions) -> [f64; 4] {
    let width = size.width as f64;
    let height = size.height as f64;
    let [x, y, w, h] = bbox;
    [x / width, y / height, w / width, h / height]
}

/// Deserialize one raw annotation object. Missing required keys are fatal.
pub fn parse_record(value: Value, source: &Path, index: usize) -> Result<AnnotationRecord> {
    serde_json::from_value(value).map_err(|e| IngestError::InvalidRecord {
        path: source.to_path_buf(),
        index,
        source: e,
    })
}

/// Assemble the output sample for a record whose image has been measured.
pub fn build_sample(
    record: AnnotationRecord,
    image_path: &Path,
    size: ImageDimensions,
) -> NormalizedSample {
    NormalizedSample {
        filepath: image_path.to_path_buf(),
        ui_id: record.id,
        instruction: record.instruction,
        data_source: Classification {
            label: record.data_source,
        },
        detection: Detection {
            label: record.data_type,
            bounding_box: normalize_bbox(record.bbox, size),
        },
        metadata: None,
    }
}

/// Resolve a record against its image, deciding between a sample and a skip.
pub fn resolve_record<P: ImageProbe + ?Sized>(
    record: AnnotationRecord,
    images_dir: &Path,
    probe: &P,
) -> ItemOutcome {
    let image_path = images_dir.join(&record.img_filename);

    if !probe.exists(&image_path) {
        return ItemOutcome::Skipped(SkipReason::ImageNotFound { path: image_path });
    }

    match probe.dimensions(&image_path) {
        Ok(size) => ItemOutcome::Sample(build_sample(record, &image_path, size)),
        Err(reason) => ItemOutcome::Skipped(SkipReason::ImageUnreadable {
            path: image_path,
            reason,
        }),
    }
}

/// Parse and resolve one raw item: `Err` aborts the run, `Skipped` drops the item.
pub fn process_item<P: ImageProbe + ?Sized>(
    value: Value,
    source: &Path,
    index: usize,
    images_dir: &Path,
    probe: &P,
) -> Result<ItemOutcome> {
    let record = parse_record(value, source, index)?;
    Ok(resolve_record(record, images_dir, probe))
}
