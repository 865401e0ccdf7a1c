use log::{info, warn};
use std::path::Path;

use crate::config::IngestConfig;
use crate::conversion::process_item;
use crate::error::Result;
use crate::io::{discover_annotation_files, read_annotation_file, FsImageProbe, ImageProbe};
use crate::store::DatasetSink;
use crate::types::{IngestSummary, ItemOutcome, NormalizedSample};

/// Samples produced by one pass over the annotation directory.
#[derive(Debug, Clone, Default)]
pub struct IngestOutput {
    pub samples: Vec<NormalizedSample>,
    pub summary: IngestSummary,
}

impl IngestOutput {
    /// The closing line reported after all files are processed.
    pub fn total_message(&self) -> String {
        format!("Processed {} samples total", self.samples.len())
    }
}

/// Parse every annotation file and resolve each item against its image.
///
/// Samples keep file order, then array order within a file. Missing or
/// undecodable images are skipped with a warning; anything else aborts.
pub fn ingest_annotations<P: ImageProbe + ?Sized>(
    config: &IngestConfig,
    probe: &P,
) -> Result<IngestOutput> {
    let mut output = IngestOutput::default();

    for annotation_file in discover_annotation_files(&config.annotations_dir)? {
        info!("Processing {}...", display_name(&annotation_file));
        let items = read_annotation_file(&annotation_file)?;

        for (index, item) in items.into_iter().enumerate() {
            let outcome = process_item(item, &annotation_file, index, &config.images_dir, probe)?;
            output.summary.record(&outcome);

            match outcome {
                ItemOutcome::Sample(sample) => output.samples.push(sample),
                ItemOutcome::Skipped(reason) => warn!("{}", reason),
            }
        }
        output.summary.files_processed += 1;
    }

    info!("{}", output.total_message());
    Ok(output)
}

/// Full pipeline: ingest, then create, fill and finalize the dataset.
///
/// Ingestion completes before the sink is touched, so a fatal error leaves
/// any existing dataset of the same name in place.
pub fn build_dataset<S: DatasetSink>(
    config: &IngestConfig,
    sink: &mut S,
) -> Result<(S::Handle, IngestSummary)> {
    let IngestOutput { samples, summary } = ingest_annotations(config, &FsImageProbe)?;

    info!("Creating dataset {}...", config.dataset_name);
    let mut handle = sink.create(&config.dataset_name)?;
    let added = sink.insert(&mut handle, samples)?;
    info!("Added {} samples to {}", added, config.dataset_name);
    sink.finalize(&mut handle)?;

    Ok((handle, summary))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
