//! Dataset sinks.
//!
//! The ingestor only talks to [`DatasetSink`]. [`JsonDatasetStore`] persists a
//! dataset as a directory holding `dataset.json` and `samples.json`.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::schema::{infer_schema, Schema};
use crate::types::NormalizedSample;
use crate::utils::{read_image_metadata, recreate_dir, sample_progress_bar};

pub const DATASET_INFO_FILE: &str = "dataset.json";
pub const SAMPLES_FILE: &str = "samples.json";

/// Destination for normalized samples.
pub trait DatasetSink {
    type Handle;

    /// Create an empty dataset, replacing any existing dataset with the same name.
    fn create(&mut self, name: &str) -> Result<Self::Handle>;

    /// Append samples in order; returns how many were added.
    fn insert(&mut self, handle: &mut Self::Handle, samples: Vec<NormalizedSample>)
        -> Result<usize>;

    /// Compute metadata, infer dynamic fields and persist.
    fn finalize(&mut self, handle: &mut Self::Handle) -> Result<()>;
}

/// Contents of `dataset.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub media_type: String,
    pub sample_count: usize,
    pub created_at: DateTime<Utc>,
    pub schema: Schema,
}

/// Handle to a dataset living in a [`JsonDatasetStore`].
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    dir: PathBuf,
    created_at: DateTime<Utc>,
    samples: Vec<NormalizedSample>,
    schema: Schema,
}

impl Dataset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn samples(&self) -> &[NormalizedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn add_samples(&mut self, samples: Vec<NormalizedSample>) -> usize {
        let added = samples.len();
        self.samples.extend(samples);
        added
    }

    /// Re-read every image to fill in sample metadata.
    ///
    /// An unreadable image leaves that sample's metadata empty.
    pub fn compute_metadata(&mut self) {
        info!("Computing metadata for {} samples...", self.samples.len());
        let pb = sample_progress_bar(self.samples.len() as u64, "metadata");

        for sample in &mut self.samples {
            sample.metadata = match read_image_metadata(&sample.filepath) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!(
                        "Could not compute metadata for {}: {}",
                        sample.filepath.display(),
                        e
                    );
                    None
                }
            };
            pb.inc(1);
        }
        pb.finish_with_message("Metadata complete");
    }

    /// Infer the field schema from the samples as they will be written.
    pub fn add_dynamic_sample_fields(&mut self) -> Result<()> {
        let documents = self
            .samples
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<Value>, _>>()
            .map_err(|source| IngestError::Serialize {
                name: self.name.clone(),
                source,
            })?;

        self.schema = infer_schema(&documents);
        for (path, kind) in &self.schema {
            log::debug!("Field {}: {}", path, kind);
        }
        Ok(())
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            name: self.name.clone(),
            media_type: "image".to_string(),
            sample_count: self.samples.len(),
            created_at: self.created_at,
            schema: self.schema.clone(),
        }
    }

    /// Write `samples.json` and `dataset.json` into the dataset directory.
    pub fn save(&self) -> Result<()> {
        write_json(&self.dir.join(SAMPLES_FILE), &self.samples, &self.name)?;
        write_json(&self.dir.join(DATASET_INFO_FILE), &self.info(), &self.name)?;
        info!(
            "Saved dataset {} ({} samples) to {}",
            self.name,
            self.samples.len(),
            self.dir.display()
        );
        Ok(())
    }
}

/// Directory of datasets, one subdirectory per dataset name.
#[derive(Debug, Clone)]
pub struct JsonDatasetStore {
    root: PathBuf,
}

impl JsonDatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Open a previously saved dataset.
    pub fn load(&self, name: &str) -> Result<Dataset> {
        let dir = self.dataset_dir(name);
        let info: DatasetInfo = read_json(&dir.join(DATASET_INFO_FILE))?;
        let samples: Vec<NormalizedSample> = read_json(&dir.join(SAMPLES_FILE))?;

        Ok(Dataset {
            name: info.name,
            dir,
            created_at: info.created_at,
            samples,
            schema: info.schema,
        })
    }
}

impl DatasetSink for JsonDatasetStore {
    type Handle = Dataset;

    fn create(&mut self, name: &str) -> Result<Dataset> {
        let dir = self.dataset_dir(name);
        recreate_dir(&dir).map_err(|source| IngestError::Store {
            path: dir.clone(),
            source,
        })?;

        Ok(Dataset {
            name: name.to_string(),
            dir,
            created_at: Utc::now(),
            samples: Vec::new(),
            schema: Schema::new(),
        })
    }

    fn insert(&mut self, handle: &mut Dataset, samples: Vec<NormalizedSample>) -> Result<usize> {
        Ok(handle.add_samples(samples))
    }

    fn finalize(&mut self, handle: &mut Dataset) -> Result<()> {
        handle.compute_metadata();
        handle.add_dynamic_sample_fields()?;
        handle.save()
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, name: &str) -> Result<()> {
    let store_err = |source| IngestError::Store {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(store_err)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| IngestError::Serialize {
        name: name.to_string(),
        source,
    })?;
    writer.flush().map_err(store_err)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| IngestError::Store {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| IngestError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use crate::types::{Classification, Detection};
    use std::fs;

    fn sample(filepath: PathBuf) -> NormalizedSample {
        NormalizedSample {
            filepath,
            ui_id: None,
            instruction: "click the search box".to_string(),
            data_source: Classification {
                label: "web".to_string(),
            },
            detection: Detection {
                label: "text".to_string(),
                bounding_box: [0.1, 0.2, 0.3, 0.4],
            },
            metadata: None,
        }
    }

    #[test]
    fn create_replaces_existing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDatasetStore::new(dir.path());
        let stale = store.dataset_dir("ScreenSpot_v2").join("stale.json");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"{}").unwrap();

        let dataset = store.create("ScreenSpot_v2").unwrap();

        assert!(dataset.is_empty());
        assert_eq!(dataset.name(), "ScreenSpot_v2");
        assert!(dataset.dir().is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn finalize_computes_metadata_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("shot.png");
        image::RgbImage::new(40, 30).save(&image_path).unwrap();

        let mut store = JsonDatasetStore::new(dir.path().join("datasets"));
        let mut dataset = store.create("demo").unwrap();
        let added = store
            .insert(
                &mut dataset,
                vec![sample(image_path.clone()), sample(dir.path().join("gone.png"))],
            )
            .unwrap();
        assert_eq!(added, 2);

        store.finalize(&mut dataset).unwrap();

        let metadata = dataset.samples()[0].metadata.as_ref().unwrap();
        assert_eq!((metadata.width, metadata.height), (40, 30));
        assert_eq!(metadata.num_channels, 3);
        assert!(dataset.samples()[1].metadata.is_none());

        assert_eq!(dataset.schema()["metadata.width"], FieldKind::Int);
        assert_eq!(
            dataset.schema()["data_source"],
            FieldKind::Embedded("Classification".to_string())
        );

        let loaded = store.load("demo").unwrap();
        assert_eq!(loaded.samples(), dataset.samples());
        assert_eq!(loaded.schema(), dataset.schema());
        assert_eq!(loaded.info().sample_count, 2);
        assert_eq!(loaded.info().media_type, "image");
    }

    #[test]
    fn saved_samples_use_tagged_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDatasetStore::new(dir.path());
        let mut dataset = store.create("demo").unwrap();
        store
            .insert(&mut dataset, vec![sample(PathBuf::from("missing.png"))])
            .unwrap();
        store.finalize(&mut dataset).unwrap();

        let raw = fs::read_to_string(dataset.dir().join(SAMPLES_FILE)).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        let first = &json[0];

        assert_eq!(first["ui_id"], Value::Null);
        assert_eq!(first["data_source"]["_cls"], "Classification");
        assert_eq!(first["action_detection"]["_cls"], "Detection");
        assert_eq!(first["action_detection"]["label"], "text");
    }
}
