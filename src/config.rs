use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DATASET_ROOT: &str = "ScreenSpot-v2";
pub const DEFAULT_IMAGES_SUBDIR: &str = "screenspotv2_image";
pub const DEFAULT_DATASET_NAME: &str = "ScreenSpot_v2";
pub const DEFAULT_OUTPUT_DIR: &str = "datasets";

/// Convert ScreenSpot annotation files and screenshots into a persisted image dataset.
///
/// Every flag has a default, so running without arguments ingests `ScreenSpot-v2/`.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory holding the `*.json` annotation files
    #[arg(long = "dataset_root", default_value = DEFAULT_DATASET_ROOT)]
    pub dataset_root: PathBuf,

    /// Image directory, relative to the dataset root
    #[arg(long = "images_subdir", default_value = DEFAULT_IMAGES_SUBDIR)]
    pub images_subdir: PathBuf,

    /// Name of the dataset to (re)create
    #[arg(long = "dataset_name", default_value = DEFAULT_DATASET_NAME)]
    pub dataset_name: String,

    /// Directory under which datasets are persisted
    #[arg(long = "output_dir", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// Paths and names for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub annotations_dir: PathBuf,
    pub images_dir: PathBuf,
    pub dataset_name: String,
}

impl IngestConfig {
    /// Annotations live directly under `root`; images under `root/images_subdir`.
    pub fn new(root: impl Into<PathBuf>, images_subdir: impl AsRef<std::path::Path>) -> Self {
        let annotations_dir = root.into();
        let images_dir = annotations_dir.join(images_subdir);
        Self {
            annotations_dir,
            images_dir,
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
        }
    }

    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_ROOT, DEFAULT_IMAGES_SUBDIR)
    }
}

impl Args {
    pub fn to_ingest_config(&self) -> IngestConfig {
        IngestConfig::new(&self.dataset_root, &self.images_subdir)
            .with_dataset_name(self.dataset_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_screenspot_layout() {
        let args = Args::parse_from(["screenspot-ingest"]);
        let config = args.to_ingest_config();

        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.annotations_dir, PathBuf::from("ScreenSpot-v2"));
        assert_eq!(
            config.images_dir,
            PathBuf::from("ScreenSpot-v2").join("screenspotv2_image")
        );
        assert_eq!(config.dataset_name, "ScreenSpot_v2");
        assert_eq!(args.output_dir, PathBuf::from("datasets"));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "screenspot-ingest",
            "--dataset_root",
            "/data/ss",
            "--images_subdir",
            "imgs",
            "--dataset_name",
            "custom",
        ]);
        let config = args.to_ingest_config();

        assert_eq!(config.annotations_dir, PathBuf::from("/data/ss"));
        assert_eq!(config.images_dir, PathBuf::from("/data/ss/imgs"));
        assert_eq!(config.dataset_name, "custom");
    }
}
