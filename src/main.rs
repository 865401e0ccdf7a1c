use clap::Parser;
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;

use screenspot_ingest::{build_dataset, Args, JsonDatasetStore};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();
    let args = Args::parse();
    let config = args.to_ingest_config();

    info!(
        "Starting ingestion of {} into dataset {}...",
        config.annotations_dir.display(),
        config.dataset_name
    );

    let mut store = JsonDatasetStore::new(&args.output_dir);
    match build_dataset(&config, &mut store) {
        Ok((dataset, summary)) => {
            summary.print_summary();
            info!(
                "Dataset {} ready at {} with {} samples.",
                dataset.name(),
                dataset.dir().display(),
                dataset.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Ingestion failed: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
