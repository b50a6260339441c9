//! The `process` subcommand.

use std::sync::Arc;

use clap::Args;

use crate::{
    artifacts::{ArtifactWriter, WriteMode},
    io::{read_json, write_json},
    ocr::{TextDetector, replay::ReplayDetector, textract::TextractDetector},
    pipeline::PageProcessor,
    prelude::*,
    store::{
        DEFAULT_STORAGE_CLASS,
        ObjectWriter,
        local::LocalObjectWriter,
        s3::{S3ObjectWriter, storage_class_name},
    },
    ui::{ProgressConfig, Ui},
};

use super::ThrottleOpts;

/// Process command line arguments.
#[derive(Debug, Args)]
pub struct ProcessOpts {
    /// A JSON file containing the trigger event. Defaults to standard input.
    pub event_path: Option<PathBuf>,

    /// Where to write the response. Defaults to standard output.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,

    /// Use a saved OCR response instead of calling Textract.
    #[clap(long, value_name = "PATH")]
    pub ocr_response: Option<PathBuf>,

    /// Write artifacts under this local directory instead of S3.
    #[clap(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// S3 storage class for artifacts.
    #[clap(
        long,
        env = "OCR_PAGE_STORAGE_CLASS",
        default_value = DEFAULT_STORAGE_CLASS,
        value_parser = storage_class_name
    )]
    pub storage_class: String,

    /// Write artifacts one at a time, stopping at the first failure.
    #[clap(long, env = "OCR_PAGE_SEQUENTIAL_WRITES")]
    pub sequential_writes: bool,

    #[clap(flatten)]
    pub throttle: ThrottleOpts,
}

/// The `process` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_process(ui: Ui, opts: &ProcessOpts) -> Result<()> {
    let event = read_json::<Value>(opts.event_path.as_deref()).await?;

    let detector: Arc<dyn TextDetector> = match &opts.ocr_response {
        Some(path) => Arc::new(ReplayDetector::new(path)),
        None => Arc::new(TextractDetector::new().await?),
    };
    let store: Arc<dyn ObjectWriter> = match &opts.out_dir {
        Some(dir) => Arc::new(LocalObjectWriter::new(dir)),
        None => Arc::new(S3ObjectWriter::new().await?),
    };
    let mode = if opts.sequential_writes {
        WriteMode::Sequential
    } else {
        WriteMode::Concurrent
    };
    let processor = PageProcessor::new(
        detector,
        Arc::new(opts.throttle.policy()),
        ArtifactWriter::new(store, mode).with_storage_class(&opts.storage_class),
    );

    let spinner = ui.new_spinner(&ProgressConfig {
        emoji: "📄",
        msg: "OCRing page",
        done_msg: "OCRed page",
    });
    let result = processor.process_event(&event).await;
    spinner.finish_and_clear();
    let response = result?;

    write_json(opts.output_path.as_deref(), &response).await
}
