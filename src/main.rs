use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter, Layer as _, filter::Directive, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt as _,
};

use self::{prelude::*, ui::Ui};

mod artifacts;
mod aws;
mod blocks;
mod cmd;
mod errors;
mod event;
mod io;
mod keys;
mod ocr;
mod pipeline;
mod prelude;
mod response;
mod stats;
mod store;
mod throttle;
mod ui;

/// OCR a single scanned page and store its text, raw OCR response and
/// statistics.
#[derive(Debug, Parser)]
#[clap(
    version,
    about,
    after_help = r#"
Environment Variables:
  - OCR_PAGE_STORAGE_CLASS (optional): S3 storage class for artifacts.
  - OCR_PAGE_THROTTLE_MS_PER_PAGE (optional): Split-page throttle step.
  - OCR_PAGE_SEQUENTIAL_WRITES (optional): Write artifacts one at a time.
  - RUST_LOG (optional): Log filter, defaults to "info".

  Standard AWS environment variables and credential files
  are used for Textract and S3.

  These variables may be set in a standard `.env` file.
"#
)]
struct Opts {
    #[clap(subcommand)]
    subcmd: Cmd,
}

/// The subcommands we support.
#[derive(Debug, Subcommand)]
enum Cmd {
    /// OCR the page named by a trigger event and store its artifacts.
    Process(cmd::process::ProcessOpts),
    /// Show how an object key is parsed and where its artifacts would go.
    Keys(cmd::keys::KeysOpts),
    /// Print schemas for input and output formats.
    Schema(cmd::schema::SchemaOpts),
}

impl Cmd {
    /// Are we using stdout for output?
    fn using_stdout_for_output(&self) -> bool {
        match self {
            Cmd::Process(opts) => opts.output_path.is_none(),
            Cmd::Keys(_) => true,
            Cmd::Schema(opts) => opts.output_path.is_none(),
        }
    }
}

/// Our entry point, which can return an error. [`anyhow::Result`] will
/// automatically print a nice error message with optional backtrace.
#[tokio::main]
async fn main() -> Result<()> {
    let ui = Ui::init();

    // Initialize tracing.
    let directive =
        Directive::from_str("info").expect("built-in directive should be valid");
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(ui.get_stderr_writer())
        .with_filter(env_filter);

    tracing_subscriber::registry().with(subscriber).init();

    // Call our real `main` function now that logging is set up.
    real_main(ui).await
}

/// Our real entry point.
#[instrument(level = "debug", name = "main", skip_all)]
async fn real_main(ui: Ui) -> Result<()> {
    // Load environment variables from a `.env` file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let opts = Opts::parse();
    debug!("Parsed options: {:?}", opts);

    // Hide the spinner if we're using stdout for output.
    if opts.subcmd.using_stdout_for_output() {
        ui.hide_progress_bars();
    }

    match &opts.subcmd {
        Cmd::Process(process_opts) => {
            cmd::process::cmd_process(ui, process_opts).await?;
        }
        Cmd::Keys(keys_opts) => {
            cmd::keys::cmd_keys(keys_opts).await?;
        }
        Cmd::Schema(schema_opts) => {
            cmd::schema::cmd_schema(schema_opts).await?;
        }
    }
    Ok(())
}
