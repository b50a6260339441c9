//! The `schema` subcommand.

use clap::{Args, ValueEnum};
use schemars::schema_for;

use crate::{
    event::IncomingEvent, io::write_json, prelude::*, response::PageResponse,
    stats::StatsArtifact,
};

/// The different schema types we support.
///
/// We parse these as PascalCase, because they represent type names.
#[derive(Debug, Clone, Copy, ValueEnum)]
#[clap(rename_all = "PascalCase")]
pub enum SchemaType {
    /// Trigger events we accept.
    IncomingEvent,
    /// Our response on success.
    PageResponse,
    /// The stats artifact.
    StatsArtifact,
}

/// Schema command line arguments.
#[derive(Debug, Args)]
pub struct SchemaOpts {
    /// The schema type to generate.
    #[clap(value_enum, value_name = "TYPE")]
    pub schema_type: SchemaType,

    /// The output path to write the schema to.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `schema` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_schema(schema_opts: &SchemaOpts) -> Result<()> {
    let schema = match schema_opts.schema_type {
        SchemaType::IncomingEvent => schema_for!(IncomingEvent),
        SchemaType::PageResponse => schema_for!(PageResponse),
        SchemaType::StatsArtifact => schema_for!(StatsArtifact),
    };
    write_json(schema_opts.output_path.as_deref(), &schema).await
}
