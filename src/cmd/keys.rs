//! The `keys` subcommand.

use clap::Args;

use crate::{
    io::write_json,
    keys::{ArtifactKeys, DocumentKey, PageUuid},
    prelude::*,
    throttle::{delay_for_key, split_page_index},
};

use super::ThrottleOpts;

/// Keys command line arguments.
#[derive(Debug, Args)]
pub struct KeysOpts {
    /// The source object key, like `raw/mn-ramsey-county/abs/0001.tif`.
    pub key: String,

    #[clap(flatten)]
    pub throttle: ThrottleOpts,
}

/// What we'd do with a key.
#[derive(Debug, Serialize)]
struct KeysReport {
    #[serde(flatten)]
    document: DocumentKey,
    split_page: Option<u32>,
    throttle_delay_ms: u128,
    uuid: PageUuid,
    #[serde(flatten)]
    artifacts: ArtifactKeys,
}

/// The `keys` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_keys(opts: &KeysOpts) -> Result<()> {
    let document = DocumentKey::parse(&opts.key)?;
    let uuid = PageUuid::new();
    let policy = opts.throttle.policy();
    let report = KeysReport {
        split_page: split_page_index(&opts.key),
        throttle_delay_ms: delay_for_key(&policy, &opts.key).as_millis(),
        artifacts: ArtifactKeys::new(&document, &uuid),
        document,
        uuid,
    };
    write_json(None, &report).await
}
